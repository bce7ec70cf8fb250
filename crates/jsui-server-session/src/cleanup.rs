// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Caller-supplied action run when a target is cleared.
pub type ClearHook = Box<dyn FnOnce() + Send + Sync + 'static>;

/// What to do when a target registration is cleared: cancel a task, then run a hook.
#[derive(Default)]
pub struct Cleanup {
	token: Option<CancellationToken>,
	hook: Option<ClearHook>,
}

impl Cleanup {
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancel `token` when cleared.
	pub fn cancel(token: CancellationToken) -> Self {
		Self {
			token: Some(token),
			hook: None,
		}
	}

	pub fn from_fn<F>(hook: F) -> Self
	where
		F: FnOnce() + Send + Sync + 'static,
	{
		Self {
			token: None,
			hook: Some(Box::new(hook)),
		}
	}

	pub fn with_hook(mut self, hook: Option<ClearHook>) -> Self {
		self.hook = hook;
		self
	}

	/// Cancel, then run the hook. A panicking hook is logged and swallowed.
	pub(crate) fn run(self, session_id: &str, target_id: &str) {
		if let Some(token) = self.token {
			token.cancel();
		}
		if let Some(hook) = self.hook {
			if catch_unwind(AssertUnwindSafe(hook)).is_err() {
				warn!(session_id = %session_id, target = %target_id, "Cleanup hook panicked");
			}
		}
	}
}

impl fmt::Debug for Cleanup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Cleanup")
			.field("token", &self.token)
			.field("hook", &self.hook.is_some())
			.finish()
	}
}
