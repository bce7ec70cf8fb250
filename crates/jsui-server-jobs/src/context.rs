// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use jsui_server_patch::PatchTarget;
use jsui_server_session::SessionManager;
use tokio_util::sync::CancellationToken;

/// The page a task belongs to: a session and the generation it was rendered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskScope {
	pub session_id: String,
	pub generation: u64,
}

impl TaskScope {
	pub fn new(session_id: impl Into<String>, generation: u64) -> Self {
		Self {
			session_id: session_id.into(),
			generation,
		}
	}
}

/// Handed to every job run.
#[derive(Clone)]
pub struct TaskContext {
	pub scope: TaskScope,
	pub target: PatchTarget,
	pub cancellation_token: CancellationToken,
	sessions: Arc<SessionManager>,
}

impl TaskContext {
	pub(crate) fn new(
		scope: TaskScope,
		target: PatchTarget,
		cancellation_token: CancellationToken,
		sessions: Arc<SessionManager>,
	) -> Self {
		Self {
			scope,
			target,
			cancellation_token,
			sessions,
		}
	}

	pub fn session_id(&self) -> &str {
		&self.scope.session_id
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancellation_token.is_cancelled()
	}

	/// Whether the session is still on the generation this task was created in.
	pub fn is_current(&self) -> bool {
		self.sessions.current_generation(&self.scope.session_id) == self.scope.generation
	}
}
