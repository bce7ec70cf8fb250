// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request handle given to routes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use jsui_common_http::{parse_query, Headers, Method, RequestHead};
use jsui_server_jobs::{PatchJob, TaskHandle, TaskScope};
use jsui_server_patch::{inline_script, PatchMessage, PatchSender, PatchTarget};
use jsui_server_session::{Cleanup, ClearHook};
use tracing::{debug, warn};

use crate::state::AppState;

pub struct RequestContext {
	state: Arc<AppState>,
	scope: TaskScope,
	method: Method,
	path: String,
	headers: Headers,
	query: HashMap<String, String>,
	form: HashMap<String, String>,
	body: Vec<u8>,
	appended: Mutex<Vec<String>>,
}

impl RequestContext {
	pub(crate) fn new(state: Arc<AppState>, scope: TaskScope, head: &RequestHead, body: Vec<u8>) -> Self {
		let is_form = head
			.headers
			.get("content-type")
			.is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
		let form = if is_form {
			parse_query(&String::from_utf8_lossy(&body))
		} else {
			HashMap::new()
		};

		Self {
			state,
			scope,
			method: head.method.clone(),
			path: head.path.clone(),
			headers: head.headers.clone(),
			query: head.query(),
			form,
			body,
			appended: Mutex::new(Vec::new()),
		}
	}

	pub fn session_id(&self) -> &str {
		&self.scope.session_id
	}

	/// Generation of the page this request belongs to.
	pub fn generation(&self) -> u64 {
		self.scope.generation
	}

	pub fn scope(&self) -> &TaskScope {
		&self.scope
	}

	pub fn method(&self) -> &Method {
		&self.method
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	/// Request header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name)
	}

	pub fn query(&self, name: &str) -> Option<&str> {
		self.query.get(name).map(String::as_str)
	}

	pub fn form(&self, name: &str) -> Option<&str> {
		self.form.get(name).map(String::as_str)
	}

	/// Query parameter, falling back to the form body.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.query(name).or_else(|| self.form(name))
	}

	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Patch `target` now.
	///
	/// Without a live WebSocket the patch is appended to this response as an
	/// inline script instead. Returns whether it went over the socket.
	pub fn patch(&self, target: &PatchTarget, html: impl Into<String>) -> bool {
		let html = html.into();
		match self
			.state
			.patches
			.send_patch(self.session_id(), &target.id, target.swap, &html)
		{
			Ok(()) => true,
			Err(err) => {
				debug!(session_id = %self.session_id(), target = %target.id, error = %err, "Patch inlined into response");
				match inline_script(&PatchMessage::new(target.id.clone(), target.swap, html)) {
					Ok(script) => self.append(script),
					Err(e) => warn!(target = %target.id, error = %e, "Failed to encode inline patch"),
				}
				false
			}
		}
	}

	/// Patch `target` and register `on_clear` as its cleanup.
	///
	/// The hook runs once when the target is cleared: by the next page load,
	/// an `invalid` report from the client or the idle sweep. It replaces any
	/// cleanup already registered for the target without running it.
	pub fn patch_with_clear(
		&self,
		target: &PatchTarget,
		html: impl Into<String>,
		on_clear: Option<ClearHook>,
	) -> bool {
		if let Some(hook) = on_clear {
			self.state.sessions.register_clear(
				self.session_id(),
				&target.id,
				Cleanup::new().with_hook(Some(hook)),
			);
		}
		self.patch(target, html)
	}

	/// Extra HTML written after the route's body.
	pub fn append(&self, html: impl Into<String>) {
		self.appended
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(html.into());
	}

	pub(crate) fn take_appended(&self) -> String {
		let mut appended = self.appended.lock().unwrap_or_else(PoisonError::into_inner);
		std::mem::take(&mut *appended).concat()
	}

	pub fn defer<J: PatchJob>(&self, target: PatchTarget, job: J, on_clear: Option<ClearHook>) -> TaskHandle {
		self.state.scheduler.defer(&self.scope, target, job, on_clear)
	}

	pub fn repeat<J: PatchJob>(
		&self,
		target: PatchTarget,
		interval: Duration,
		job: J,
		on_clear: Option<ClearHook>,
	) -> TaskHandle {
		self.state
			.scheduler
			.repeat(&self.scope, target, interval, job, on_clear)
	}

	pub fn delay<J: PatchJob>(
		&self,
		target: PatchTarget,
		wait: Duration,
		job: J,
		on_clear: Option<ClearHook>,
	) -> TaskHandle {
		self.state.scheduler.delay(&self.scope, target, wait, job, on_clear)
	}
}
