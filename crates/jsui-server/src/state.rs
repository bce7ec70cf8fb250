// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use jsui_common_http::SecurityHeaders;
use jsui_server_config::ServerConfig;
use jsui_server_jobs::TaskScheduler;
use jsui_server_patch::{PatchDispatcher, PatchSender};
use jsui_server_session::{ConnectionRegistry, SessionManager};
use tracing::debug;

use crate::router::RouteDispatcher;

/// Shared by every connection worker.
pub struct AppState {
	pub config: ServerConfig,
	pub sessions: Arc<SessionManager>,
	pub connections: Arc<ConnectionRegistry>,
	pub patches: Arc<PatchDispatcher>,
	pub scheduler: Arc<TaskScheduler>,
	pub security: SecurityHeaders,
	pub routes: Arc<dyn RouteDispatcher>,
}

impl AppState {
	pub fn new(config: ServerConfig, routes: Arc<dyn RouteDispatcher>) -> Self {
		let sessions = Arc::new(SessionManager::new());
		let connections = Arc::new(ConnectionRegistry::with_queue_capacity(
			config.websocket.send_queue_frames,
		));
		let patches = Arc::new(PatchDispatcher::new(Arc::clone(&connections)));
		let sender: Arc<dyn PatchSender> = patches.clone();
		let scheduler = Arc::new(TaskScheduler::new(Arc::clone(&sessions), sender));
		let security =
			SecurityHeaders::with_policy(config.security.content_security_policy.as_deref());

		Self {
			config,
			sessions,
			connections,
			patches,
			scheduler,
			security,
			routes,
		}
	}

	/// Send `text` to every open WebSocket. Returns how many took it.
	pub fn broadcast(&self, text: &str) -> usize {
		let sent = self.connections.broadcast(text);
		debug!(sent, total = self.connections.len(), "Broadcast sent");
		sent
	}
}
