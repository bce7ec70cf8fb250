// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use jsui_server_session::ConnectionRegistry;
use tracing::debug;

use crate::error::DispatchError;
use crate::message::{PatchMessage, SwapMode};

/// Delivers patches to a session's browser.
pub trait PatchSender: Send + Sync {
	fn send_patch(
		&self,
		session_id: &str,
		target_id: &str,
		swap: SwapMode,
		html: &str,
	) -> Result<(), DispatchError>;
}

/// Sends patches over the session's WebSocket connections.
#[derive(Clone)]
pub struct PatchDispatcher {
	connections: Arc<ConnectionRegistry>,
}

impl PatchDispatcher {
	pub fn new(connections: Arc<ConnectionRegistry>) -> Self {
		Self { connections }
	}
}

impl PatchSender for PatchDispatcher {
	/// Writes to one open connection of the session. Other connections are not
	/// retried when the chosen one turns out to be closed.
	fn send_patch(
		&self,
		session_id: &str,
		target_id: &str,
		swap: SwapMode,
		html: &str,
	) -> Result<(), DispatchError> {
		if swap == SwapMode::None {
			return Ok(());
		}

		let conns = self.connections.connections_for(session_id);
		if conns.is_empty() {
			debug!(session_id = %session_id, target = %target_id, "No connection for patch");
			return Err(DispatchError::NoConnection(session_id.to_string()));
		}

		let json = PatchMessage::new(target_id, swap, html)
			.to_json()
			.map_err(|e| DispatchError::Encode(e.to_string()))?;

		let conn = conns
			.iter()
			.find(|c| c.is_open())
			.ok_or_else(|| DispatchError::NoOpenConnection(session_id.to_string()))?;
		conn.send_text(&json).map_err(|_| {
			debug!(session_id = %session_id, conn_id = conn.id(), "Chosen connection closed");
			DispatchError::NoOpenConnection(session_id.to_string())
		})
	}
}
