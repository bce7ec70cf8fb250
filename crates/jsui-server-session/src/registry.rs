// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::connection::{
	Connection, ConnectionId, OutboundFrames, DEFAULT_SEND_QUEUE_FRAMES,
};

/// Live WebSocket connections, globally and indexed by session.
pub struct ConnectionRegistry {
	next_id: AtomicU64,
	queue_capacity: usize,
	connections: DashMap<ConnectionId, Arc<Connection>>,
	by_session: DashMap<String, HashMap<ConnectionId, Arc<Connection>>>,
}

impl Default for ConnectionRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl ConnectionRegistry {
	pub fn new() -> Self {
		Self::with_queue_capacity(DEFAULT_SEND_QUEUE_FRAMES)
	}

	/// Connections opened through [`open`](Self::open) queue at most
	/// `queue_capacity` outbound frames.
	pub fn with_queue_capacity(queue_capacity: usize) -> Self {
		Self {
			next_id: AtomicU64::new(1),
			queue_capacity,
			connections: DashMap::new(),
			by_session: DashMap::new(),
		}
	}

	/// Create and register a connection for `session_id`.
	pub fn open(&self, session_id: Option<String>) -> (Arc<Connection>, OutboundFrames) {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let (conn, frames) = Connection::with_capacity(id, session_id, self.queue_capacity);
		let conn = Arc::new(conn);
		self.add(Arc::clone(&conn));
		(conn, frames)
	}

	/// Connections without a session id are tracked globally only.
	pub fn add(&self, conn: Arc<Connection>) {
		if let Some(session_id) = conn.session_id() {
			self.by_session
				.entry(session_id.to_string())
				.or_default()
				.insert(conn.id(), Arc::clone(&conn));
		}
		debug!(conn_id = conn.id(), session_id = ?conn.session_id(), "Registered connection");
		self.connections.insert(conn.id(), conn);
	}

	/// Remove from the session index first, then the global set.
	pub fn remove(&self, conn: &Connection) -> bool {
		if let Some(session_id) = conn.session_id() {
			let now_empty = match self.by_session.get_mut(session_id) {
				Some(mut conns) => {
					conns.remove(&conn.id());
					conns.is_empty()
				}
				None => false,
			};
			if now_empty {
				self.by_session.remove_if(session_id, |_, conns| conns.is_empty());
			}
		}
		let removed = self.connections.remove(&conn.id()).is_some();
		if removed {
			debug!(conn_id = conn.id(), "Unregistered connection");
		}
		removed
	}

	/// Snapshot of the session's connections, in no particular order.
	pub fn connections_for(&self, session_id: &str) -> Vec<Arc<Connection>> {
		self.by_session
			.get(session_id)
			.map(|conns| conns.values().cloned().collect())
			.unwrap_or_default()
	}

	/// Send `text` to every open connection, with or without a session.
	/// Returns how many accepted it.
	pub fn broadcast(&self, text: &str) -> usize {
		let mut sent = 0;
		for conn in self.all() {
			if !conn.is_open() {
				continue;
			}
			match conn.send_text(text) {
				Ok(()) => sent += 1,
				Err(e) => debug!(conn_id = conn.id(), error = %e, "Broadcast skipped connection"),
			}
		}
		sent
	}

	pub fn all(&self) -> Vec<Arc<Connection>> {
		self.connections.iter().map(|e| Arc::clone(e.value())).collect()
	}

	pub fn len(&self) -> usize {
		self.connections.len()
	}

	pub fn is_empty(&self) -> bool {
		self.connections.is_empty()
	}

	pub fn session_count(&self) -> usize {
		self.by_session.len()
	}
}
