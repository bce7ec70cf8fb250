// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One upgraded WebSocket connection and its serialized write path.
//!
//! Every outbound frame is encoded in full and handed to a single writer task
//! over a bounded channel. The writer writes one frame at a time, so control
//! frames and patches from different tasks never interleave.
//!
//! A peer that stops reading fills the queue. The next send then fails and
//! the connection is closed rather than buffering without limit.

use std::sync::atomic::{AtomicBool, Ordering};

use jsui_common_ws::{encode_frame, Opcode};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub type ConnectionId = u64;

/// Frames a connection may have queued before it is treated as stalled.
pub const DEFAULT_SEND_QUEUE_FRAMES: usize = 256;

/// Receiving end of a connection's outbound frames; drive it with [`run_writer`].
pub type OutboundFrames = mpsc::Receiver<Vec<u8>>;

#[derive(Debug, Error)]
#[error("connection {0} is closed")]
pub struct ConnectionClosed(pub ConnectionId);

#[derive(Debug)]
pub struct Connection {
	id: ConnectionId,
	session_id: Option<String>,
	open: AtomicBool,
	closed: CancellationToken,
	tx: mpsc::Sender<Vec<u8>>,
}

impl Connection {
	pub fn new(id: ConnectionId, session_id: Option<String>) -> (Self, OutboundFrames) {
		Self::with_capacity(id, session_id, DEFAULT_SEND_QUEUE_FRAMES)
	}

	/// `capacity` is clamped to at least one frame.
	pub fn with_capacity(
		id: ConnectionId,
		session_id: Option<String>,
		capacity: usize,
	) -> (Self, OutboundFrames) {
		let (tx, rx) = mpsc::channel(capacity.max(1));
		let conn = Self {
			id,
			session_id,
			open: AtomicBool::new(true),
			closed: CancellationToken::new(),
			tx,
		};
		(conn, rx)
	}

	pub fn id(&self) -> ConnectionId {
		self.id
	}

	pub fn session_id(&self) -> Option<&str> {
		self.session_id.as_deref()
	}

	pub fn is_open(&self) -> bool {
		self.open.load(Ordering::SeqCst) && !self.tx.is_closed()
	}

	pub fn send_text(&self, text: &str) -> Result<(), ConnectionClosed> {
		self.send_frame(Opcode::Text, text.as_bytes())
	}

	pub fn send_frame(&self, opcode: Opcode, payload: &[u8]) -> Result<(), ConnectionClosed> {
		if !self.open.load(Ordering::SeqCst) {
			return Err(ConnectionClosed(self.id));
		}
		match self.tx.try_send(encode_frame(opcode, payload)) {
			Ok(()) => Ok(()),
			Err(TrySendError::Full(_)) => {
				warn!(conn_id = self.id, "Send queue full, closing stalled connection");
				self.mark_closed();
				Err(ConnectionClosed(self.id))
			}
			Err(TrySendError::Closed(_)) => {
				self.mark_closed();
				Err(ConnectionClosed(self.id))
			}
		}
	}

	/// Send a close frame and refuse further sends. Idempotent.
	///
	/// A full queue drops the close frame; the socket is torn down regardless.
	pub fn close(&self) {
		if self.open.swap(false, Ordering::SeqCst) {
			if let Err(e) = self.tx.try_send(encode_frame(Opcode::Close, &[])) {
				debug!(conn_id = self.id, error = %e, "Close frame not queued");
			}
			self.closed.cancel();
			debug!(conn_id = self.id, "Closing connection");
		}
	}

	/// Refuse further sends without emitting a close frame (peer already gone).
	pub fn mark_closed(&self) {
		self.open.store(false, Ordering::SeqCst);
		self.closed.cancel();
	}

	/// Resolves once the connection stops accepting frames.
	pub async fn closed(&self) {
		self.closed.cancelled().await
	}
}

/// Write queued frames until the channel closes or a close frame has been written.
pub async fn run_writer<W>(mut frames: OutboundFrames, mut writer: W) -> std::io::Result<()>
where
	W: AsyncWrite + Unpin,
{
	while let Some(frame) = frames.recv().await {
		writer.write_all(&frame).await?;
		writer.flush().await?;
		if frame.first() == Some(&(0x80 | Opcode::Close.as_u8())) {
			break;
		}
	}
	let _ = writer.shutdown().await;
	Ok(())
}
