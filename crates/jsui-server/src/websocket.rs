// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! WebSocket side of a connection: handshake, then the frame loop.

use std::sync::Arc;

use jsui_common_http::{write_response, RequestHead, Response, SESSION_COOKIE};
use jsui_common_ws::{
	handshake_response, read_frame, ClientMessage, Frame, FrameError, Opcode, ServerMessage,
};
use jsui_server_session::{run_writer, Connection};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::state::AppState;

pub(crate) async fn serve_websocket<R, W>(
	state: &Arc<AppState>,
	head: RequestHead,
	mut reader: R,
	mut writer: W,
	shutdown: CancellationToken,
) -> Result<(), ServerError>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin + Send + 'static,
{
	let Some(key) = head
		.headers
		.get("sec-websocket-key")
		.filter(|key| !key.trim().is_empty())
		.map(str::to_string)
	else {
		debug!("WebSocket upgrade without Sec-WebSocket-Key");
		write_response(&mut writer, &Response::bad_request(), &state.security).await?;
		return Ok(());
	};

	writer.write_all(&handshake_response(&key)).await?;
	writer.flush().await?;

	let session_id = session_for(&head);
	if let Some(id) = &session_id {
		state.sessions.touch(id);
	}

	let (conn, frames) = state.connections.open(session_id);
	let conn_id = conn.id();
	info!(conn_id, session_id = ?conn.session_id(), "WebSocket opened");
	let mut writer_task = tokio::spawn(run_writer(frames, writer));

	let max_payload = state.config.websocket.max_frame_bytes;
	loop {
		let frame = tokio::select! {
			biased;
			_ = shutdown.cancelled() => {
				conn.close();
				break;
			}
			_ = conn.closed() => {
				debug!(conn_id, "Connection closed by server");
				break;
			}
			frame = read_frame(&mut reader, max_payload) => frame,
		};

		match frame {
			Ok(Some(frame)) => {
				if !handle_frame(state, &conn, frame) {
					break;
				}
			}
			Ok(None) => {
				conn.mark_closed();
				break;
			}
			Err(err @ FrameError::TooLarge { .. }) => {
				warn!(conn_id, error = %err, "Closing connection");
				conn.close();
				break;
			}
			Err(err) => {
				debug!(conn_id, error = %err, "WebSocket read failed");
				conn.mark_closed();
				break;
			}
		}
	}

	state.connections.remove(&conn);
	drop(conn);
	match tokio::time::timeout(state.config.shutdown.grace(), &mut writer_task).await {
		Ok(Ok(Ok(()))) => {}
		Ok(Ok(Err(e))) => debug!(conn_id, error = %e, "WebSocket writer failed"),
		Ok(Err(e)) => debug!(conn_id, error = %e, "WebSocket writer task aborted"),
		Err(_) => {
			warn!(conn_id, "Peer not reading, abandoning queued frames");
			writer_task.abort();
		}
	}
	info!(conn_id, "WebSocket closed");
	Ok(())
}

/// `?s=` wins over the session cookie. Empty values count as absent.
fn session_for(head: &RequestHead) -> Option<String> {
	head.query_param("s")
		.filter(|id| !id.is_empty())
		.or_else(|| head.cookie(SESSION_COOKIE).filter(|id| !id.is_empty()))
}

/// Returns `false` once the connection should stop reading.
///
/// Any frame from the peer counts as activity for its session.
fn handle_frame(state: &AppState, conn: &Connection, frame: Frame) -> bool {
	if let Some(session_id) = conn.session_id() {
		state.sessions.touch(session_id);
	}
	match frame.opcode {
		Opcode::Close => {
			conn.close();
			false
		}
		Opcode::Ping => conn.send_frame(Opcode::Pong, &frame.payload).is_ok(),
		Opcode::Text => match ClientMessage::parse(&frame.text_payload()) {
			Some(ClientMessage::Ping) => conn.send_text(&ServerMessage::Pong.to_json()).is_ok(),
			Some(ClientMessage::Invalid { id }) => {
				if let Some(session_id) = conn.session_id() {
					let cleared = state.sessions.trigger_clear(session_id, &id);
					debug!(session_id = %session_id, target = %id, cleared, "Client reported missing target");
				}
				true
			}
			Some(ClientMessage::Pong) | None => true,
		},
		_ => true,
	}
}
