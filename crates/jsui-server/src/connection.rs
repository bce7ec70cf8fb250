// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::net::SocketAddr;
use std::sync::Arc;

use jsui_common_http::{read_request_head, write_response, Response};
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ServerError;
use crate::state::AppState;
use crate::{http, websocket};

/// Serve one accepted socket: a single HTTP exchange or a WebSocket session.
pub(crate) async fn handle_connection(
	stream: TcpStream,
	peer: SocketAddr,
	state: Arc<AppState>,
	shutdown: CancellationToken,
) {
	debug!(peer = %peer, "Connection accepted");
	if let Err(e) = serve(stream, &state, shutdown).await {
		debug!(peer = %peer, error = %e, "Connection error");
	}
	debug!(peer = %peer, "Connection finished");
}

async fn serve(
	stream: TcpStream,
	state: &Arc<AppState>,
	shutdown: CancellationToken,
) -> Result<(), ServerError> {
	let (read_half, mut write_half) = stream.into_split();
	let mut reader = BufReader::new(read_half);

	let head = match read_request_head(&mut reader, state.config.http.max_header_bytes).await {
		Ok(head) => head,
		Err(err) if err.is_bad_request() => {
			debug!(error = %err, "Rejecting request");
			write_response(&mut write_half, &Response::bad_request(), &state.security).await?;
			return Ok(());
		}
		Err(err) => return Err(err.into()),
	};

	if head.is_websocket_upgrade() {
		websocket::serve_websocket(state, head, reader, write_half, shutdown).await
	} else {
		http::serve_http(state, head, &mut reader, &mut write_half).await
	}
}
