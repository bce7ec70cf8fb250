// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Opening handshake (RFC 6455 section 4.2).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};

/// Fixed GUID appended to the client key.
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// `Sec-WebSocket-Accept` for a given `Sec-WebSocket-Key`.
pub fn compute_accept_key(client_key: &str) -> String {
	let mut hasher = Sha1::new();
	hasher.update(client_key.trim().as_bytes());
	hasher.update(WS_GUID.as_bytes());
	STANDARD.encode(hasher.finalize())
}

/// Full `101 Switching Protocols` response for `client_key`.
pub fn handshake_response(client_key: &str) -> Vec<u8> {
	format!(
		"HTTP/1.1 101 Switching Protocols\r\n\
		 Upgrade: websocket\r\n\
		 Connection: Upgrade\r\n\
		 Sec-WebSocket-Accept: {}\r\n\r\n",
		compute_accept_key(client_key)
	)
	.into_bytes()
}
