// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Single-shot HTTP responses. Every response closes the connection.

use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::security::SecurityHeaders;
use crate::SESSION_COOKIE;

const HTML: &str = "text/html; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
	pub status: StatusCode,
	pub content_type: &'static str,
	pub body: Vec<u8>,
	pub set_cookie: Option<String>,
}

impl Response {
	pub fn new(status: StatusCode, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			content_type,
			body: body.into(),
			set_cookie: None,
		}
	}

	pub fn html(body: impl Into<Vec<u8>>) -> Self {
		Self::new(StatusCode::OK, HTML, body)
	}

	pub fn text(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self::new(status, TEXT, body)
	}

	pub fn bad_request() -> Self {
		Self::text(StatusCode::BAD_REQUEST, "Bad Request")
	}

	pub fn not_found() -> Self {
		Self::text(StatusCode::NOT_FOUND, "Not Found")
	}

	pub fn method_not_allowed() -> Self {
		Self::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
	}

	pub fn internal_error(message: &str) -> Self {
		Self::text(StatusCode::INTERNAL_SERVER_ERROR, message)
	}

	/// Attach a freshly minted session cookie.
	pub fn with_session_cookie(mut self, session_id: &str) -> Self {
		self.set_cookie = Some(format!(
			"{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax"
		));
		self
	}

	/// Serialize status line, headers and body.
	pub fn encode(&self, security: &SecurityHeaders) -> Vec<u8> {
		let reason = self.status.canonical_reason().unwrap_or("");
		let mut head = format!(
			"HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
			self.status.as_u16(),
			reason,
			self.content_type,
			self.body.len()
		);
		for (name, value) in security.pairs() {
			head.push_str(name);
			head.push_str(": ");
			head.push_str(value);
			head.push_str("\r\n");
		}
		if let Some(cookie) = &self.set_cookie {
			head.push_str("Set-Cookie: ");
			head.push_str(cookie);
			head.push_str("\r\n");
		}
		head.push_str("\r\n");

		let mut out = head.into_bytes();
		out.extend_from_slice(&self.body);
		out
	}
}

pub async fn write_response<W>(
	writer: &mut W,
	response: &Response,
	security: &SecurityHeaders,
) -> Result<()>
where
	W: AsyncWrite + Unpin,
{
	writer.write_all(&response.encode(security)).await?;
	writer.flush().await?;
	Ok(())
}
