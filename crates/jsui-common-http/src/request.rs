// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-head parsing and bounded body reads.

use std::collections::HashMap;
use std::fmt;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt};

use crate::error::{HttpError, Result};
use crate::util::{parse_cookie, parse_query};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
	Other(String),
}

impl Method {
	pub fn parse(token: &str) -> Self {
		let upper = token.to_ascii_uppercase();
		match upper.as_str() {
			"GET" => Method::Get,
			"POST" => Method::Post,
			_ => Method::Other(upper),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Other(m) => m,
		}
	}
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Header map keyed by lower-cased name. Duplicate headers keep the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(HashMap<String, String>);

impl Headers {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, name: &str, value: &str) {
		self.0
			.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(&name.to_ascii_lowercase())
	}

	/// Parsed `Content-Length`; `None` when absent or not a non-negative integer.
	pub fn content_length(&self) -> Option<usize> {
		self.get("content-length")?.parse().ok()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// Request line and headers of one HTTP request.
#[derive(Debug, Clone)]
pub struct RequestHead {
	pub method: Method,
	pub path: String,
	pub query_string: String,
	pub version: String,
	pub headers: Headers,
}

impl RequestHead {
	pub fn query(&self) -> HashMap<String, String> {
		parse_query(&self.query_string)
	}

	pub fn query_param(&self, name: &str) -> Option<String> {
		self.query().remove(name)
	}

	pub fn cookie(&self, name: &str) -> Option<String> {
		parse_cookie(self.headers.get("cookie")?, name)
	}

	/// `Upgrade: websocket`, compared case-insensitively.
	pub fn is_websocket_upgrade(&self) -> bool {
		self.headers
			.get("upgrade")
			.is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
	}
}

/// Read the request line and headers.
///
/// The head may not exceed `max_header_bytes` in total. EOF in the middle of
/// the headers ends the header block rather than failing the request.
pub async fn read_request_head<R>(reader: &mut R, max_header_bytes: usize) -> Result<RequestHead>
where
	R: AsyncBufRead + Unpin,
{
	let mut budget = max_header_bytes;

	let line = match read_line_limited(reader, &mut budget, max_header_bytes).await? {
		Some(line) if !line.is_empty() => line,
		_ => return Err(HttpError::MissingRequestLine),
	};

	let mut parts = line.split_whitespace();
	let (method, target) = match (parts.next(), parts.next()) {
		(Some(m), Some(t)) => (m, t),
		_ => return Err(HttpError::MalformedRequestLine(line)),
	};
	let version = parts.next().unwrap_or("HTTP/1.1").to_string();

	let (path, query_string) = match target.split_once('?') {
		Some((p, q)) => (p.to_string(), q.to_string()),
		None => (target.to_string(), String::new()),
	};

	let mut headers = Headers::new();
	while let Some(line) = read_line_limited(reader, &mut budget, max_header_bytes).await? {
		if line.is_empty() {
			break;
		}
		if let Some((name, value)) = line.split_once(':') {
			if !name.trim().is_empty() {
				headers.insert(name, value);
			}
		}
	}

	Ok(RequestHead {
		method: Method::parse(method),
		path,
		query_string,
		version,
		headers,
	})
}

/// Read at most `limit` bytes, returning early and without error at EOF.
pub async fn read_body<R>(reader: &mut R, limit: usize) -> Result<Vec<u8>>
where
	R: AsyncRead + Unpin,
{
	let mut body = Vec::with_capacity(limit.min(64 * 1024));
	(&mut *reader).take(limit as u64).read_to_end(&mut body).await?;
	Ok(body)
}

/// Read the body announced by `Content-Length`. Missing or invalid length means no body.
///
/// A length above `max_body_bytes` is rejected before anything is read.
pub async fn read_request_body<R>(
	reader: &mut R,
	head: &RequestHead,
	max_body_bytes: usize,
) -> Result<Vec<u8>>
where
	R: AsyncRead + Unpin,
{
	match head.headers.content_length() {
		Some(0) | None => Ok(Vec::new()),
		Some(length) if length > max_body_bytes => Err(HttpError::BodyTooLarge {
			length,
			limit: max_body_bytes,
		}),
		Some(length) => read_body(reader, length).await,
	}
}

async fn read_line_limited<R>(
	reader: &mut R,
	budget: &mut usize,
	max_header_bytes: usize,
) -> Result<Option<String>>
where
	R: AsyncBufRead + Unpin,
{
	let mut buf = Vec::new();
	let read = (&mut *reader)
		.take(*budget as u64 + 1)
		.read_until(b'\n', &mut buf)
		.await?;
	if read == 0 {
		return Ok(None);
	}
	if read > *budget {
		return Err(HttpError::HeadTooLarge(max_header_bytes));
	}
	*budget -= read;

	while matches!(buf.last(), Some(b'\n' | b'\r')) {
		buf.pop();
	}
	Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
