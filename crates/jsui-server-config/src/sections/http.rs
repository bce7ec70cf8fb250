// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP listener configuration section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HttpConfigLayer {
	pub host: Option<String>,
	pub port: Option<u16>,
	pub backlog: Option<u32>,
	pub max_header_bytes: Option<usize>,
	pub max_body_bytes: Option<usize>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.backlog.is_some() {
			self.backlog = other.backlog;
		}
		if other.max_header_bytes.is_some() {
			self.max_header_bytes = other.max_header_bytes;
		}
		if other.max_body_bytes.is_some() {
			self.max_body_bytes = other.max_body_bytes;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		let defaults = HttpConfig::default();
		HttpConfig {
			host: self.host.unwrap_or(defaults.host),
			port: self.port.unwrap_or(defaults.port),
			backlog: self.backlog.unwrap_or(defaults.backlog).max(1),
			max_header_bytes: self
				.max_header_bytes
				.unwrap_or(defaults.max_header_bytes)
				.max(1024),
			max_body_bytes: self.max_body_bytes.unwrap_or(defaults.max_body_bytes),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
	/// Pending-connection queue length passed to `listen`.
	pub backlog: u32,
	/// Cap on request line plus headers.
	pub max_header_bytes: usize,
	/// Largest `Content-Length` accepted; bigger requests get 400.
	pub max_body_bytes: usize,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 8080,
			backlog: 50,
			max_header_bytes: 64 * 1024,
			max_body_bytes: 10 * 1024 * 1024,
		}
	}
}
