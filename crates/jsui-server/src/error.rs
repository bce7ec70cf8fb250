// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::net::SocketAddr;

use jsui_common_http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
	#[error("cannot resolve listen address {0}")]
	Resolve(String),

	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		#[source]
		source: std::io::Error,
	},

	#[error("HTTP error: {0}")]
	Http(#[from] HttpError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
