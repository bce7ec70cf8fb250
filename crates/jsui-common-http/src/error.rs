// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for HTTP parsing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Debug, Error)]
pub enum HttpError {
	/// The peer closed the connection or sent a blank first line.
	#[error("missing request line")]
	MissingRequestLine,

	/// The request line did not have at least a method and a target.
	#[error("invalid request line: {0}")]
	MalformedRequestLine(String),

	/// Request line plus headers exceeded the configured limit.
	#[error("request head exceeds {0} bytes")]
	HeadTooLarge(usize),

	/// `Content-Length` announced more than the configured limit.
	#[error("request body of {length} bytes exceeds {limit}")]
	BodyTooLarge { length: usize, limit: usize },

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl HttpError {
	/// Whether this error should be answered with `400 Bad Request`.
	///
	/// I/O failures mean the peer is gone, so there is nobody to answer.
	pub fn is_bad_request(&self) -> bool {
		!matches!(self, HttpError::Io(_))
	}
}
