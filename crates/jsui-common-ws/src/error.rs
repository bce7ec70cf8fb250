// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
	/// Stream ended part-way through a frame.
	#[error("truncated frame")]
	Truncated,

	#[error("frame payload of {len} bytes exceeds limit of {max}")]
	TooLarge { len: u64, max: usize },

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
