// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Recoverable dispatch failures. Callers fall back to inline delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
	#[error("no connection for session {0}")]
	NoConnection(String),

	#[error("no open connection for session {0}")]
	NoOpenConnection(String),

	#[error("failed to encode patch: {0}")]
	Encode(String),
}
