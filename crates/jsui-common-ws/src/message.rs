// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON control messages carried in text frames.

use serde::{Deserialize, Serialize};

/// Browser to server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
	Ping,
	Pong,
	/// The browser received a patch for a target it cannot find.
	Invalid { id: String },
}

impl ClientMessage {
	/// Decode a text payload. Anything that is not one of the known shapes is `None`.
	pub fn parse(text: &str) -> Option<Self> {
		serde_json::from_str(text).ok()
	}
}

/// Server to browser control messages. Patches are encoded by the patch crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
	Pong,
}

impl ServerMessage {
	pub fn to_json(&self) -> String {
		match self {
			ServerMessage::Pong => r#"{"type":"pong"}"#.to_string(),
		}
	}
}
