// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the browser applies a patch to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapMode {
	/// Replace the target's inner content.
	#[default]
	Inline,
	/// Replace the target element itself.
	Outline,
	Append,
	Prepend,
	/// Nothing is pushed; the result is already in the HTTP response.
	None,
}

impl SwapMode {
	pub fn as_str(self) -> &'static str {
		match self {
			SwapMode::Inline => "inline",
			SwapMode::Outline => "outline",
			SwapMode::Append => "append",
			SwapMode::Prepend => "prepend",
			SwapMode::None => "none",
		}
	}
}

impl fmt::Display for SwapMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SwapMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"inline" => Ok(SwapMode::Inline),
			"outline" => Ok(SwapMode::Outline),
			"append" => Ok(SwapMode::Append),
			"prepend" => Ok(SwapMode::Prepend),
			"none" => Ok(SwapMode::None),
			other => Err(format!("unknown swap mode: {other}")),
		}
	}
}

/// A DOM region that can receive patches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchTarget {
	pub id: String,
	pub swap: SwapMode,
}

impl PatchTarget {
	pub fn new(id: impl Into<String>, swap: SwapMode) -> Self {
		Self { id: id.into(), swap }
	}

	pub fn inline(id: impl Into<String>) -> Self {
		Self::new(id, SwapMode::Inline)
	}
}

/// `{"type":"patch","id":...,"swap":...,"html":...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "patch")]
pub struct PatchMessage {
	pub id: String,
	pub swap: SwapMode,
	pub html: String,
}

impl PatchMessage {
	pub fn new(target_id: impl Into<String>, swap: SwapMode, html: impl Into<String>) -> Self {
		Self {
			id: target_id.into(),
			swap,
			html: html.into(),
		}
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}
}

/// A `<script>` that applies `message` through the client's patch handler.
///
/// Used when a patch cannot be pushed and the current HTTP response will carry it instead.
pub fn inline_script(message: &PatchMessage) -> serde_json::Result<String> {
	let json = message.to_json()?.replace("</", "<\\/");
	Ok(format!(
		"<script>(function(){{var m={json};if(window.__jsui&&window.__jsui.handlePatch){{window.__jsui.handlePatch(m);}}else{{document.addEventListener('DOMContentLoaded',function(){{window.__jsui&&window.__jsui.handlePatch(m);}});}}}})();</script>"
	))
}
