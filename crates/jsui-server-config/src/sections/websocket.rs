// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebSocketConfigLayer {
	pub max_frame_bytes: Option<usize>,
	pub send_queue_frames: Option<usize>,
}

impl WebSocketConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.max_frame_bytes.is_some() {
			self.max_frame_bytes = other.max_frame_bytes;
		}
		if other.send_queue_frames.is_some() {
			self.send_queue_frames = other.send_queue_frames;
		}
	}

	pub fn finalize(self) -> WebSocketConfig {
		let defaults = WebSocketConfig::default();
		WebSocketConfig {
			max_frame_bytes: self.max_frame_bytes.unwrap_or(defaults.max_frame_bytes),
			send_queue_frames: self
				.send_queue_frames
				.unwrap_or(defaults.send_queue_frames)
				.max(1),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSocketConfig {
	pub max_frame_bytes: usize,
	/// Outbound frames a connection may queue before it is closed as stalled.
	pub send_queue_frames: usize,
}

impl Default for WebSocketConfig {
	fn default() -> Self {
		Self {
			max_frame_bytes: 16 * 1024 * 1024,
			send_queue_frames: 256,
		}
	}
}
