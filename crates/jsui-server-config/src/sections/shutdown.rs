// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShutdownConfigLayer {
	pub grace_secs: Option<u64>,
}

impl ShutdownConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.grace_secs.is_some() {
			self.grace_secs = other.grace_secs;
		}
	}

	pub fn finalize(self) -> ShutdownConfig {
		ShutdownConfig {
			grace_secs: self.grace_secs.unwrap_or(ShutdownConfig::default().grace_secs),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShutdownConfig {
	/// How long in-flight connections get to finish after the acceptor stops.
	pub grace_secs: u64,
}

impl ShutdownConfig {
	pub fn grace(&self) -> Duration {
		Duration::from_secs(self.grace_secs)
	}
}

impl Default for ShutdownConfig {
	fn default() -> Self {
		Self { grace_secs: 5 }
	}
}
