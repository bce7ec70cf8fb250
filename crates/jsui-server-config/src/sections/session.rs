// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session expiry configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const MIN_SESSION_IDLE_TTL_SECS: u64 = 60;
pub const MIN_SESSION_SWEEP_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionConfigLayer {
	pub idle_ttl_secs: Option<u64>,
	pub sweep_interval_secs: Option<u64>,
}

impl SessionConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.idle_ttl_secs.is_some() {
			self.idle_ttl_secs = other.idle_ttl_secs;
		}
		if other.sweep_interval_secs.is_some() {
			self.sweep_interval_secs = other.sweep_interval_secs;
		}
	}

	/// Values below the minimums are raised to them.
	pub fn finalize(self) -> SessionConfig {
		let defaults = SessionConfig::default();
		SessionConfig {
			idle_ttl_secs: self
				.idle_ttl_secs
				.unwrap_or(defaults.idle_ttl_secs)
				.max(MIN_SESSION_IDLE_TTL_SECS),
			sweep_interval_secs: self
				.sweep_interval_secs
				.unwrap_or(defaults.sweep_interval_secs)
				.max(MIN_SESSION_SWEEP_INTERVAL_SECS),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
	pub idle_ttl_secs: u64,
	pub sweep_interval_secs: u64,
}

impl SessionConfig {
	pub fn idle_ttl(&self) -> Duration {
		Duration::from_secs(self.idle_ttl_secs)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_secs(self.sweep_interval_secs)
	}
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			idle_ttl_secs: 1800,
			sweep_interval_secs: 300,
		}
	}
}
