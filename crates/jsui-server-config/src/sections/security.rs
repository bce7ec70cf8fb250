// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SecurityConfigLayer {
	pub content_security_policy: Option<String>,
}

impl SecurityConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.content_security_policy.is_some() {
			self.content_security_policy = other.content_security_policy;
		}
	}

	pub fn finalize(self) -> SecurityConfig {
		SecurityConfig {
			content_security_policy: self
				.content_security_policy
				.filter(|csp| !csp.trim().is_empty()),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SecurityConfig {
	/// Overrides the built-in Content-Security-Policy when set.
	pub content_security_policy: Option<String>,
}
