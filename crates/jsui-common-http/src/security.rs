// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Security headers attached to every HTTP response.

/// Policy used when no override is configured.
pub const DEFAULT_CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
	script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
	style-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
	img-src 'self' data: https:; \
	font-src 'self' https:; \
	connect-src 'self' wss: ws:; \
	frame-ancestors 'self'";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeaders {
	pub content_security_policy: String,
}

impl Default for SecurityHeaders {
	fn default() -> Self {
		Self {
			content_security_policy: DEFAULT_CONTENT_SECURITY_POLICY.to_string(),
		}
	}
}

impl SecurityHeaders {
	/// Use `csp` when it is non-blank, otherwise the default policy.
	pub fn with_policy(csp: Option<&str>) -> Self {
		match csp.map(str::trim) {
			Some(csp) if !csp.is_empty() => Self {
				content_security_policy: csp.to_string(),
			},
			_ => Self::default(),
		}
	}

	/// Name/value pairs in emission order.
	pub fn pairs(&self) -> [(&'static str, &str); 5] {
		[
			("Content-Security-Policy", self.content_security_policy.as_str()),
			("X-Frame-Options", "SAMEORIGIN"),
			("X-Content-Type-Options", "nosniff"),
			("Referrer-Policy", "strict-origin-when-cross-origin"),
			(
				"Permissions-Policy",
				"camera=(), microphone=(), geolocation=()",
			),
		]
	}
}
