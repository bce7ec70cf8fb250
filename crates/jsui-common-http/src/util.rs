// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use url::form_urlencoded;

/// Look up one cookie in a `Cookie` header value.
pub fn parse_cookie(header: &str, name: &str) -> Option<String> {
	header.split(';').find_map(|pair| {
		let (key, value) = pair.split_once('=')?;
		(key.trim() == name).then(|| value.trim().to_string())
	})
}

/// Decode a form-urlencoded query string. Repeated keys keep the last value.
pub fn parse_query(query: &str) -> HashMap<String, String> {
	form_urlencoded::parse(query.as_bytes())
		.into_owned()
		.collect()
}
