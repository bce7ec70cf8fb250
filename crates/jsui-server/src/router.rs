// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::context::RequestContext;

/// Application routes.
///
/// `Ok(Some(html))` is the response body, `Ok(None)` means no route matched
/// (404) and `Err` becomes a 500 carrying the error message.
#[async_trait]
pub trait RouteDispatcher: Send + Sync + 'static {
	async fn invoke(&self, path: &str, ctx: &RequestContext) -> anyhow::Result<Option<String>>;
}
