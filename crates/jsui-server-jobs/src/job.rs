// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::future::Future;

use async_trait::async_trait;

use crate::context::TaskContext;
use crate::error::Result;

/// A unit of work producing HTML for a target. `Ok(None)` means "nothing to patch".
#[async_trait]
pub trait PatchJob: Send + Sync + 'static {
	async fn run(&self, ctx: &TaskContext) -> Result<Option<String>>;
}

#[async_trait]
impl<F, Fut> PatchJob for F
where
	F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
	async fn run(&self, ctx: &TaskContext) -> Result<Option<String>> {
		(self)(ctx.clone()).await
	}
}
