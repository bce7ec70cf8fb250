// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Demo page: a ticking clock, a deferred panel, a delayed notice and an action.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsui_server::client::boot_script_tag;
use jsui_server::{JobError, PatchTarget, RequestContext, RouteDispatcher, SwapMode, TaskContext};

pub struct DemoRoutes;

#[async_trait]
impl RouteDispatcher for DemoRoutes {
	async fn invoke(&self, path: &str, ctx: &RequestContext) -> anyhow::Result<Option<String>> {
		match path {
			"/" => Ok(Some(index(ctx))),
			"/act/ping" => {
				let who = ctx.param("who").unwrap_or("someone");
				ctx.patch(
					&PatchTarget::new("log", SwapMode::Prepend),
					format!("<li>{} pinged at {}</li>", escape(who), clock_text()),
				);
				Ok(Some(String::new()))
			}
			_ => Ok(None),
		}
	}
}

fn index(ctx: &RequestContext) -> String {
	ctx.repeat(
		PatchTarget::inline("clock"),
		Duration::from_secs(1),
		|_: TaskContext| async move { Ok::<_, JobError>(Some(clock_text())) },
		None,
	);

	ctx.defer(
		PatchTarget::new("panel", SwapMode::Outline),
		|_: TaskContext| async move {
			tokio::time::sleep(Duration::from_millis(500)).await;
			Ok::<_, JobError>(Some(r#"<section id="panel">Loaded in the background.</section>"#.to_string()))
		},
		None,
	);

	ctx.delay(
		PatchTarget::new("notice", SwapMode::Append),
		Duration::from_secs(3),
		|ctx: TaskContext| async move {
			Ok::<_, JobError>(Some(format!(
				"<p>Still here after three seconds (page {}).</p>",
				ctx.scope.generation
			)))
		},
		None,
	);

	format!(
		r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>jsui demo</title>{boot}</head>
<body>
<h1>jsui demo</h1>
<p>Time: <span id="clock">{clock}</span></p>
<section id="panel">Loading...</section>
<div id="notice"></div>
<form method="post" action="/act/ping" onsubmit="fetch(this.action, {{method: 'POST', body: new URLSearchParams(new FormData(this))}}); return false;">
<input name="who" placeholder="name"> <button>Ping</button>
</form>
<ul id="log"></ul>
</body>
</html>"#,
		boot = boot_script_tag(),
		clock = clock_text(),
	)
}

/// `HH:MM:SS` in UTC.
fn clock_text() -> String {
	let secs = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0);
	format!("{:02}:{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60, secs % 60)
}

fn escape(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}
