// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! jsui server: one listener for page requests and the WebSocket patch channel.
//!
//! A page render (`GET`) starts a new generation for the browser session and
//! stops every background task left over from the previous page. Routes run
//! behind the [`RouteDispatcher`] seam and receive a [`RequestContext`] from
//! which they can push patches immediately or schedule Defer / Repeat / Delay
//! tasks that keep patching the page over its WebSocket.

pub mod client;
mod connection;
pub mod context;
pub mod error;
mod http;
pub mod router;
pub mod server;
pub mod state;
mod websocket;

pub use context::RequestContext;
pub use error::ServerError;
pub use router::RouteDispatcher;
pub use server::Server;
pub use state::AppState;

pub use jsui_server_config::ServerConfig;
pub use jsui_server_jobs::{JobError, PatchJob, TaskContext, TaskHandle, TaskOutcome};
pub use jsui_server_patch::{PatchTarget, SwapMode};
