// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a `*ConfigLayer` (all optional) and a resolved `*Config`.

mod http;
mod logging;
mod security;
mod session;
mod shutdown;
mod websocket;

pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use security::{SecurityConfig, SecurityConfigLayer};
pub use session::{SessionConfig, SessionConfigLayer, MIN_SESSION_IDLE_TTL_SECS, MIN_SESSION_SWEEP_INTERVAL_SECS};
pub use shutdown::{ShutdownConfig, ShutdownConfigLayer};
pub use websocket::{WebSocketConfig, WebSocketConfigLayer};
