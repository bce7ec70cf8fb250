// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process session state for the jsui push channel.
//!
//! - [`SessionManager`] tracks per-session page generations and the cleanup
//!   registered for each live patch target.
//! - [`ConnectionRegistry`] tracks open WebSocket connections, globally and
//!   per session.
//!
//! Both are plain values meant to be shared behind an `Arc`; nothing here is
//! process-global.

pub mod cleanup;
pub mod connection;
pub mod registry;
pub mod session;

pub use cleanup::{Cleanup, ClearHook};
pub use connection::{
	run_writer, Connection, ConnectionClosed, ConnectionId, OutboundFrames, DEFAULT_SEND_QUEUE_FRAMES,
};
pub use registry::ConnectionRegistry;
pub use session::{RegistrationId, SessionManager};
