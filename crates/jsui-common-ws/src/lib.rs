// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server side of the WebSocket protocol as used by jsui.
//!
//! Only what the push channel needs: the upgrade handshake, single-frame
//! messages (no fragmentation, no extensions) and the two small JSON control
//! messages exchanged with the browser.

pub mod error;
pub mod frame;
pub mod handshake;
pub mod message;

pub use error::FrameError;
pub use frame::{encode_frame, encode_masked_frame, read_frame, Frame, Opcode};
pub use handshake::{compute_accept_key, handshake_response, WS_GUID};
pub use message::{ClientMessage, ServerMessage};

/// Default cap on a single frame payload.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;
