// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The patch protocol: pushing an HTML fragment to one DOM target of one session.

pub mod dispatch;
pub mod error;
pub mod message;

pub use dispatch::{PatchDispatcher, PatchSender};
pub use error::DispatchError;
pub use message::{inline_script, PatchMessage, PatchTarget, SwapMode};
