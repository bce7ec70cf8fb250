// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background tasks bound to a page generation.
//!
//! This crate provides three task primitives that push their results to one
//! patch target:
//! - `defer`: run once in the background
//! - `repeat`: run on an interval until stopped
//! - `delay`: run once after a wait
//!
//! A task stops when its session moves to a newer generation, when its target
//! is cleared through the [`SessionManager`](jsui_server_session::SessionManager),
//! or when the scheduler shuts down.

pub mod context;
pub mod error;
pub mod job;
pub mod scheduler;
pub mod types;

pub use context::{TaskContext, TaskScope};
pub use error::{JobError, Result};
pub use job::PatchJob;
pub use scheduler::{TaskHandle, TaskScheduler};
pub use types::{CancelReason, TaskKind, TaskOutcome, MIN_REPEAT_INTERVAL};
