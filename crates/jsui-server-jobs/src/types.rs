// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::time::Duration;

/// Shortest interval a repeating task may tick at.
pub const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
	Defer,
	Repeat { interval: Duration },
	Delay { wait: Duration },
}

impl fmt::Display for TaskKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TaskKind::Defer => f.write_str("defer"),
			TaskKind::Repeat { .. } => f.write_str("repeat"),
			TaskKind::Delay { .. } => f.write_str("delay"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
	/// Cleared through the session registry, or the scheduler shut down.
	Interrupted,
	/// The session moved on to a newer page generation.
	StaleGeneration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
	Finished,
	Cancelled(CancelReason),
}
