// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session generations and per-target cleanup registrations.
//!
//! Cleanups always run after their entry has been removed from the map, so a
//! cleanup may call back into the manager (including removing other targets)
//! without deadlocking or observing a half-updated map.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cleanup::Cleanup;

/// Identifies one `register_clear` call, so a task can release only its own entry.
pub type RegistrationId = u64;

struct Registration {
	id: RegistrationId,
	cleanup: Cleanup,
}

struct SessionRecord {
	generation: AtomicU64,
	/// Milliseconds since the manager's epoch.
	last_seen: AtomicU64,
	targets: DashMap<String, Registration>,
}

pub struct SessionManager {
	sessions: DashMap<String, Arc<SessionRecord>>,
	next_registration: AtomicU64,
	epoch: Instant,
}

impl Default for SessionManager {
	fn default() -> Self {
		Self::new()
	}
}

impl SessionManager {
	pub fn new() -> Self {
		Self {
			sessions: DashMap::new(),
			next_registration: AtomicU64::new(1),
			epoch: Instant::now(),
		}
	}

	/// Create the session if unseen and refresh its last-seen time.
	pub fn touch(&self, session_id: &str) {
		self.record(session_id);
	}

	/// Start a new page generation. Returns the new value.
	pub fn bump_generation(&self, session_id: &str) -> u64 {
		let generation = self.record(session_id).generation.fetch_add(1, Ordering::SeqCst) + 1;
		debug!(session_id = %session_id, generation, "Bumped session generation");
		generation
	}

	/// Current generation; 0 for a session never seen.
	pub fn current_generation(&self, session_id: &str) -> u64 {
		self.sessions
			.get(session_id)
			.map(|r| r.generation.load(Ordering::SeqCst))
			.unwrap_or(0)
	}

	/// Store the cleanup for `target_id`, replacing any previous one without running it.
	pub fn register_clear(&self, session_id: &str, target_id: &str, cleanup: Cleanup) -> RegistrationId {
		let id = self.next_registration.fetch_add(1, Ordering::Relaxed);
		let replaced = self
			.record(session_id)
			.targets
			.insert(target_id.to_string(), Registration { id, cleanup });
		if replaced.is_some() {
			debug!(session_id = %session_id, target = %target_id, "Replaced target registration");
		}
		id
	}

	/// Remove and run the cleanup for `target_id`. Returns whether one was registered.
	pub fn trigger_clear(&self, session_id: &str, target_id: &str) -> bool {
		let Some(record) = self.existing(session_id) else {
			return false;
		};
		let Some((_, registration)) = record.targets.remove(target_id) else {
			return false;
		};
		debug!(session_id = %session_id, target = %target_id, "Clearing target");
		registration.cleanup.run(session_id, target_id);
		true
	}

	/// Remove and run every cleanup registered for the session. Returns how many ran.
	pub fn clear_all_targets(&self, session_id: &str) -> usize {
		match self.existing(session_id) {
			Some(record) => drain_targets(session_id, &record),
			None => 0,
		}
	}

	/// Drop the registration for `target_id` without running it, if it is still `registration`.
	pub fn release(&self, session_id: &str, target_id: &str, registration: RegistrationId) -> bool {
		let Some(record) = self.existing(session_id) else {
			return false;
		};
		record
			.targets
			.remove_if(target_id, |_, r| r.id == registration)
			.is_some()
	}

	/// Remove sessions idle for longer than `ttl`, running all their cleanups.
	/// Returns the number of sessions removed.
	pub fn sweep_idle(&self, ttl: Duration) -> usize {
		let now = self.now_millis();
		let ttl = ttl.as_millis() as u64;
		let is_idle = |r: &SessionRecord| now.saturating_sub(r.last_seen.load(Ordering::SeqCst)) > ttl;

		let candidates: Vec<String> = self
			.sessions
			.iter()
			.filter(|e| is_idle(e.value()))
			.map(|e| e.key().clone())
			.collect();

		let mut removed = 0;
		for session_id in candidates {
			if let Some((_, record)) = self.sessions.remove_if(&session_id, |_, r| is_idle(r)) {
				let cleared = drain_targets(&session_id, &record);
				debug!(session_id = %session_id, cleared, "Expired idle session");
				removed += 1;
			}
		}
		if removed > 0 {
			info!(removed, remaining = self.sessions.len(), "Swept idle sessions");
		}
		removed
	}

	pub fn contains(&self, session_id: &str) -> bool {
		self.sessions.contains_key(session_id)
	}

	pub fn session_count(&self) -> usize {
		self.sessions.len()
	}

	pub fn target_count(&self, session_id: &str) -> usize {
		self.existing(session_id).map(|r| r.targets.len()).unwrap_or(0)
	}

	fn record(&self, session_id: &str) -> Arc<SessionRecord> {
		let now = self.now_millis();
		let record = Arc::clone(&self.sessions.entry(session_id.to_string()).or_insert_with(|| {
			Arc::new(SessionRecord {
				generation: AtomicU64::new(0),
				last_seen: AtomicU64::new(now),
				targets: DashMap::new(),
			})
		}));
		record.last_seen.store(now, Ordering::SeqCst);
		record
	}

	fn existing(&self, session_id: &str) -> Option<Arc<SessionRecord>> {
		self.sessions.get(session_id).map(|r| Arc::clone(r.value()))
	}

	fn now_millis(&self) -> u64 {
		self.epoch.elapsed().as_millis() as u64
	}
}

fn drain_targets(session_id: &str, record: &SessionRecord) -> usize {
	let keys: Vec<String> = record.targets.iter().map(|e| e.key().clone()).collect();
	let mut ran = 0;
	for target_id in keys {
		if let Some((_, registration)) = record.targets.remove(&target_id) {
			registration.cleanup.run(session_id, &target_id);
			ran += 1;
		}
	}
	ran
}
