// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use jsui_server_patch::{PatchSender, PatchTarget};
use jsui_server_session::{Cleanup, ClearHook, RegistrationId, SessionManager};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use crate::context::{TaskContext, TaskScope};
use crate::error::{JobError, Result};
use crate::job::PatchJob;
use crate::types::{CancelReason, TaskKind, TaskOutcome, MIN_REPEAT_INTERVAL};

/// Spawns patch-producing tasks and registers their cleanups with the session manager.
pub struct TaskScheduler {
	sessions: Arc<SessionManager>,
	sender: Arc<dyn PatchSender>,
	shutdown: CancellationToken,
}

impl TaskScheduler {
	pub fn new(sessions: Arc<SessionManager>, sender: Arc<dyn PatchSender>) -> Self {
		Self {
			sessions,
			sender,
			shutdown: CancellationToken::new(),
		}
	}

	pub fn sessions(&self) -> &Arc<SessionManager> {
		&self.sessions
	}

	/// Run `job` once in the background and patch `target` with its result.
	#[instrument(skip_all, fields(session_id = %scope.session_id, target = %target.id))]
	pub fn defer<J: PatchJob>(
		&self,
		scope: &TaskScope,
		target: PatchTarget,
		job: J,
		on_clear: Option<ClearHook>,
	) -> TaskHandle {
		let sender = Arc::clone(&self.sender);
		self.spawn(TaskKind::Defer, scope, target, on_clear, move |ctx| async move {
			let result = tokio::select! {
				biased;
				_ = ctx.cancellation_token.cancelled() => {
					return TaskOutcome::Cancelled(CancelReason::Interrupted);
				}
				result = run_guarded(&job, &ctx) => result,
			};
			deliver(&ctx, sender.as_ref(), result);
			TaskOutcome::Finished
		})
	}

	/// Run `job` every `interval` (at least [`MIN_REPEAT_INTERVAL`]), patching each result.
	///
	/// A failing tick is logged and the loop carries on.
	#[instrument(skip_all, fields(session_id = %scope.session_id, target = %target.id, interval = ?interval))]
	pub fn repeat<J: PatchJob>(
		&self,
		scope: &TaskScope,
		target: PatchTarget,
		interval: Duration,
		job: J,
		on_clear: Option<ClearHook>,
	) -> TaskHandle {
		let interval = interval.max(MIN_REPEAT_INTERVAL);
		let sender = Arc::clone(&self.sender);
		self.spawn(TaskKind::Repeat { interval }, scope, target, on_clear, move |ctx| async move {
			loop {
				if !ctx.is_current() {
					return TaskOutcome::Cancelled(CancelReason::StaleGeneration);
				}
				let result = tokio::select! {
					biased;
					_ = ctx.cancellation_token.cancelled() => {
						return TaskOutcome::Cancelled(CancelReason::Interrupted);
					}
					result = run_guarded(&job, &ctx) => result,
				};
				deliver(&ctx, sender.as_ref(), result);

				tokio::select! {
					biased;
					_ = ctx.cancellation_token.cancelled() => {
						return TaskOutcome::Cancelled(CancelReason::Interrupted);
					}
					_ = tokio::time::sleep(interval) => {}
				}
			}
		})
	}

	/// Wait `wait`, then run `job` once and patch its result.
	#[instrument(skip_all, fields(session_id = %scope.session_id, target = %target.id, wait = ?wait))]
	pub fn delay<J: PatchJob>(
		&self,
		scope: &TaskScope,
		target: PatchTarget,
		wait: Duration,
		job: J,
		on_clear: Option<ClearHook>,
	) -> TaskHandle {
		let sender = Arc::clone(&self.sender);
		self.spawn(TaskKind::Delay { wait }, scope, target, on_clear, move |ctx| async move {
			tokio::select! {
				biased;
				_ = ctx.cancellation_token.cancelled() => {
					return TaskOutcome::Cancelled(CancelReason::Interrupted);
				}
				_ = tokio::time::sleep(wait) => {}
			}
			if !ctx.is_current() {
				return TaskOutcome::Cancelled(CancelReason::StaleGeneration);
			}
			let result = tokio::select! {
				biased;
				_ = ctx.cancellation_token.cancelled() => {
					return TaskOutcome::Cancelled(CancelReason::Interrupted);
				}
				result = run_guarded(&job, &ctx) => result,
			};
			deliver(&ctx, sender.as_ref(), result);
			TaskOutcome::Finished
		})
	}

	/// Interrupt every task spawned by this scheduler.
	#[instrument(skip(self))]
	pub fn shutdown(&self) {
		self.shutdown.cancel();
		info!("Task scheduler shut down");
	}

	fn spawn<F, Fut>(
		&self,
		kind: TaskKind,
		scope: &TaskScope,
		target: PatchTarget,
		on_clear: Option<ClearHook>,
		body: F,
	) -> TaskHandle
	where
		F: FnOnce(TaskContext) -> Fut,
		Fut: Future<Output = TaskOutcome> + Send + 'static,
	{
		let token = self.shutdown.child_token();
		let registration = self.sessions.register_clear(
			&scope.session_id,
			&target.id,
			Cleanup::cancel(token.clone()).with_hook(on_clear),
		);

		let ctx = TaskContext::new(
			scope.clone(),
			target.clone(),
			token.clone(),
			Arc::clone(&self.sessions),
		);
		let span = info_span!(
			"patch_task",
			%kind,
			session_id = %scope.session_id,
			target = %target.id,
			generation = scope.generation
		);

		let sessions = Arc::clone(&self.sessions);
		let session_id = scope.session_id.clone();
		let target_id = target.id.clone();
		let task = body(ctx);
		let join = tokio::spawn(
			async move {
				let outcome = task.await;
				sessions.release(&session_id, &target_id, registration);
				debug!(?outcome, "Task ended");
				outcome
			}
			.instrument(span),
		);

		TaskHandle {
			kind,
			target_id: target.id,
			registration,
			token,
			join,
		}
	}
}

/// A running task. Dropping the handle detaches the task.
pub struct TaskHandle {
	kind: TaskKind,
	target_id: String,
	registration: RegistrationId,
	token: CancellationToken,
	join: JoinHandle<TaskOutcome>,
}

impl TaskHandle {
	pub fn kind(&self) -> TaskKind {
		self.kind
	}

	pub fn target_id(&self) -> &str {
		&self.target_id
	}

	pub fn registration(&self) -> RegistrationId {
		self.registration
	}

	/// Interrupt the task without running its clear hook.
	pub fn cancel(&self) {
		self.token.cancel();
	}

	pub fn is_finished(&self) -> bool {
		self.join.is_finished()
	}

	pub async fn join(self) -> TaskOutcome {
		self.join
			.await
			.unwrap_or(TaskOutcome::Cancelled(CancelReason::Interrupted))
	}
}

async fn run_guarded<J: PatchJob>(job: &J, ctx: &TaskContext) -> Result<Option<String>> {
	match AssertUnwindSafe(job.run(ctx)).catch_unwind().await {
		Ok(result) => result,
		Err(panic) => Err(JobError::Panicked(panic_message(panic.as_ref()))),
	}
}

fn deliver(ctx: &TaskContext, sender: &dyn PatchSender, result: Result<Option<String>>) {
	match result {
		Ok(Some(html)) => {
			if !ctx.is_current() {
				debug!("Discarding patch for stale generation");
				return;
			}
			if let Err(e) = sender.send_patch(ctx.session_id(), &ctx.target.id, ctx.target.swap, &html) {
				debug!(error = %e, "Patch not delivered");
			}
		}
		Ok(None) => {}
		Err(e) => warn!(error = %e, "Task job failed"),
	}
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
	if let Some(s) = panic.downcast_ref::<&str>() {
		s.to_string()
	} else if let Some(s) = panic.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use jsui_server_patch::{DispatchError, SwapMode};
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	use std::sync::Mutex;

	#[derive(Default)]
	struct RecordingSender {
		patches: Mutex<Vec<(String, String, SwapMode, String)>>,
	}

	impl RecordingSender {
		fn count(&self) -> usize {
			self.patches.lock().unwrap().len()
		}

		fn htmls(&self) -> Vec<String> {
			self.patches
				.lock()
				.unwrap()
				.iter()
				.map(|p| p.3.clone())
				.collect()
		}
	}

	impl PatchSender for RecordingSender {
		fn send_patch(
			&self,
			session_id: &str,
			target_id: &str,
			swap: SwapMode,
			html: &str,
		) -> std::result::Result<(), DispatchError> {
			self.patches.lock().unwrap().push((
				session_id.to_string(),
				target_id.to_string(),
				swap,
				html.to_string(),
			));
			Ok(())
		}
	}

	fn setup() -> (Arc<SessionManager>, Arc<RecordingSender>, TaskScheduler) {
		let sessions = Arc::new(SessionManager::new());
		let sender = Arc::new(RecordingSender::default());
		let scheduler = TaskScheduler::new(sessions.clone(), sender.clone());
		(sessions, sender, scheduler)
	}

	fn page(sessions: &SessionManager, session_id: &str) -> TaskScope {
		TaskScope::new(session_id, sessions.bump_generation(session_id))
	}

	fn ticking(calls: Arc<AtomicUsize>) -> impl PatchJob {
		move |_ctx: TaskContext| {
			let calls = calls.clone();
			async move {
				let n = calls.fetch_add(1, Ordering::SeqCst);
				Ok::<_, JobError>(Some(format!("tick {n}")))
			}
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_defer_patches_result() {
		let (sessions, sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let handle = scheduler.defer(
			&scope,
			PatchTarget::new("panel", SwapMode::Outline),
			|_ctx: TaskContext| async { Ok::<_, JobError>(Some("<div>done</div>".to_string())) },
			None,
		);
		assert_eq!(handle.join().await, TaskOutcome::Finished);

		let patches = sender.patches.lock().unwrap().clone();
		assert_eq!(
			patches,
			vec![(
				"s".to_string(),
				"panel".to_string(),
				SwapMode::Outline,
				"<div>done</div>".to_string()
			)]
		);
		assert_eq!(sessions.target_count("s"), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_defer_discards_result_for_stale_page() {
		let (sessions, sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let handle = scheduler.defer(
			&scope,
			PatchTarget::inline("panel"),
			|_ctx: TaskContext| async {
				tokio::time::sleep(Duration::from_millis(100)).await;
				Ok::<_, JobError>(Some("late".to_string()))
			},
			None,
		);
		sessions.bump_generation("s");
		assert_eq!(handle.join().await, TaskOutcome::Finished);
		assert_eq!(sender.count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_repeat_stops_when_generation_moves_on() {
		let (sessions, sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let calls = Arc::new(AtomicUsize::new(0));
		let handle = scheduler.repeat(
			&scope,
			PatchTarget::inline("clock"),
			Duration::from_millis(100),
			ticking(calls.clone()),
			None,
		);

		tokio::time::sleep(Duration::from_millis(250)).await;
		let before = sender.count();
		assert!(before >= 2, "expected at least two ticks, got {before}");

		sessions.bump_generation("s");
		assert_eq!(
			handle.join().await,
			TaskOutcome::Cancelled(CancelReason::StaleGeneration)
		);
		assert_eq!(sender.count(), before);
		assert_eq!(sessions.target_count("s"), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_repeat_survives_failing_first_tick() {
		let (sessions, sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let calls = Arc::new(AtomicUsize::new(0));
		let c = calls.clone();
		let handle = scheduler.repeat(
			&scope,
			PatchTarget::inline("clock"),
			Duration::from_millis(100),
			move |_ctx: TaskContext| {
				let c = c.clone();
				async move {
					if c.fetch_add(1, Ordering::SeqCst) == 0 {
						Err(JobError::failed("first tick"))
					} else {
						Ok(Some("ok".to_string()))
					}
				}
			},
			None,
		);

		tokio::time::sleep(Duration::from_millis(150)).await;
		assert_eq!(calls.load(Ordering::SeqCst), 2);
		assert_eq!(sender.htmls(), vec!["ok".to_string()]);
		handle.cancel();
		assert_eq!(handle.join().await, TaskOutcome::Cancelled(CancelReason::Interrupted));
	}

	#[tokio::test(start_paused = true)]
	async fn test_repeat_survives_panicking_tick() {
		let (sessions, sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let calls = Arc::new(AtomicUsize::new(0));
		let c = calls.clone();
		let handle = scheduler.repeat(
			&scope,
			PatchTarget::inline("clock"),
			Duration::from_millis(100),
			move |_ctx: TaskContext| {
				let c = c.clone();
				async move {
					if c.fetch_add(1, Ordering::SeqCst) == 0 {
						panic!("tick exploded");
					}
					Ok::<_, JobError>(Some("recovered".to_string()))
				}
			},
			None,
		);

		tokio::time::sleep(Duration::from_millis(150)).await;
		assert_eq!(sender.htmls(), vec!["recovered".to_string()]);
		handle.cancel();
		handle.join().await;
	}

	#[tokio::test(start_paused = true)]
	async fn test_repeat_interval_has_floor() {
		let (sessions, _sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let calls = Arc::new(AtomicUsize::new(0));
		let handle = scheduler.repeat(
			&scope,
			PatchTarget::inline("clock"),
			Duration::from_millis(1),
			ticking(calls.clone()),
			None,
		);
		assert_eq!(
			handle.kind(),
			TaskKind::Repeat {
				interval: MIN_REPEAT_INTERVAL
			}
		);

		tokio::time::sleep(Duration::from_millis(120)).await;
		let n = calls.load(Ordering::SeqCst);
		assert!((2..=3).contains(&n), "unexpected tick count {n}");
		handle.cancel();
	}

	#[tokio::test(start_paused = true)]
	async fn test_trigger_clear_interrupts_and_runs_hook() {
		let (sessions, _sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let hook_ran = Arc::new(AtomicBool::new(false));
		let flag = hook_ran.clone();
		let handle = scheduler.repeat(
			&scope,
			PatchTarget::inline("clock"),
			Duration::from_millis(100),
			ticking(Arc::new(AtomicUsize::new(0))),
			Some(Box::new(move || flag.store(true, Ordering::SeqCst))),
		);

		tokio::time::sleep(Duration::from_millis(10)).await;
		assert!(sessions.trigger_clear("s", "clock"));
		assert_eq!(handle.join().await, TaskOutcome::Cancelled(CancelReason::Interrupted));
		assert!(hook_ran.load(Ordering::SeqCst));
	}

	#[tokio::test(start_paused = true)]
	async fn test_cancelled_handle_does_not_run_hook() {
		let (sessions, _sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let hook_ran = Arc::new(AtomicBool::new(false));
		let flag = hook_ran.clone();
		let handle = scheduler.delay(
			&scope,
			PatchTarget::inline("note"),
			Duration::from_secs(5),
			ticking(Arc::new(AtomicUsize::new(0))),
			Some(Box::new(move || flag.store(true, Ordering::SeqCst))),
		);
		handle.cancel();
		assert_eq!(handle.join().await, TaskOutcome::Cancelled(CancelReason::Interrupted));
		assert!(!hook_ran.load(Ordering::SeqCst));
		assert_eq!(sessions.target_count("s"), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_delay_waits_then_patches() {
		let (sessions, sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let calls = Arc::new(AtomicUsize::new(0));
		let handle = scheduler.delay(
			&scope,
			PatchTarget::inline("note"),
			Duration::from_millis(500),
			ticking(calls.clone()),
			None,
		);

		tokio::time::sleep(Duration::from_millis(400)).await;
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert_eq!(handle.join().await, TaskOutcome::Finished);
		assert_eq!(sender.htmls(), vec!["tick 0".to_string()]);
	}

	#[tokio::test(start_paused = true)]
	async fn test_delay_interrupted_by_page_load_clear() {
		let (sessions, sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let calls = Arc::new(AtomicUsize::new(0));
		let handle = scheduler.delay(
			&scope,
			PatchTarget::inline("note"),
			Duration::from_millis(500),
			ticking(calls.clone()),
			None,
		);
		assert_eq!(sessions.clear_all_targets("s"), 1);
		assert_eq!(handle.join().await, TaskOutcome::Cancelled(CancelReason::Interrupted));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert_eq!(sender.count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_delay_skips_stale_page() {
		let (sessions, sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let handle = scheduler.delay(
			&scope,
			PatchTarget::inline("note"),
			Duration::from_millis(100),
			ticking(Arc::new(AtomicUsize::new(0))),
			None,
		);
		sessions.bump_generation("s");
		assert_eq!(
			handle.join().await,
			TaskOutcome::Cancelled(CancelReason::StaleGeneration)
		);
		assert_eq!(sender.count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_finished_task_keeps_newer_registration() {
		let (sessions, _sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let older = scheduler.defer(
			&scope,
			PatchTarget::inline("t"),
			|_ctx: TaskContext| async {
				tokio::time::sleep(Duration::from_millis(100)).await;
				Ok::<_, JobError>(None)
			},
			None,
		);
		let newer = scheduler.repeat(
			&scope,
			PatchTarget::inline("t"),
			Duration::from_millis(50),
			ticking(Arc::new(AtomicUsize::new(0))),
			None,
		);
		assert_eq!(older.join().await, TaskOutcome::Finished);
		assert_eq!(sessions.target_count("s"), 1);

		assert!(sessions.trigger_clear("s", "t"));
		assert_eq!(newer.join().await, TaskOutcome::Cancelled(CancelReason::Interrupted));
	}

	#[tokio::test(start_paused = true)]
	async fn test_shutdown_interrupts_tasks() {
		let (sessions, _sender, scheduler) = setup();
		let scope = page(&sessions, "s");
		let handle = scheduler.repeat(
			&scope,
			PatchTarget::inline("clock"),
			Duration::from_millis(100),
			ticking(Arc::new(AtomicUsize::new(0))),
			None,
		);
		scheduler.shutdown();
		assert_eq!(handle.join().await, TaskOutcome::Cancelled(CancelReason::Interrupted));
	}
}
