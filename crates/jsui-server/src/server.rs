// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Listener, accept loop, idle-session sweeper and graceful shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use jsui_server_config::ServerConfig;
use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::connection::handle_connection;
use crate::error::ServerError;
use crate::router::RouteDispatcher;
use crate::state::AppState;

pub struct Server {
	listener: TcpListener,
	state: Arc<AppState>,
}

impl Server {
	/// Bind the configured address. Port `0` picks a free port.
	pub async fn bind(config: ServerConfig, routes: Arc<dyn RouteDispatcher>) -> Result<Self, ServerError> {
		let addr_str = config.socket_addr();
		let addr = tokio::net::lookup_host(&addr_str)
			.await
			.map_err(|e| ServerError::Resolve(format!("{addr_str}: {e}")))?
			.next()
			.ok_or_else(|| ServerError::Resolve(addr_str.clone()))?;

		let listener = listen(addr, config.http.backlog).map_err(|source| {
			error!(addr = %addr, error = %source, "Failed to bind");
			ServerError::Bind { addr, source }
		})?;
		info!(addr = %listener.local_addr()?, backlog = config.http.backlog, "Listening");

		Ok(Self {
			listener,
			state: Arc::new(AppState::new(config, routes)),
		})
	}

	pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
		self.listener.local_addr()
	}

	pub fn state(&self) -> &Arc<AppState> {
		&self.state
	}

	/// Accept connections until `shutdown` resolves, then drain.
	///
	/// Open WebSockets get a close frame, background tasks are interrupted and
	/// in-flight workers have `shutdown.grace_secs` to finish.
	pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
	where
		F: Future<Output = ()>,
	{
		let Self { listener, state } = self;
		let token = CancellationToken::new();
		let tracker = TaskTracker::new();
		let sweeper = spawn_sweeper(Arc::clone(&state), token.child_token());

		tokio::pin!(shutdown);
		loop {
			tokio::select! {
				biased;
				_ = &mut shutdown => {
					info!("Shutdown requested");
					break;
				}
				accepted = listener.accept() => match accepted {
					Ok((stream, peer)) => {
						tracker.spawn(handle_connection(
							stream,
							peer,
							Arc::clone(&state),
							token.child_token(),
						));
					}
					Err(e) => error!("Accept error: {e}"),
				},
			}
		}
		drop(listener);

		token.cancel();
		state.scheduler.shutdown();
		for conn in state.connections.all() {
			conn.close();
		}

		tracker.close();
		let grace = state.config.shutdown.grace();
		if tokio::time::timeout(grace, tracker.wait()).await.is_err() {
			warn!(in_flight = tracker.len(), grace_secs = grace.as_secs(), "Grace period elapsed with connections still open");
		}
		if let Err(e) = sweeper.await {
			debug!(error = %e, "Session sweeper ended abnormally");
		}

		info!("Server stopped");
		Ok(())
	}
}

fn listen(addr: SocketAddr, backlog: u32) -> std::io::Result<TcpListener> {
	let socket = if addr.is_ipv4() {
		TcpSocket::new_v4()?
	} else {
		TcpSocket::new_v6()?
	};
	socket.set_reuseaddr(true)?;
	socket.bind(addr)?;
	socket.listen(backlog)
}

/// Periodically drop sessions that have not been seen for `session.idle_ttl_secs`.
fn spawn_sweeper(state: Arc<AppState>, token: CancellationToken) -> JoinHandle<()> {
	let ttl = state.config.session.idle_ttl();
	let every = state.config.session.sweep_interval();
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		loop {
			tokio::select! {
				biased;
				_ = token.cancelled() => break,
				_ = ticker.tick() => {
					let removed = state.sessions.sweep_idle(ttl);
					if removed > 0 {
						info!(removed, remaining = state.sessions.session_count(), "Swept idle sessions");
					}
				}
			}
		}
	})
}
