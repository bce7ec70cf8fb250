// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsui_common_ws::{encode_masked_frame, read_frame, Frame, Opcode};
use jsui_server::{
	AppState, JobError, PatchTarget, RequestContext, RouteDispatcher, Server, ServerConfig,
	ServerError, SwapMode, TaskContext,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const WS_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";
pub const WS_ACCEPT: &str = "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=";

#[derive(Default)]
pub struct TestRoutes {
	pub invocations: AtomicUsize,
	pub cleared: Arc<AtomicUsize>,
}

#[async_trait]
impl RouteDispatcher for TestRoutes {
	async fn invoke(&self, path: &str, ctx: &RequestContext) -> anyhow::Result<Option<String>> {
		self.invocations.fetch_add(1, Ordering::SeqCst);
		match path {
			"/" => {
				ctx.patch(&PatchTarget::inline("greeting"), "<em>hello</em>");
				Ok(Some("<p>home</p>".to_string()))
			}
			"/fail" => Err(anyhow::anyhow!("database exploded")),
			"/panic" => panic!("kaboom"),
			"/act/go" => {
				let value = ctx.param("value").unwrap_or("none").to_string();
				ctx.patch(&PatchTarget::new("status", SwapMode::Outline), format!("<b>{value}</b>"));
				Ok(Some("ok".to_string()))
			}
			"/ticker" => {
				ctx.repeat(
					PatchTarget::inline("tick"),
					Duration::from_millis(50),
					|_: TaskContext| async move { Ok::<_, JobError>(Some("tick".to_string())) },
					None,
				);
				Ok(Some("ticking".to_string()))
			}
			"/slow" => {
				let cleared = Arc::clone(&self.cleared);
				ctx.defer(
					PatchTarget::inline("slow"),
					|_: TaskContext| async move {
						tokio::time::sleep(Duration::from_secs(3600)).await;
						Ok::<_, JobError>(Some("late".to_string()))
					},
					Some(Box::new(move || {
						cleared.fetch_add(1, Ordering::SeqCst);
					})),
				);
				Ok(Some("waiting".to_string()))
			}
			"/chart" => {
				let cleared = Arc::clone(&self.cleared);
				let agent = ctx.header("user-agent").unwrap_or("unknown").to_string();
				ctx.patch_with_clear(
					&PatchTarget::inline("chart"),
					format!("<i>{agent}</i>"),
					Some(Box::new(move || {
						cleared.fetch_add(1, Ordering::SeqCst);
					})),
				);
				Ok(Some("chart".to_string()))
			}
			_ => Ok(None),
		}
	}
}

pub struct TestServer {
	pub addr: SocketAddr,
	pub state: Arc<AppState>,
	pub routes: Arc<TestRoutes>,
	shutdown: Option<oneshot::Sender<()>>,
	handle: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestServer {
	pub async fn start() -> Self {
		let mut config = ServerConfig::default();
		config.http.host = "127.0.0.1".to_string();
		config.http.port = 0;
		config.shutdown.grace_secs = 1;

		let routes = Arc::new(TestRoutes::default());
		let server = Server::bind(config, routes.clone()).await.unwrap();
		let addr = server.local_addr().unwrap();
		let state = Arc::clone(server.state());

		let (tx, rx) = oneshot::channel::<()>();
		let handle = tokio::spawn(server.run(async {
			let _ = rx.await;
		}));

		Self {
			addr,
			state,
			routes,
			shutdown: Some(tx),
			handle: Some(handle),
		}
	}

	/// Send raw request bytes and read until the server closes the connection.
	pub async fn raw(&self, request: &str) -> String {
		let mut stream = TcpStream::connect(self.addr).await.unwrap();
		stream.write_all(request.as_bytes()).await.unwrap();
		let mut out = Vec::new();
		stream.read_to_end(&mut out).await.unwrap();
		String::from_utf8_lossy(&out).into_owned()
	}

	pub async fn get(&self, path: &str, session: Option<&str>) -> String {
		self.raw(&request("GET", path, session, "")).await
	}

	pub async fn post(&self, path: &str, session: Option<&str>, body: &str) -> String {
		self.raw(&request("POST", path, session, body)).await
	}

	pub async fn websocket(&self, path: &str, session: Option<&str>) -> (TcpStream, String) {
		let mut stream = TcpStream::connect(self.addr).await.unwrap();
		let mut req = format!(
			"GET {path} HTTP/1.1\r\nHost: localhost\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Key: {WS_KEY}\r\nSec-WebSocket-Version: 13\r\n"
		);
		if let Some(id) = session {
			req.push_str(&format!("Cookie: jsui_session={id}\r\n"));
		}
		req.push_str("\r\n");
		stream.write_all(req.as_bytes()).await.unwrap();
		let head = read_head(&mut stream).await;
		(stream, head)
	}

	/// Wait until the registry knows a connection for `session_id`.
	pub async fn wait_for_connection(&self, session_id: &str) {
		eventually(|| !self.state.connections.connections_for(session_id).is_empty()).await;
	}

	pub async fn stop(mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
		if let Some(handle) = self.handle.take() {
			tokio::time::timeout(Duration::from_secs(5), handle)
				.await
				.unwrap()
				.unwrap()
				.unwrap();
		}
	}
}

pub fn request(method: &str, path: &str, session: Option<&str>, body: &str) -> String {
	let mut req = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n");
	if let Some(id) = session {
		req.push_str(&format!("Cookie: jsui_session={id}\r\n"));
	}
	if !body.is_empty() {
		req.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
		req.push_str(&format!("Content-Length: {}\r\n", body.len()));
	}
	req.push_str("\r\n");
	req.push_str(body);
	req
}

pub fn status_line(response: &str) -> &str {
	response.lines().next().unwrap_or("")
}

pub fn body(response: &str) -> &str {
	response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("")
}

async fn read_head(stream: &mut TcpStream) -> String {
	let mut head = Vec::new();
	let mut byte = [0u8; 1];
	while !head.ends_with(b"\r\n\r\n") {
		let n = stream.read(&mut byte).await.unwrap();
		assert_eq!(n, 1, "connection closed during handshake");
		head.push(byte[0]);
	}
	String::from_utf8(head).unwrap()
}

pub async fn send_text(stream: &mut TcpStream, text: &str) {
	send_frame(stream, Opcode::Text, text.as_bytes()).await;
}

pub async fn send_frame(stream: &mut TcpStream, opcode: Opcode, payload: &[u8]) {
	let frame = encode_masked_frame(opcode, payload, [0x37, 0xfa, 0x21, 0x3d]);
	stream.write_all(&frame).await.unwrap();
}

pub async fn next_frame(stream: &mut TcpStream) -> Frame {
	tokio::time::timeout(Duration::from_secs(5), read_frame(stream, 1 << 20))
		.await
		.expect("timed out waiting for frame")
		.unwrap()
		.expect("stream closed")
}

/// Next frame within `wait`, if any.
pub async fn maybe_frame(stream: &mut TcpStream, wait: Duration) -> Option<Frame> {
	match tokio::time::timeout(wait, read_frame(stream, 1 << 20)).await {
		Ok(frame) => frame.unwrap(),
		Err(_) => None,
	}
}

pub async fn eventually(mut check: impl FnMut() -> bool) {
	for _ in 0..200 {
		if check() {
			return;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	panic!("condition not reached within 2s");
}
