// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end HTTP behaviour against a server on an ephemeral port.

mod common;

use std::sync::atomic::Ordering;

use common::{body, status_line, TestServer};

#[tokio::test]
async fn test_page_load_sets_cookie_and_security_headers() {
	let server = TestServer::start().await;
	let response = server.get("/", None).await;

	assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
	assert!(response.contains("Content-Type: text/html; charset=utf-8\r\n"));
	assert!(response.contains("Content-Security-Policy: default-src 'self';"));
	assert!(response.contains("X-Frame-Options: SAMEORIGIN\r\n"));
	assert!(response.contains("X-Content-Type-Options: nosniff\r\n"));
	assert!(response.contains("Referrer-Policy: strict-origin-when-cross-origin\r\n"));
	assert!(response.contains("Set-Cookie: jsui_session="));
	assert!(response.contains("; Path=/; HttpOnly; SameSite=Lax\r\n"));

	// No socket yet, so the patch rides along as an inline script.
	let body = body(&response);
	assert!(body.starts_with("<p>home</p><script>"));
	assert!(body.contains(r#""id":"greeting""#));
	assert!(body.contains(r"<em>hello<\/em>"));

	server.stop().await;
}

#[tokio::test]
async fn test_existing_cookie_is_reused_and_generation_bumped() {
	let server = TestServer::start().await;

	let first = server.get("/", Some("abc")).await;
	assert!(!first.contains("Set-Cookie"));
	assert_eq!(server.state.sessions.current_generation("abc"), 1);

	server.get("/", Some("abc")).await;
	assert_eq!(server.state.sessions.current_generation("abc"), 2);
	assert_eq!(server.state.sessions.current_generation("other"), 0);

	server.stop().await;
}

#[tokio::test]
async fn test_action_does_not_bump_generation() {
	let server = TestServer::start().await;
	server.get("/", Some("s1")).await;

	let response = server.post("/act/go", Some("s1"), "value=42").await;
	assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
	assert!(body(&response).starts_with("ok<script>"));
	assert!(body(&response).contains(r"<b>42<\/b>"));
	assert_eq!(server.state.sessions.current_generation("s1"), 1);

	server.stop().await;
}

#[tokio::test]
async fn test_unknown_route_is_404() {
	let server = TestServer::start().await;
	let response = server.get("/missing", None).await;
	assert_eq!(status_line(&response), "HTTP/1.1 404 Not Found");
	server.stop().await;
}

#[tokio::test]
async fn test_post_outside_action_paths_is_404_without_dispatch() {
	let server = TestServer::start().await;
	let response = server.post("/submit", Some("s1"), "a=1").await;
	assert_eq!(status_line(&response), "HTTP/1.1 404 Not Found");
	assert_eq!(server.routes.invocations.load(Ordering::SeqCst), 0);
	server.stop().await;
}

#[tokio::test]
async fn test_other_methods_are_405() {
	let server = TestServer::start().await;
	let response = server.raw("DELETE / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
	assert_eq!(status_line(&response), "HTTP/1.1 405 Method Not Allowed");
	assert_eq!(server.routes.invocations.load(Ordering::SeqCst), 0);
	server.stop().await;
}

#[tokio::test]
async fn test_route_error_is_500_with_message() {
	let server = TestServer::start().await;
	let response = server.get("/fail", None).await;
	assert_eq!(status_line(&response), "HTTP/1.1 500 Internal Server Error");
	assert_eq!(body(&response), "database exploded");
	server.stop().await;
}

#[tokio::test]
async fn test_route_panic_is_500_and_server_survives() {
	let server = TestServer::start().await;
	let response = server.get("/panic", None).await;
	assert_eq!(status_line(&response), "HTTP/1.1 500 Internal Server Error");
	assert_eq!(body(&response), "kaboom");

	let response = server.get("/", None).await;
	assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
	server.stop().await;
}

#[tokio::test]
async fn test_malformed_request_line_is_400() {
	let server = TestServer::start().await;
	let response = server.raw("GARBAGE\r\n\r\n").await;
	assert_eq!(status_line(&response), "HTTP/1.1 400 Bad Request");

	let response = server.raw("\r\n").await;
	assert_eq!(status_line(&response), "HTTP/1.1 400 Bad Request");
	server.stop().await;
}

#[tokio::test]
async fn test_oversized_body_is_400_without_dispatch() {
	let server = TestServer::start().await;
	let response = server
		.raw("POST /act/go HTTP/1.1\r\nHost: localhost\r\nContent-Length: 999999999\r\n\r\nvalue=1")
		.await;
	assert_eq!(status_line(&response), "HTTP/1.1 400 Bad Request");
	assert_eq!(server.routes.invocations.load(Ordering::SeqCst), 0);

	let response = server.post("/act/go", Some("s1"), "value=1").await;
	assert_eq!(status_line(&response), "HTTP/1.1 200 OK");
	server.stop().await;
}

#[tokio::test]
async fn test_page_load_stops_previous_page_tasks() {
	let server = TestServer::start().await;
	server.get("/slow", Some("s1")).await;
	assert_eq!(server.state.sessions.target_count("s1"), 1);
	assert_eq!(server.routes.cleared.load(Ordering::SeqCst), 0);

	server.get("/", Some("s1")).await;
	assert_eq!(server.state.sessions.target_count("s1"), 0);
	assert_eq!(server.routes.cleared.load(Ordering::SeqCst), 1);

	server.stop().await;
}

#[tokio::test]
async fn test_patch_cleanup_runs_on_next_page_load() {
	let server = TestServer::start().await;
	let response = server
		.raw("GET /chart HTTP/1.1\r\nHost: localhost\r\nUser-Agent: TestAgent/1.0\r\nCookie: jsui_session=s1\r\n\r\n")
		.await;
	assert!(body(&response).contains(r"<i>TestAgent/1.0<\/i>"));
	assert_eq!(server.state.sessions.target_count("s1"), 1);

	server.get("/", Some("s1")).await;
	assert_eq!(server.state.sessions.target_count("s1"), 0);
	assert_eq!(server.routes.cleared.load(Ordering::SeqCst), 1);
	server.stop().await;
}
