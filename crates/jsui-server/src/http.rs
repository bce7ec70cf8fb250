// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Plain HTTP requests: page loads and action calls.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use jsui_common_http::{
	read_request_body, write_response, Method, RequestHead, Response, SESSION_COOKIE,
};
use jsui_server_jobs::TaskScope;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::ServerError;
use crate::state::AppState;

pub(crate) async fn serve_http<R, W>(
	state: &Arc<AppState>,
	head: RequestHead,
	reader: &mut R,
	writer: &mut W,
) -> Result<(), ServerError>
where
	R: AsyncBufRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let body = match read_request_body(reader, &head, state.config.http.max_body_bytes).await {
		Ok(body) => body,
		Err(err) if err.is_bad_request() => {
			debug!(path = %head.path, error = %err, "Rejecting request body");
			write_response(writer, &Response::bad_request(), &state.security).await?;
			return Ok(());
		}
		Err(err) => return Err(err.into()),
	};
	let response = respond(state, &head, body).await;
	debug!(
		method = %head.method,
		path = %head.path,
		status = response.status.as_u16(),
		"HTTP request served"
	);
	write_response(writer, &response, &state.security).await?;
	Ok(())
}

/// `POST` is only routed for action endpoints.
fn is_action_path(path: &str) -> bool {
	path.starts_with("/act/") || path.starts_with("/call/")
}

async fn respond(state: &Arc<AppState>, head: &RequestHead, body: Vec<u8>) -> Response {
	let page_load = match &head.method {
		Method::Get => true,
		Method::Post if is_action_path(&head.path) => false,
		Method::Post => return Response::not_found(),
		Method::Other(_) => return Response::method_not_allowed(),
	};

	let (session_id, minted) = match head.cookie(SESSION_COOKIE).filter(|id| !id.is_empty()) {
		Some(id) => (id, false),
		None => (Uuid::new_v4().to_string(), true),
	};

	state.sessions.touch(&session_id);
	let generation = if page_load {
		let cleared = state.sessions.clear_all_targets(&session_id);
		if cleared > 0 {
			debug!(session_id = %session_id, cleared, "Stopped tasks of previous page");
		}
		state.sessions.bump_generation(&session_id)
	} else {
		state.sessions.current_generation(&session_id)
	};

	let ctx = RequestContext::new(
		Arc::clone(state),
		TaskScope::new(session_id.clone(), generation),
		head,
		body,
	);

	let outcome = AssertUnwindSafe(state.routes.invoke(&head.path, &ctx))
		.catch_unwind()
		.await;

	let response = match outcome {
		Ok(Ok(Some(mut html))) => {
			html.push_str(&ctx.take_appended());
			Response::html(html)
		}
		Ok(Ok(None)) => Response::not_found(),
		Ok(Err(err)) => {
			warn!(path = %head.path, error = %err, "Route failed");
			Response::internal_error(&err.to_string())
		}
		Err(panic) => {
			let message = panic_message(&*panic);
			error!(path = %head.path, panic = %message, "Route panicked");
			Response::internal_error(&message)
		}
	};

	if minted {
		response.with_session_cookie(&session_id)
	} else {
		response
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
