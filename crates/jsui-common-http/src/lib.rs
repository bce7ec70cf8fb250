// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Minimal HTTP/1.1 plumbing for the jsui server.
//!
//! This crate provides:
//! - A request-head parser (request line + lower-cased headers) over any `AsyncBufRead`
//! - Bounded body reads that stop at `Content-Length` or EOF, whichever comes first
//! - A response writer that always emits `Connection: close` and the security headers
//! - Cookie and query-string helpers used for session affinity

pub mod error;
pub mod request;
pub mod response;
pub mod security;
pub mod util;

pub use error::{HttpError, Result};
pub use request::{read_body, read_request_body, read_request_head, Headers, Method, RequestHead};
pub use response::{write_response, Response};
pub use security::{SecurityHeaders, DEFAULT_CONTENT_SECURITY_POLICY};
pub use util::{parse_cookie, parse_query};

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "jsui_session";

/// Default cap on the size of a request line plus headers.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;
