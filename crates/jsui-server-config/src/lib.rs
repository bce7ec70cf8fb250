// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the jsui server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Consistent environment variable naming (`JSUI_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use jsui_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub websocket: WebSocketConfig,
	pub session: SessionConfig,
	pub security: SecurityConfig,
	pub shutdown: ShutdownConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`JSUI_SERVER_*`)
/// 2. Config file (`/etc/jsui/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from(sources)
}

fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let websocket = layer.websocket.unwrap_or_default().finalize();
	let session = layer.session.unwrap_or_default().finalize();
	let security = layer.security.unwrap_or_default().finalize();
	let shutdown = layer.shutdown.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	if http.host.trim().is_empty() {
		return Err(ConfigError::Validation("http.host must not be empty".to_string()));
	}

	info!(
		host = %http.host,
		port = http.port,
		backlog = http.backlog,
		max_body_bytes = http.max_body_bytes,
		ws_send_queue_frames = websocket.send_queue_frames,
		session_idle_ttl_secs = session.idle_ttl_secs,
		session_sweep_interval_secs = session.sweep_interval_secs,
		custom_csp = security.content_security_policy.is_some(),
		shutdown_grace_secs = shutdown.grace_secs,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		websocket,
		session,
		security,
		shutdown,
		logging,
	})
}
