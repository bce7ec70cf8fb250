// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	HttpConfigLayer, LoggingConfigLayer, SecurityConfigLayer, SessionConfigLayer,
	ShutdownConfigLayer, WebSocketConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/jsui/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: JSUI_SERVER_<FIELD>, or JSUI_SERVER_<SECTION>_<FIELD> where ambiguous.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: env_var("JSUI_SERVER_HOST"),
				port: env_parse("JSUI_SERVER_PORT")?,
				backlog: env_parse("JSUI_SERVER_BACKLOG")?,
				max_header_bytes: env_parse("JSUI_SERVER_MAX_HEADER_BYTES")?,
				max_body_bytes: env_parse("JSUI_SERVER_MAX_BODY_BYTES")?,
			}),
			websocket: Some(WebSocketConfigLayer {
				max_frame_bytes: env_parse("JSUI_SERVER_WS_MAX_FRAME_BYTES")?,
				send_queue_frames: env_parse("JSUI_SERVER_WS_SEND_QUEUE_FRAMES")?,
			}),
			session: Some(SessionConfigLayer {
				idle_ttl_secs: env_parse("JSUI_SERVER_SESSION_IDLE_TTL_SECS")?,
				sweep_interval_secs: env_parse("JSUI_SERVER_SESSION_SWEEP_INTERVAL_SECS")?,
			}),
			security: Some(SecurityConfigLayer {
				content_security_policy: env_var("JSUI_SERVER_CSP"),
			}),
			shutdown: Some(ShutdownConfigLayer {
				grace_secs: env_parse("JSUI_SERVER_SHUTDOWN_GRACE_SECS")?,
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var("JSUI_SERVER_LOG_LEVEL"),
			}),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!(
				"invalid {} value '{v}'",
				std::any::type_name::<T>()
			),
		}),
		None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.session.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let layer = TomlSource::new("/nonexistent/jsui.toml").load().unwrap();
		assert_eq!(layer, ServerConfigLayer::default());
	}

	#[test]
	fn test_toml_source_reads_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[http]
host = "127.0.0.1"
port = 9000

[session]
idle_ttl_secs = 120

[security]
content_security_policy = "default-src 'none'"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let http = layer.http.unwrap();
		assert_eq!(http.host.as_deref(), Some("127.0.0.1"));
		assert_eq!(http.port, Some(9000));
		assert_eq!(layer.session.unwrap().idle_ttl_secs, Some(120));
		assert_eq!(
			layer.security.unwrap().content_security_policy.as_deref(),
			Some("default-src 'none'")
		);
		assert!(layer.logging.is_none());
	}

	#[test]
	fn test_toml_source_parse_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http]\nport = \"not a number\"").unwrap();
		let result = TomlSource::new(file.path()).load();
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	#[test]
	fn test_env_parse() {
		std::env::set_var("JSUI_TEST_ENV_PARSE_OK", " 42 ");
		std::env::set_var("JSUI_TEST_ENV_PARSE_BAD", "forty-two");
		assert_eq!(env_parse::<u16>("JSUI_TEST_ENV_PARSE_OK").unwrap(), Some(42));
		assert_eq!(env_parse::<u16>("JSUI_TEST_ENV_PARSE_MISSING").unwrap(), None);
		let err = env_parse::<u16>("JSUI_TEST_ENV_PARSE_BAD").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "JSUI_TEST_ENV_PARSE_BAD"));
		std::env::remove_var("JSUI_TEST_ENV_PARSE_OK");
		std::env::remove_var("JSUI_TEST_ENV_PARSE_BAD");
	}
}
