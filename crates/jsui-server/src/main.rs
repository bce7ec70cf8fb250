// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! jsui server binary with a small demo application.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jsui_server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod demo;
mod version;

/// jsui server - pushes HTML patches to browser pages over WebSocket.
#[derive(Parser, Debug)]
#[command(name = "jsui-server", about = "jsui patch server", version)]
struct Args {
	/// TOML config file (defaults to /etc/jsui/server.toml)
	#[arg(long, env = "JSUI_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => jsui_server_config::load_config_with_file(path)?,
		None => jsui_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		"starting jsui-server"
	);

	let server = Server::bind(config, Arc::new(demo::DemoRoutes)).await?;
	server
		.run(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				tracing::error!(error = %e, "Failed to listen for shutdown signal");
				std::future::pending::<()>().await;
			}
			tracing::info!("Received shutdown signal");
		})
		.await?;

	tracing::info!("Server shutdown complete");
	Ok(())
}
