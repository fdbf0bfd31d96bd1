// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use prism::{ProducerConfig, Schema, ServerBuilder, TracingFormat, Type, WsConfig};
use tracing::{info, warn};

/// Prism demo server: appends batches to `data_source_one` and streams views of it
/// over WebSocket.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Address the WebSocket server binds to
	#[arg(long, env = "PRISM_BIND", default_value = "0.0.0.0:8082")]
	bind: String,

	/// WebSocket endpoint path
	#[arg(long, default_value = "/websocket")]
	path: String,

	/// Table fed by the producer. Created with schema {x: integer}
	#[arg(long, default_value = "data_source_one")]
	table: String,

	/// Milliseconds between producer batches
	#[arg(long, default_value_t = 5000)]
	interval_ms: u64,

	/// Rows per producer batch
	#[arg(long, default_value_t = 10)]
	batch_size: usize,

	/// Producer iterations; 0 keeps producing until shutdown
	#[arg(long, default_value_t = 10)]
	iterations: u64,

	#[arg(long, default_value_t = 1024)]
	max_connections: usize,

	/// Pending notifications per session before it re-snapshots its views
	#[arg(long, default_value_t = 256)]
	mailbox_capacity: usize,

	/// Log filter, overridden by RUST_LOG
	#[arg(long, env = "PRISM_LOG", default_value = "info")]
	log_level: String,

	#[arg(long, value_enum, default_value_t = LogFormat::Compact)]
	log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogFormat {
	Compact,
	Pretty,
	Json,
}

impl From<LogFormat> for TracingFormat {
	fn from(format: LogFormat) -> Self {
		match format {
			LogFormat::Compact => TracingFormat::Compact,
			LogFormat::Pretty => TracingFormat::Pretty,
			LogFormat::Json => TracingFormat::Json,
		}
	}
}

impl Args {
	fn producer(&self) -> ProducerConfig {
		let config = ProducerConfig::new(&self.table)
			.with_interval(Duration::from_millis(self.interval_ms))
			.with_batch_size(self.batch_size);

		if self.iterations == 0 {
			config.unbounded()
		} else {
			config.with_iterations(self.iterations)
		}
	}

	fn ws(&self) -> WsConfig {
		WsConfig::new()
			.bind_addr(&self.bind)
			.path(&self.path)
			.max_connections(self.max_connections)
			.mailbox_capacity(self.mailbox_capacity)
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let mut server = ServerBuilder::new()
		.with_tracing(|tracing| tracing.with_filter(&args.log_level).with_format(args.log_format.into()))
		.with_table(&args.table, Schema::new([("x", Type::Int)]))
		.with_ws(args.ws())
		.with_producer(args.producer())
		.build()
		.context("failed to build server")?;

	server.start().await.context("failed to start server")?;
	if let Some(url) = server.ws().and_then(|ws| ws.url()) {
		info!("Prism {} serving {} on {}", env!("CARGO_PKG_VERSION"), args.table, url);
	}

	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for shutdown signal: {}", e);
	}

	info!("Shutting down");
	server.stop().await.context("failed to stop server")?;
	Ok(())
}
