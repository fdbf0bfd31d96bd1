// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

/// Configuration for the WebSocket server subsystem.
#[derive(Debug, Clone)]
pub struct WsConfig {
	/// Address to bind to, e.g. "0.0.0.0:8082". Port 0 picks an ephemeral port.
	pub bind_addr: String,
	/// Request path accepted during the handshake.
	pub path: String,
	/// Connections beyond this limit are dropped right after accept.
	pub max_connections: usize,
	/// Pending table notifications per session before they collapse into a resync.
	pub mailbox_capacity: usize,
	/// How long shutdown waits for connections to drain.
	pub shutdown_timeout: Duration,
}

impl Default for WsConfig {
	fn default() -> Self {
		Self {
			bind_addr: "0.0.0.0:8082".to_string(),
			path: "/websocket".to_string(),
			max_connections: 1024,
			mailbox_capacity: 256,
			shutdown_timeout: Duration::from_secs(30),
		}
	}
}

impl WsConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
		self.bind_addr = addr.into();
		self
	}

	pub fn path(mut self, path: impl Into<String>) -> Self {
		let path = path.into();
		self.path = if path.starts_with('/') {
			path
		} else {
			format!("/{}", path)
		};
		self
	}

	pub fn max_connections(mut self, max: usize) -> Self {
		self.max_connections = max.max(1);
		self
	}

	pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
		self.mailbox_capacity = capacity.max(1);
		self
	}

	pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
		self.shutdown_timeout = timeout;
		self
	}
}
