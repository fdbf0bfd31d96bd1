// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use prism_sub_api::HealthStatus;
use prism_sub_producer::ProducerSubsystem;
use prism_sub_server_ws::WsSubsystem;
use prism_table::TableRegistry;
use prism_type::{Result, error, error::diagnostic::internal::internal};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::subsystems::Subsystems;

#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub startup_timeout: Duration,
	pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			startup_timeout: Duration::from_secs(30),
			shutdown_timeout: Duration::from_secs(30),
		}
	}
}

impl ServerConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
		self.startup_timeout = timeout;
		self
	}

	pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
		self.shutdown_timeout = timeout;
		self
	}
}

/// A table registry plus the subsystems serving it.
pub struct Server {
	config: ServerConfig,
	tables: TableRegistry,
	subsystems: Subsystems,
	running: bool,
}

impl Server {
	pub(crate) fn new(config: ServerConfig, tables: TableRegistry, subsystems: Subsystems) -> Self {
		Self {
			config,
			tables,
			subsystems,
			running: false,
		}
	}

	pub fn config(&self) -> &ServerConfig {
		&self.config
	}

	pub fn tables(&self) -> &TableRegistry {
		&self.tables
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub async fn start(&mut self) -> Result<()> {
		if self.running {
			return Ok(());
		}

		match timeout(self.config.startup_timeout, self.subsystems.start_all()).await {
			Ok(result) => result?,
			Err(_) => {
				self.subsystems.stop_all().await?;
				return Err(error!(internal(format!(
					"subsystems did not start within {:?}",
					self.config.startup_timeout
				))));
			}
		}

		self.running = true;
		info!("Prism server started with {} subsystems", self.subsystems.len());
		Ok(())
	}

	pub async fn stop(&mut self) -> Result<()> {
		if !self.running {
			return Ok(());
		}
		self.running = false;

		match timeout(self.config.shutdown_timeout, self.subsystems.stop_all()).await {
			Ok(result) => result?,
			Err(_) => warn!("Subsystems did not stop within {:?}", self.config.shutdown_timeout),
		}

		info!("Prism server stopped");
		Ok(())
	}

	/// Starts the server, waits for `signal`, then stops it.
	pub async fn run_until<F>(&mut self, signal: F) -> Result<()>
	where
		F: Future<Output = ()>,
	{
		self.start().await?;
		signal.await;
		self.stop().await
	}

	pub fn subsystem<T: 'static>(&self) -> Option<&T> {
		self.subsystems.get::<T>()
	}

	pub fn ws(&self) -> Option<&WsSubsystem> {
		self.subsystem::<WsSubsystem>()
	}

	pub fn producers(&self) -> impl Iterator<Item = &ProducerSubsystem> {
		self.subsystems.all::<ProducerSubsystem>()
	}

	pub fn subsystem_names(&self) -> Vec<&'static str> {
		self.subsystems.names()
	}

	pub fn health(&self) -> Vec<(&'static str, HealthStatus)> {
		self.subsystems.health()
	}
}
