// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::any::Any;

use async_trait::async_trait;
use prism_sub_api::{HealthStatus, Subsystem};
use tracing_subscriber::EnvFilter;

use crate::{TracingBuilder, TracingFormat};

/// Installs the global tracing subscriber on start.
///
/// A process has one global subscriber. When another one is already installed, for
/// example by a second server in the same test binary, the existing one stays.
pub struct TracingSubsystem {
	config: TracingBuilder,
	running: bool,
	installed: bool,
}

impl TracingSubsystem {
	pub fn new(config: TracingBuilder) -> Self {
		Self {
			config,
			running: false,
			installed: false,
		}
	}

	/// Whether this subsystem installed the global subscriber.
	pub fn installed(&self) -> bool {
		self.installed
	}

	fn install(&self) -> bool {
		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.config.filter));
		let builder = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_target(self.config.with_target)
			.with_thread_names(self.config.with_thread_names);

		let result = match self.config.format {
			TracingFormat::Compact => builder.compact().try_init(),
			TracingFormat::Pretty => builder.pretty().try_init(),
			TracingFormat::Json => builder.json().try_init(),
		};
		result.is_ok()
	}
}

#[async_trait]
impl Subsystem for TracingSubsystem {
	fn name(&self) -> &'static str {
		"Tracing"
	}

	async fn start(&mut self) -> prism_type::Result<()> {
		if self.running {
			return Ok(());
		}

		self.installed = self.install();
		self.running = true;
		if self.installed {
			tracing::debug!("Tracing subscriber installed with filter '{}'", self.config.filter);
		}
		Ok(())
	}

	async fn shutdown(&mut self) -> prism_type::Result<()> {
		self.running = false;
		Ok(())
	}

	fn is_running(&self) -> bool {
		self.running
	}

	fn health_status(&self) -> HealthStatus {
		if self.running {
			HealthStatus::Healthy
		} else {
			HealthStatus::Failed {
				description: "Not running".to_string(),
			}
		}
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}
