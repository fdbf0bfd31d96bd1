// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	fmt::{self, Display, Formatter},
};

use async_trait::async_trait;

/// A long-running part of the server with an explicit start and shutdown.
#[async_trait]
pub trait Subsystem: Send + Sync + Any {
	fn name(&self) -> &'static str;

	/// Starts the subsystem. Starting a running subsystem succeeds without effect.
	async fn start(&mut self) -> prism_type::Result<()>;

	/// Stops the subsystem and waits for its work to drain. Idempotent.
	async fn shutdown(&mut self) -> prism_type::Result<()>;

	fn is_running(&self) -> bool;

	fn health_status(&self) -> HealthStatus;

	fn as_any(&self) -> &dyn Any;

	fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
	Healthy,
	Warning {
		description: String,
	},
	Degraded {
		description: String,
	},
	Failed {
		description: String,
	},
	Unknown,
}

impl HealthStatus {
	pub fn is_healthy(&self) -> bool {
		matches!(self, HealthStatus::Healthy)
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, HealthStatus::Failed { .. })
	}
}

impl Display for HealthStatus {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			HealthStatus::Healthy => f.write_str("healthy"),
			HealthStatus::Warning {
				description,
			} => write!(f, "warning: {}", description),
			HealthStatus::Degraded {
				description,
			} => write!(f, "degraded: {}", description),
			HealthStatus::Failed {
				description,
			} => write!(f, "failed: {}", description),
			HealthStatus::Unknown => f.write_str("unknown"),
		}
	}
}
