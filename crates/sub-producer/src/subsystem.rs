// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	sync::{Arc, atomic::Ordering},
};

use async_trait::async_trait;
use prism_sub_api::{HealthStatus, Subsystem};
use prism_table::TableRegistry;
use prism_type::{ErrorKind, error::diagnostic::internal::internal, return_error};
use tracing::debug;

use crate::{
	BatchSource, ProducerConfig, SequenceSource,
	worker::{ProducerStats, ProducerWorker},
};

/// Runs a [`BatchSource`] against one table on a dedicated thread.
///
/// When the configured iterations are exhausted the thread ends; the table stays
/// registered and keeps serving sessions.
pub struct ProducerSubsystem {
	registry: TableRegistry,
	config: ProducerConfig,
	source: Option<Box<dyn BatchSource>>,
	worker: Option<ProducerWorker>,
	stats: Arc<ProducerStats>,
}

impl ProducerSubsystem {
	/// A producer appending [`SequenceSource`] batches.
	pub fn new(registry: TableRegistry, config: ProducerConfig) -> Self {
		let source = SequenceSource::new(config.batch_size);
		Self::with_source(registry, config, source)
	}

	pub fn with_source(registry: TableRegistry, config: ProducerConfig, source: impl BatchSource) -> Self {
		Self {
			registry,
			config,
			source: Some(Box::new(source)),
			worker: None,
			stats: Arc::new(ProducerStats::default()),
		}
	}

	pub fn config(&self) -> &ProducerConfig {
		&self.config
	}

	/// Batches appended so far.
	pub fn appended(&self) -> u64 {
		self.stats.appended.load(Ordering::SeqCst)
	}

	/// Batches the table rejected.
	pub fn failed(&self) -> u64 {
		self.stats.failed.load(Ordering::SeqCst)
	}

	/// Whether the producer ran all configured iterations.
	pub fn is_finished(&self) -> bool {
		self.worker.is_some() && !self.stats.running.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl Subsystem for ProducerSubsystem {
	fn name(&self) -> &'static str {
		"Producer"
	}

	async fn start(&mut self) -> prism_type::Result<()> {
		if self.worker.is_some() {
			return Ok(());
		}

		let table = match (self.registry.get(&self.config.table), &self.config.schema) {
			(Ok(table), _) => table,
			(Err(e), Some(schema)) if e.kind() == ErrorKind::TableNotFound => {
				self.registry.create(&self.config.table, schema.clone())?
			}
			(Err(e), _) => return Err(e),
		};

		let Some(mut source) = self.source.take() else {
			return_error!(internal("producer source already consumed"));
		};
		if let Err(e) = source.prepare(table.schema()) {
			self.source = Some(source);
			return Err(e);
		}

		debug!(
			"Starting producer for {} every {:?} ({} iterations)",
			self.config.table,
			self.config.interval,
			self.config.iterations.map(|n| n.to_string()).unwrap_or_else(|| "unbounded".to_string())
		);

		self.worker = Some(ProducerWorker::spawn(
			table,
			source,
			self.config.interval,
			self.config.iterations,
			self.stats.clone(),
		)?);
		Ok(())
	}

	async fn shutdown(&mut self) -> prism_type::Result<()> {
		if let Some(worker) = self.worker.as_mut() {
			worker.stop();
		}
		Ok(())
	}

	fn is_running(&self) -> bool {
		self.stats.running.load(Ordering::SeqCst)
	}

	fn health_status(&self) -> HealthStatus {
		let failed = self.failed();
		if self.is_running() && failed == 0 {
			HealthStatus::Healthy
		} else if self.is_running() {
			HealthStatus::Degraded {
				description: format!("{} batches rejected", failed),
			}
		} else if self.is_finished() {
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
