// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use prism_table::Schema;
use prism_type::Type;

#[derive(Debug, Clone)]
pub struct ProducerConfig {
	/// Table the producer appends to.
	pub table: String,
	/// Schema used to create the table when it is not registered yet.
	pub schema: Option<Schema>,
	/// Pause after each append.
	pub interval: Duration,
	/// Rows per appended batch.
	pub batch_size: usize,
	/// Number of batches to append; `None` runs until shutdown.
	pub iterations: Option<u64>,
}

impl Default for ProducerConfig {
	fn default() -> Self {
		Self {
			table: "data_source_one".to_string(),
			schema: Some(Schema::new([("x", Type::Int)])),
			interval: Duration::from_secs(5),
			batch_size: 10,
			iterations: Some(10),
		}
	}
}

impl ProducerConfig {
	pub fn new(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			..Self::default()
		}
	}

	pub fn with_schema(mut self, schema: Schema) -> Self {
		self.schema = Some(schema);
		self
	}

	pub fn without_schema(mut self) -> Self {
		self.schema = None;
		self
	}

	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = interval;
		self
	}

	pub fn with_batch_size(mut self, batch_size: usize) -> Self {
		self.batch_size = batch_size;
		self
	}

	pub fn with_iterations(mut self, iterations: u64) -> Self {
		self.iterations = Some(iterations);
		self
	}

	pub fn unbounded(mut self) -> Self {
		self.iterations = None;
		self
	}
}
