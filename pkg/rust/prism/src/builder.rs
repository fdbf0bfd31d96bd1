// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use prism_sub_api::Subsystem;
use prism_sub_producer::{BatchSource, ProducerConfig, ProducerSubsystem};
use prism_sub_server_ws::{WsConfig, WsSubsystem};
use prism_sub_tracing::TracingBuilder;
use prism_table::{Schema, TableRegistry};
use prism_type::Result;
use prism_view::{StandardViewEngine, ViewEngine};

use crate::{Server, ServerConfig, subsystems::Subsystems};

/// Assembles a [`Server`].
///
/// Subsystems start in this order: tracing, WebSocket server, custom subsystems, then
/// producers, so sessions can attach before the first batch lands.
pub struct ServerBuilder {
	config: ServerConfig,
	tables: TableRegistry,
	schemas: Vec<(String, Schema)>,
	engine: Arc<dyn ViewEngine>,
	tracing: Option<TracingBuilder>,
	ws: Option<WsConfig>,
	subsystems: Vec<Box<dyn Subsystem>>,
	producers: Vec<Box<dyn FnOnce(TableRegistry) -> ProducerSubsystem>>,
}

impl Default for ServerBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ServerBuilder {
	pub fn new() -> Self {
		Self {
			config: ServerConfig::default(),
			tables: TableRegistry::new(),
			schemas: Vec::new(),
			engine: Arc::new(StandardViewEngine),
			tracing: None,
			ws: None,
			subsystems: Vec::new(),
			producers: Vec::new(),
		}
	}

	pub fn with_config(mut self, config: ServerConfig) -> Self {
		self.config = config;
		self
	}

	/// Serves an existing registry instead of a fresh one.
	pub fn with_registry(mut self, tables: TableRegistry) -> Self {
		self.tables = tables;
		self
	}

	/// Registers a table when the server is built.
	pub fn with_table(mut self, name: impl Into<String>, schema: Schema) -> Self {
		self.schemas.push((name.into(), schema));
		self
	}

	pub fn with_engine(mut self, engine: impl ViewEngine + 'static) -> Self {
		self.engine = Arc::new(engine);
		self
	}

	pub fn with_tracing<F>(mut self, configurator: F) -> Self
	where
		F: FnOnce(TracingBuilder) -> TracingBuilder,
	{
		self.tracing = Some(configurator(TracingBuilder::new()));
		self
	}

	pub fn with_ws(mut self, config: WsConfig) -> Self {
		self.ws = Some(config);
		self
	}

	/// Adds a producer appending [`SequenceSource`](prism_sub_producer::SequenceSource) batches.
	pub fn with_producer(mut self, config: ProducerConfig) -> Self {
		self.producers.push(Box::new(move |tables| ProducerSubsystem::new(tables, config)));
		self
	}

	pub fn with_producer_source(mut self, config: ProducerConfig, source: impl BatchSource) -> Self {
		self.producers.push(Box::new(move |tables| ProducerSubsystem::with_source(tables, config, source)));
		self
	}

	pub fn with_subsystem(mut self, subsystem: Box<dyn Subsystem>) -> Self {
		self.subsystems.push(subsystem);
		self
	}

	/// Creates the configured tables and wires the subsystems.
	///
	/// Fails when a table name is taken or a schema is invalid.
	pub fn build(self) -> Result<Server> {
		for (name, schema) in self.schemas {
			self.tables.create(&name, schema)?;
		}

		let mut subsystems = Subsystems::new();
		if let Some(tracing) = self.tracing {
			subsystems.add(Box::new(tracing.build()));
		}
		if let Some(config) = self.ws {
			subsystems.add(Box::new(WsSubsystem::new(config, self.tables.clone(), self.engine.clone())));
		}
		for subsystem in self.subsystems {
			subsystems.add(subsystem);
		}
		for producer in self.producers {
			subsystems.add(Box::new(producer(self.tables.clone())));
		}

		Ok(Server::new(self.config, self.tables, subsystems))
	}
}
