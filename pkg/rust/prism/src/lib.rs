// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Prism: versioned, append-only tables whose views are streamed to WebSocket clients.
//!
//! ```ignore
//! let mut server = ServerBuilder::new()
//!     .with_table("data_source_one", Schema::new([("x", Type::Int)]))
//!     .with_producer(ProducerConfig::default())
//!     .with_ws(WsConfig::default())
//!     .build()?;
//!
//! server.start().await?;
//! // ...
//! server.stop().await?;
//! ```

mod builder;
mod server;
mod subsystems;

pub use builder::ServerBuilder;
pub use prism_sub_api::{HealthStatus, Subsystem};
pub use prism_sub_producer::{BatchSource, ProducerConfig, ProducerSubsystem, SequenceSource};
pub use prism_sub_server_ws::{WsConfig, WsSubsystem};
pub use prism_sub_tracing::{TracingBuilder, TracingFormat, TracingSubsystem};
pub use prism_table::{RowBatch, Schema, Table, TableChange, TableListener, TableRegistry};
pub use prism_type::{ColumnData, Error, ErrorKind, Result, TableVersion, Type, Value};
pub use prism_view::{
	Aggregate, Delta, FilterOperator, Frame, Replica, StandardViewEngine, View, ViewConfig, ViewEngine, ViewId,
};
pub use server::{Server, ServerConfig};

pub mod table {
	pub use prism_table::*;
}

pub mod view {
	pub use prism_view::*;
}

pub mod ws {
	pub use prism_sub_server_ws::*;
}
