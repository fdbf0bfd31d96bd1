// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Versioned, append-only, in-memory columnar tables.
//!
//! A [`Table`] has a fixed [`Schema`] and a version counter that advances by exactly one
//! per applied [`RowBatch`]. All appends against a table pass through its update feed, a
//! FIFO critical section, so every observer sees one total order of versions. Listeners
//! registered with [`Table::subscribe`] are notified once per applied batch, in version
//! order, while the feed is still held.

mod batch;
mod feed;
mod listener;
mod registry;
mod schema;
mod table;

pub use batch::{Columns, RowBatch};
pub use listener::{ListenerId, TableChange, TableListener};
pub use prism_type::Result;
pub use registry::TableRegistry;
pub use schema::{Schema, SchemaColumn};
pub use table::{Table, TableSnapshot};
