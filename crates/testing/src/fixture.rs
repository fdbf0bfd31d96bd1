// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Tables and batches shaped like the demo feed: a single `x: integer` column.

use std::ops::Range;

use prism_table::{RowBatch, Schema, Table, TableRegistry};
use prism_type::{ColumnData, Type};
use prism_view::Frame;

pub fn int_schema() -> Schema {
	Schema::new([("x", Type::Int)])
}

/// Registers an `x: integer` table named `name`.
pub fn int_table(registry: &TableRegistry, name: &str) -> Table {
	registry.create(name, int_schema()).expect("failed to create table")
}

pub fn int_batch(range: Range<i64>) -> RowBatch {
	RowBatch::new().with_column("x", range.collect::<Vec<_>>())
}

/// Values of the integer column `name` in `frame`.
pub fn int_values(frame: &Frame, name: &str) -> Vec<i64> {
	match frame.column(name) {
		Some(ColumnData::Int(values)) => values.clone(),
		other => panic!("expected integer column '{}', got {:?}", name, other),
	}
}
