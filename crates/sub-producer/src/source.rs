// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::{DateTime, Days, NaiveDate};
use prism_table::{RowBatch, Schema};
use prism_type::{
	ColumnData, Result, Type, Value, error::diagnostic::table::malformed_batch, return_error,
};

/// Supplies the batch appended on each producer iteration.
pub trait BatchSource: Send + Sync + 'static {
	/// Checks the source against the target schema before the first iteration.
	fn prepare(&mut self, _schema: &Schema) -> Result<()> {
		Ok(())
	}

	fn next_batch(&mut self, iteration: u64, schema: &Schema) -> Result<RowBatch>;
}

/// Appends consecutive integers: iteration `i` carries `[i * size, (i + 1) * size)`.
///
/// The first integer column receives the sequence; every other column gets a value
/// derived from the same number.
#[derive(Debug, Clone)]
pub struct SequenceSource {
	batch_size: usize,
}

impl SequenceSource {
	pub fn new(batch_size: usize) -> Self {
		Self {
			batch_size,
		}
	}
}

impl BatchSource for SequenceSource {
	fn prepare(&mut self, schema: &Schema) -> Result<()> {
		if !schema.columns().iter().any(|c| c.r#type == Type::Int) {
			return_error!(malformed_batch("sequence producer needs an integer column"));
		}
		Ok(())
	}

	fn next_batch(&mut self, iteration: u64, schema: &Schema) -> Result<RowBatch> {
		let size = self.batch_size as i64;
		let start = iteration as i64 * size;

		let mut batch = RowBatch::new();
		for column in schema.columns() {
			let mut data = ColumnData::with_capacity(column.r#type, self.batch_size);
			for n in start..start + size {
				data.push_value(derive(column.r#type, n))?;
			}
			batch.push_column(column.name.clone(), data);
		}
		Ok(batch)
	}
}

fn derive(ty: Type, n: i64) -> Value {
	match ty {
		Type::Int => Value::Int(n),
		Type::Float => Value::Float(n as f64),
		Type::Utf8 => Value::Utf8(n.to_string()),
		Type::Boolean => Value::Boolean(n % 2 == 0),
		Type::DateTime => Value::DateTime(DateTime::from_timestamp_millis(n * 1000).unwrap_or_default()),
		Type::Date => Value::Date(
			NaiveDate::default().checked_add_days(Days::new(n.unsigned_abs())).unwrap_or_default(),
		),
	}
}
