// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use prism_type::{
	ColumnData, Result, Value,
	error::diagnostic::table::{
		column_length_mismatch, column_type_mismatch, malformed_batch, missing_column, unknown_column,
	},
	return_error,
};

use crate::Schema;

/// A set of named, typed columns appended to a table as one atomic unit.
///
/// Columns may be supplied in any order; [`RowBatch::align`] reorders them to
/// the table's schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBatch {
	columns: Vec<(String, ColumnData)>,
}

impl RowBatch {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_column(mut self, name: impl Into<String>, data: impl Into<ColumnData>) -> Self {
		self.push_column(name, data);
		self
	}

	pub fn push_column(&mut self, name: impl Into<String>, data: impl Into<ColumnData>) {
		self.columns.push((name.into(), data.into()));
	}

	pub fn columns(&self) -> &[(String, ColumnData)] {
		&self.columns
	}

	/// Row count of the first column, or zero for a batch without columns.
	pub fn row_count(&self) -> usize {
		self.columns.first().map(|(_, data)| data.len()).unwrap_or(0)
	}

	/// Decodes a batch from JSON against `schema`.
	///
	/// Accepts the column-oriented form `{"x": [1, 2]}` and the row-oriented
	/// form `[{"x": 1}, {"x": 2}]`.
	pub fn from_json(schema: &Schema, table: &str, json: &serde_json::Value) -> Result<Self> {
		match json {
			serde_json::Value::Object(object) => {
				let mut batch = RowBatch::new();
				for (name, values) in object {
					let Some(ty) = schema.get_type(name) else {
						return_error!(unknown_column(table, name));
					};
					batch.push_column(name.clone(), ColumnData::from_json(name, ty, values)?);
				}
				Ok(batch)
			}
			serde_json::Value::Array(rows) => {
				let mut data: Vec<ColumnData> =
					schema.columns().iter().map(|c| ColumnData::with_capacity(c.r#type, rows.len())).collect();

				for row in rows {
					let Some(row) = row.as_object() else {
						return_error!(malformed_batch("row-oriented data must be an array of objects"));
					};
					if let Some(name) = row.keys().find(|k| schema.get_type(k).is_none()) {
						return_error!(unknown_column(table, name));
					}
					for (column, out) in schema.columns().iter().zip(data.iter_mut()) {
						let Some(value) = row.get(&column.name) else {
							return_error!(missing_column(table, &column.name));
						};
						out.push_value(Value::from_json(&column.name, column.r#type, value)?)?;
					}
				}

				Ok(RowBatch {
					columns: schema.names().map(str::to_string).zip(data).collect(),
				})
			}
			_ => return_error!(malformed_batch("update data must be an object of columns or an array of rows")),
		}
	}

	/// Validates the batch against `schema` and returns its columns in schema order.
	pub fn align(self, table: &str, schema: &Schema) -> Result<Columns> {
		let mut slots: Vec<Option<ColumnData>> = vec![None; schema.len()];

		for (name, data) in self.columns {
			let Some(idx) = schema.column_index(&name) else {
				return_error!(unknown_column(table, &name));
			};
			if slots[idx].is_some() {
				return_error!(malformed_batch(format!("column '{}' supplied more than once", name)));
			}
			slots[idx] = Some(data);
		}

		let mut data = Vec::with_capacity(schema.len());
		let mut row_count = None;

		for (column, slot) in schema.columns().iter().zip(slots) {
			let Some(column_data) = slot else {
				return_error!(missing_column(table, &column.name));
			};

			let actual = column_data.get_type();
			if actual != column.r#type {
				return_error!(column_type_mismatch(table, &column.name, column.r#type, actual));
			}

			match row_count {
				None => row_count = Some(column_data.len()),
				Some(expected) if expected != column_data.len() => {
					return_error!(column_length_mismatch(table, &column.name, expected, column_data.len()));
				}
				Some(_) => {}
			}

			data.push(column_data);
		}

		Ok(Columns {
			data,
			row_count: row_count.unwrap_or(0),
		})
	}
}

/// Columns of an accepted batch, aligned to schema order and of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
	pub data: Vec<ColumnData>,
	pub row_count: usize,
}

impl Columns {
	pub fn row_count(&self) -> usize {
		self.row_count
	}

	pub fn get(&self, idx: usize) -> Option<&ColumnData> {
		self.data.get(idx)
	}
}
