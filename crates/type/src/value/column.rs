// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
	error::diagnostic::{internal::internal, table::malformed_batch},
	return_error,
	value::{Type, Value},
};

/// Typed, contiguous storage for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values")]
pub enum ColumnData {
	#[serde(rename = "integer")]
	Int(Vec<i64>),
	#[serde(rename = "float")]
	Float(Vec<f64>),
	#[serde(rename = "string")]
	Utf8(Vec<String>),
	#[serde(rename = "boolean")]
	Boolean(Vec<bool>),
	#[serde(rename = "datetime")]
	DateTime(Vec<DateTime<Utc>>),
	#[serde(rename = "date")]
	Date(Vec<NaiveDate>),
}

impl ColumnData {
	pub fn with_capacity(ty: Type, capacity: usize) -> Self {
		match ty {
			Type::Int => ColumnData::Int(Vec::with_capacity(capacity)),
			Type::Float => ColumnData::Float(Vec::with_capacity(capacity)),
			Type::Utf8 => ColumnData::Utf8(Vec::with_capacity(capacity)),
			Type::Boolean => ColumnData::Boolean(Vec::with_capacity(capacity)),
			Type::DateTime => ColumnData::DateTime(Vec::with_capacity(capacity)),
			Type::Date => ColumnData::Date(Vec::with_capacity(capacity)),
		}
	}

	pub fn get_type(&self) -> Type {
		match self {
			ColumnData::Int(_) => Type::Int,
			ColumnData::Float(_) => Type::Float,
			ColumnData::Utf8(_) => Type::Utf8,
			ColumnData::Boolean(_) => Type::Boolean,
			ColumnData::DateTime(_) => Type::DateTime,
			ColumnData::Date(_) => Type::Date,
		}
	}

	pub fn len(&self) -> usize {
		match self {
			ColumnData::Int(v) => v.len(),
			ColumnData::Float(v) => v.len(),
			ColumnData::Utf8(v) => v.len(),
			ColumnData::Boolean(v) => v.len(),
			ColumnData::DateTime(v) => v.len(),
			ColumnData::Date(v) => v.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the value at `idx`. Panics when out of bounds, like slice indexing.
	pub fn get_value(&self, idx: usize) -> Value {
		match self {
			ColumnData::Int(v) => Value::Int(v[idx]),
			ColumnData::Float(v) => Value::Float(v[idx]),
			ColumnData::Utf8(v) => Value::Utf8(v[idx].clone()),
			ColumnData::Boolean(v) => Value::Boolean(v[idx]),
			ColumnData::DateTime(v) => Value::DateTime(v[idx]),
			ColumnData::Date(v) => Value::Date(v[idx]),
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
		(0..self.len()).map(|idx| self.get_value(idx))
	}

	pub fn push_value(&mut self, value: Value) -> crate::Result<()> {
		match (self, value) {
			(ColumnData::Int(v), Value::Int(x)) => v.push(x),
			(ColumnData::Float(v), Value::Float(x)) => v.push(x),
			(ColumnData::Float(v), Value::Int(x)) => v.push(x as f64),
			(ColumnData::Utf8(v), Value::Utf8(x)) => v.push(x),
			(ColumnData::Boolean(v), Value::Boolean(x)) => v.push(x),
			(ColumnData::DateTime(v), Value::DateTime(x)) => v.push(x),
			(ColumnData::Date(v), Value::Date(x)) => v.push(x),
			(column, value) => {
				return_error!(internal(format!(
					"cannot push {} value into {} column",
					value.get_type(),
					column.get_type()
				)))
			}
		}
		Ok(())
	}

	/// Overwrites the value at `idx`. Panics when out of bounds.
	pub fn set_value(&mut self, idx: usize, value: Value) -> crate::Result<()> {
		match (self, value) {
			(ColumnData::Int(v), Value::Int(x)) => v[idx] = x,
			(ColumnData::Float(v), Value::Float(x)) => v[idx] = x,
			(ColumnData::Float(v), Value::Int(x)) => v[idx] = x as f64,
			(ColumnData::Utf8(v), Value::Utf8(x)) => v[idx] = x,
			(ColumnData::Boolean(v), Value::Boolean(x)) => v[idx] = x,
			(ColumnData::DateTime(v), Value::DateTime(x)) => v[idx] = x,
			(ColumnData::Date(v), Value::Date(x)) => v[idx] = x,
			(column, value) => {
				return_error!(internal(format!(
					"cannot store {} value in {} column",
					value.get_type(),
					column.get_type()
				)))
			}
		}
		Ok(())
	}

	/// Appends all values of `other`, which must have the same type.
	pub fn extend(&mut self, other: &ColumnData) -> crate::Result<()> {
		match (self, other) {
			(ColumnData::Int(l), ColumnData::Int(r)) => l.extend_from_slice(r),
			(ColumnData::Float(l), ColumnData::Float(r)) => l.extend_from_slice(r),
			(ColumnData::Utf8(l), ColumnData::Utf8(r)) => l.extend_from_slice(r),
			(ColumnData::Boolean(l), ColumnData::Boolean(r)) => l.extend_from_slice(r),
			(ColumnData::DateTime(l), ColumnData::DateTime(r)) => l.extend_from_slice(r),
			(ColumnData::Date(l), ColumnData::Date(r)) => l.extend_from_slice(r),
			(l, r) => {
				return_error!(internal(format!(
					"cannot extend {} column with {} values",
					l.get_type(),
					r.get_type()
				)))
			}
		}
		Ok(())
	}

	/// Gathers the values at `indices`, in that order.
	pub fn take(&self, indices: &[usize]) -> ColumnData {
		match self {
			ColumnData::Int(v) => ColumnData::Int(indices.iter().map(|&i| v[i]).collect()),
			ColumnData::Float(v) => ColumnData::Float(indices.iter().map(|&i| v[i]).collect()),
			ColumnData::Utf8(v) => ColumnData::Utf8(indices.iter().map(|&i| v[i].clone()).collect()),
			ColumnData::Boolean(v) => ColumnData::Boolean(indices.iter().map(|&i| v[i]).collect()),
			ColumnData::DateTime(v) => ColumnData::DateTime(indices.iter().map(|&i| v[i]).collect()),
			ColumnData::Date(v) => ColumnData::Date(indices.iter().map(|&i| v[i]).collect()),
		}
	}

	/// Builds a column of type `ty` from a JSON array.
	pub fn from_json(column: &str, ty: Type, json: &serde_json::Value) -> crate::Result<ColumnData> {
		let Some(items) = json.as_array() else {
			return_error!(malformed_batch(format!("column '{}' must be an array", column)));
		};

		let mut data = ColumnData::with_capacity(ty, items.len());
		for item in items {
			data.push_value(Value::from_json(column, ty, item)?)?;
		}
		Ok(data)
	}
}

impl From<Vec<i64>> for ColumnData {
	fn from(values: Vec<i64>) -> Self {
		ColumnData::Int(values)
	}
}

impl From<Vec<f64>> for ColumnData {
	fn from(values: Vec<f64>) -> Self {
		ColumnData::Float(values)
	}
}

impl From<Vec<String>> for ColumnData {
	fn from(values: Vec<String>) -> Self {
		ColumnData::Utf8(values)
	}
}

impl From<Vec<&str>> for ColumnData {
	fn from(values: Vec<&str>) -> Self {
		ColumnData::Utf8(values.into_iter().map(str::to_string).collect())
	}
}

impl From<Vec<bool>> for ColumnData {
	fn from(values: Vec<bool>) -> Self {
		ColumnData::Boolean(values)
	}
}

impl From<Vec<DateTime<Utc>>> for ColumnData {
	fn from(values: Vec<DateTime<Utc>>) -> Self {
		ColumnData::DateTime(values)
	}
}

impl From<Vec<NaiveDate>> for ColumnData {
	fn from(values: Vec<NaiveDate>) -> Self {
		ColumnData::Date(values)
	}
}
