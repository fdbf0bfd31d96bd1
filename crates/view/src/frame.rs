// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use prism_type::{ColumnData, Type, Value};
use serde::{Deserialize, Serialize};

/// A rendered view: stable row numbers plus named, typed columns of equal length.
///
/// ```json
/// {"row_numbers": [0, 1], "columns": [{"name": "x", "type": "integer", "values": [1, 2]}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
	pub row_numbers: Vec<u64>,
	pub columns: Vec<FrameColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameColumn {
	pub name: String,
	#[serde(flatten)]
	pub data: ColumnData,
}

impl FrameColumn {
	pub fn new(name: impl Into<String>, data: impl Into<ColumnData>) -> Self {
		Self {
			name: name.into(),
			data: data.into(),
		}
	}
}

impl Frame {
	/// An empty frame with the given column layout.
	pub fn empty<'a>(layout: impl IntoIterator<Item = (&'a str, Type)>) -> Self {
		Self {
			row_numbers: Vec::new(),
			columns: layout
				.into_iter()
				.map(|(name, ty)| FrameColumn::new(name, ColumnData::with_capacity(ty, 0)))
				.collect(),
		}
	}

	pub fn row_count(&self) -> usize {
		self.row_numbers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.row_numbers.is_empty()
	}

	pub fn column(&self, name: &str) -> Option<&ColumnData> {
		self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
	}

	pub fn column_names(&self) -> impl Iterator<Item = &str> {
		self.columns.iter().map(|c| c.name.as_str())
	}

	/// Values of the row at position `idx`, in column order.
	pub fn row(&self, idx: usize) -> Vec<Value> {
		self.columns.iter().map(|c| c.data.get_value(idx)).collect()
	}

	/// Rows at the given positions, in that order.
	pub fn take(&self, indices: &[usize]) -> Frame {
		Frame {
			row_numbers: indices.iter().map(|&i| self.row_numbers[i]).collect(),
			columns: self
				.columns
				.iter()
				.map(|c| FrameColumn {
					name: c.name.clone(),
					data: c.data.take(indices),
				})
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn frame() -> Frame {
		Frame {
			row_numbers: vec![4, 7, 9],
			columns: vec![FrameColumn::new("x", vec![1i64, 2, 3]), FrameColumn::new("name", vec!["a", "b", "c"])],
		}
	}

	#[test]
	fn test_take() {
		let taken = frame().take(&[2, 0]);
		assert_eq!(taken.row_numbers, vec![9, 4]);
		assert_eq!(taken.column("x"), Some(&ColumnData::Int(vec![3, 1])));
	}

	#[test]
	fn test_row() {
		assert_eq!(frame().row(1), vec![Value::Int(2), Value::from("b")]);
	}

	#[test]
	fn test_wire_shape() {
		let json = serde_json::to_value(frame().take(&[0])).unwrap();
		assert_eq!(
			json,
			json!({
				"row_numbers": [4],
				"columns": [
					{"name": "x", "type": "integer", "values": [1]},
					{"name": "name", "type": "string", "values": ["a"]}
				]
			})
		);

		let back: Frame = serde_json::from_value(json).unwrap();
		assert_eq!(back, frame().take(&[0]));
	}

	#[test]
	fn test_empty_layout() {
		let frame = Frame::empty([("x", Type::Int), ("y", Type::Float)]);
		assert!(frame.is_empty());
		assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["x", "y"]);
		assert_eq!(frame.column("y"), Some(&ColumnData::Float(vec![])));
	}
}
