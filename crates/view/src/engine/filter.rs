// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cmp::Ordering, collections::HashSet};

use prism_type::{
	ColumnData, Error, Result, Type, Value, error::diagnostic::view::invalid_filter, return_error,
};

use crate::{Filter, FilterOperator};

/// A filter bound to a source column with its operand decoded to the column type.
#[derive(Debug)]
pub(crate) struct Predicate {
	column: usize,
	operator: FilterOperator,
	operand: Operand,
}

#[derive(Debug)]
enum Operand {
	Single(Value),
	Set(HashSet<Value>),
}

impl Predicate {
	pub(crate) fn compile(filter: &Filter, column: usize, ty: Type) -> Result<Self> {
		let name = filter.column.as_str();
		let operator = filter.operator;
		let decode = |json: &serde_json::Value| -> Result<Value> {
			Value::from_json(name, ty, json)
				.map_err(|e| Error(invalid_filter(name, operator.as_str(), format!("operand {}", e.message))))
		};

		let operand = match operator {
			FilterOperator::Contains => {
				if ty != Type::Utf8 {
					return_error!(invalid_filter(name, operator.as_str(), format!("not defined for {} columns", ty)));
				}
				Operand::Single(decode(&filter.value)?)
			}
			FilterOperator::In => {
				let Some(items) = filter.value.as_array() else {
					return_error!(invalid_filter(name, operator.as_str(), "operand must be an array"));
				};
				let mut set = HashSet::with_capacity(items.len());
				for item in items {
					set.insert(decode(item)?);
				}
				Operand::Set(set)
			}
			op if op.is_ordering() && ty == Type::Boolean => {
				return_error!(invalid_filter(name, operator.as_str(), "booleans are not ordered"));
			}
			_ => Operand::Single(decode(&filter.value)?),
		};

		Ok(Self {
			column,
			operator,
			operand,
		})
	}

	pub(crate) fn matches(&self, columns: &[ColumnData], row: usize) -> bool {
		let value = columns[self.column].get_value(row);

		match (&self.operand, self.operator) {
			(Operand::Set(set), _) => set.contains(&value),
			(Operand::Single(operand), FilterOperator::Equal) => value == *operand,
			(Operand::Single(operand), FilterOperator::NotEqual) => value != *operand,
			(Operand::Single(operand), FilterOperator::LessThan) => value.partial_cmp(operand) == Some(Ordering::Less),
			(Operand::Single(operand), FilterOperator::LessThanOrEqual) => {
				matches!(value.partial_cmp(operand), Some(Ordering::Less | Ordering::Equal))
			}
			(Operand::Single(operand), FilterOperator::GreaterThan) => {
				value.partial_cmp(operand) == Some(Ordering::Greater)
			}
			(Operand::Single(operand), FilterOperator::GreaterThanOrEqual) => {
				matches!(value.partial_cmp(operand), Some(Ordering::Greater | Ordering::Equal))
			}
			(Operand::Single(Value::Utf8(needle)), FilterOperator::Contains) => {
				matches!(&value, Value::Utf8(haystack) if haystack.contains(needle.as_str()))
			}
			(Operand::Single(_), _) => false,
		}
	}
}

/// Row positions in `0..row_count` that satisfy every predicate.
pub(crate) fn select(predicates: &[Predicate], columns: &[ColumnData], row_count: usize) -> Vec<usize> {
	(0..row_count).filter(|&row| predicates.iter().all(|p| p.matches(columns, row))).collect()
}
