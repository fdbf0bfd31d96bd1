// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What a view shows of its table.
///
/// ```json
/// {"columns": ["x", "y"], "filter": [["x", ">", 5]], "group_by": ["y"], "aggregates": {"x": "avg"}}
/// ```
///
/// Aggregates take effect only together with `group_by`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
	/// Projected columns in output order. `None` selects every column of the table.
	pub columns: Option<Vec<String>>,
	pub filter: Vec<Filter>,
	pub group_by: Vec<String>,
	pub aggregates: IndexMap<String, Aggregate>,
}

impl ViewConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
		self.columns = Some(columns.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_filter(mut self, column: impl Into<String>, operator: FilterOperator, value: serde_json::Value) -> Self {
		self.filter.push(Filter {
			column: column.into(),
			operator,
			value,
		});
		self
	}

	pub fn with_group_by(mut self, column: impl Into<String>) -> Self {
		self.group_by.push(column.into());
		self
	}

	pub fn with_aggregate(mut self, column: impl Into<String>, aggregate: Aggregate) -> Self {
		self.aggregates.insert(column.into(), aggregate);
		self
	}

	pub fn is_aggregated(&self) -> bool {
		!self.group_by.is_empty()
	}
}

/// A `[column, operator, value]` predicate. All filters of a view must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, FilterOperator, serde_json::Value)", into = "(String, FilterOperator, serde_json::Value)")]
pub struct Filter {
	pub column: String,
	pub operator: FilterOperator,
	pub value: serde_json::Value,
}

impl From<(String, FilterOperator, serde_json::Value)> for Filter {
	fn from((column, operator, value): (String, FilterOperator, serde_json::Value)) -> Self {
		Self {
			column,
			operator,
			value,
		}
	}
}

impl From<Filter> for (String, FilterOperator, serde_json::Value) {
	fn from(filter: Filter) -> Self {
		(filter.column, filter.operator, filter.value)
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
	#[serde(rename = "==")]
	Equal,
	#[serde(rename = "!=")]
	NotEqual,
	#[serde(rename = "<")]
	LessThan,
	#[serde(rename = "<=")]
	LessThanOrEqual,
	#[serde(rename = ">")]
	GreaterThan,
	#[serde(rename = ">=")]
	GreaterThanOrEqual,
	#[serde(rename = "contains")]
	Contains,
	#[serde(rename = "in")]
	In,
}

impl FilterOperator {
	pub fn as_str(&self) -> &'static str {
		match self {
			FilterOperator::Equal => "==",
			FilterOperator::NotEqual => "!=",
			FilterOperator::LessThan => "<",
			FilterOperator::LessThanOrEqual => "<=",
			FilterOperator::GreaterThan => ">",
			FilterOperator::GreaterThanOrEqual => ">=",
			FilterOperator::Contains => "contains",
			FilterOperator::In => "in",
		}
	}

	pub fn is_ordering(&self) -> bool {
		matches!(
			self,
			FilterOperator::LessThan
				| FilterOperator::LessThanOrEqual
				| FilterOperator::GreaterThan
				| FilterOperator::GreaterThanOrEqual
		)
	}
}

impl Display for FilterOperator {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
	Sum,
	Count,
	Min,
	Max,
	Avg,
	First,
	Last,
}

impl Aggregate {
	pub fn as_str(&self) -> &'static str {
		match self {
			Aggregate::Sum => "sum",
			Aggregate::Count => "count",
			Aggregate::Min => "min",
			Aggregate::Max => "max",
			Aggregate::Avg => "avg",
			Aggregate::First => "first",
			Aggregate::Last => "last",
		}
	}
}

impl Display for Aggregate {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
