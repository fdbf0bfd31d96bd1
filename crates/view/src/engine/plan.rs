// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashSet;

use prism_table::Schema;
use prism_type::{
	Result, Type,
	error::diagnostic::view::{aggregate_not_applicable, invalid_config, unknown_column},
	return_error,
};

use crate::{
	Aggregate, ViewConfig,
	engine::{aggregate::output_type, filter::Predicate},
};

/// A [`ViewConfig`] resolved against a table schema.
#[derive(Debug)]
pub(crate) struct Plan {
	pub(crate) predicates: Vec<Predicate>,
	pub(crate) group_by: Vec<usize>,
	pub(crate) output: Vec<OutputColumn>,
}

#[derive(Debug)]
pub(crate) struct OutputColumn {
	pub(crate) name: String,
	pub(crate) source: usize,
	pub(crate) r#type: Type,
	pub(crate) kind: OutputKind,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum OutputKind {
	/// Copied row by row from the source column.
	Column,
	/// Position within the group key.
	GroupKey(usize),
	Aggregate(Aggregate),
}

impl Plan {
	pub(crate) fn new(table: &str, schema: &Schema, config: &ViewConfig) -> Result<Self> {
		let resolve = |name: &str| -> Result<(usize, Type)> {
			match (schema.column_index(name), schema.get_type(name)) {
				(Some(idx), Some(ty)) => Ok((idx, ty)),
				_ => return_error!(unknown_column(table, name)),
			}
		};

		let projected: Vec<String> = match &config.columns {
			Some(columns) => columns.clone(),
			None => schema.names().map(str::to_string).collect(),
		};
		ensure_distinct("columns", &projected)?;
		for name in &projected {
			resolve(name)?;
		}

		ensure_distinct("group_by", &config.group_by)?;
		let mut group_by = Vec::with_capacity(config.group_by.len());
		for name in &config.group_by {
			group_by.push(resolve(name)?.0);
		}

		for (name, aggregate) in &config.aggregates {
			let (_, ty) = resolve(name)?;
			if config.group_by.contains(name) {
				return_error!(invalid_config(format!("column '{}' is grouped and cannot be aggregated", name)));
			}
			if matches!(aggregate, Aggregate::Sum | Aggregate::Avg) && !ty.is_numeric() {
				return_error!(aggregate_not_applicable(name, aggregate.as_str(), ty));
			}
		}

		let mut predicates = Vec::with_capacity(config.filter.len());
		for filter in &config.filter {
			let (idx, ty) = resolve(&filter.column)?;
			predicates.push(Predicate::compile(filter, idx, ty)?);
		}

		let mut output = Vec::new();
		if config.is_aggregated() {
			for (pos, name) in config.group_by.iter().enumerate() {
				let (source, ty) = resolve(name)?;
				output.push(OutputColumn {
					name: name.clone(),
					source,
					r#type: ty,
					kind: OutputKind::GroupKey(pos),
				});
			}
			for name in projected.iter().filter(|name| !config.group_by.contains(name)) {
				let (source, ty) = resolve(name)?;
				let aggregate = config.aggregates.get(name).copied().unwrap_or(default_aggregate(ty));
				output.push(OutputColumn {
					name: name.clone(),
					source,
					r#type: output_type(aggregate, ty),
					kind: OutputKind::Aggregate(aggregate),
				});
			}
		} else {
			for name in &projected {
				let (source, ty) = resolve(name)?;
				output.push(OutputColumn {
					name: name.clone(),
					source,
					r#type: ty,
					kind: OutputKind::Column,
				});
			}
		}

		Ok(Self {
			predicates,
			group_by,
			output,
		})
	}

	pub(crate) fn layout(&self) -> impl Iterator<Item = (&str, Type)> {
		self.output.iter().map(|c| (c.name.as_str(), c.r#type))
	}
}

/// Numeric columns sum, everything else counts.
pub(crate) fn default_aggregate(ty: Type) -> Aggregate {
	if ty.is_numeric() {
		Aggregate::Sum
	} else {
		Aggregate::Count
	}
}

fn ensure_distinct(field: &str, names: &[String]) -> Result<()> {
	let mut seen = HashSet::with_capacity(names.len());
	for name in names {
		if !seen.insert(name.as_str()) {
			return_error!(invalid_config(format!("column '{}' listed more than once in {}", name, field)));
		}
	}
	Ok(())
}
