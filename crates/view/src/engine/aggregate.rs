// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	collections::{BTreeSet, HashMap},
};

use prism_table::{TableChange, TableSnapshot};
use prism_type::{ColumnData, Result, Type, Value, error::diagnostic::internal::internal, return_error};

use crate::{
	Aggregate, Frame,
	engine::{
		Changes, ViewState,
		filter::select,
		plan::{OutputKind, Plan},
	},
};

/// Output type of `aggregate` applied to an `input` column.
pub(crate) fn output_type(aggregate: Aggregate, input: Type) -> Type {
	match aggregate {
		Aggregate::Count => Type::Int,
		Aggregate::Avg => Type::Float,
		Aggregate::Sum | Aggregate::Min | Aggregate::Max | Aggregate::First | Aggregate::Last => input,
	}
}

/// Running state of one aggregate within one group, seeded with the group's first value.
#[derive(Debug, Clone)]
pub(crate) enum Accumulator {
	SumInt(i64),
	SumFloat(f64),
	Count(i64),
	Avg {
		sum: f64,
		count: u64,
	},
	Min(Value),
	Max(Value),
	First(Value),
	Last(Value),
}

impl Accumulator {
	pub(crate) fn new(aggregate: Aggregate, value: Value) -> Self {
		match aggregate {
			Aggregate::Sum => match value {
				Value::Int(v) => Accumulator::SumInt(v),
				other => Accumulator::SumFloat(other.as_f64().unwrap_or(0.0)),
			},
			Aggregate::Count => Accumulator::Count(1),
			Aggregate::Avg => Accumulator::Avg {
				sum: value.as_f64().unwrap_or(0.0),
				count: 1,
			},
			Aggregate::Min => Accumulator::Min(value),
			Aggregate::Max => Accumulator::Max(value),
			Aggregate::First => Accumulator::First(value),
			Aggregate::Last => Accumulator::Last(value),
		}
	}

	/// Folds `value` in. Returns `None` when an integer sum or count overflows.
	pub(crate) fn update(&mut self, value: Value) -> Option<()> {
		match self {
			Accumulator::SumInt(sum) => {
				if let Value::Int(v) = value {
					*sum = sum.checked_add(v)?;
				}
			}
			Accumulator::SumFloat(sum) => *sum += value.as_f64().unwrap_or(0.0),
			Accumulator::Count(count) => *count = count.checked_add(1)?,
			Accumulator::Avg {
				sum,
				count,
			} => {
				*sum += value.as_f64().unwrap_or(0.0);
				*count += 1;
			}
			Accumulator::Min(current) => {
				if value.partial_cmp(current) == Some(Ordering::Less) {
					*current = value;
				}
			}
			Accumulator::Max(current) => {
				if value.partial_cmp(current) == Some(Ordering::Greater) {
					*current = value;
				}
			}
			Accumulator::First(_) => {}
			Accumulator::Last(current) => *current = value,
		}
		Some(())
	}

	pub(crate) fn value(&self) -> Value {
		match self {
			Accumulator::SumInt(sum) => Value::Int(*sum),
			Accumulator::SumFloat(sum) => Value::Float(*sum),
			Accumulator::Count(count) => Value::Int(*count),
			Accumulator::Avg {
				sum,
				count,
			} => Value::Float(*sum / *count as f64),
			Accumulator::Min(v) | Accumulator::Max(v) | Accumulator::First(v) | Accumulator::Last(v) => v.clone(),
		}
	}
}

/// Group-by view state. Row numbers are group indices in order of first appearance.
pub(crate) struct GroupedState {
	plan: Plan,
	index: HashMap<Vec<Value>, usize>,
	keys: Vec<Vec<Value>>,
	/// Per group, one slot per output column; `None` for key columns.
	accumulators: Vec<Vec<Option<Accumulator>>>,
}

impl GroupedState {
	pub(crate) fn new(plan: Plan) -> Self {
		Self {
			plan,
			index: HashMap::new(),
			keys: Vec::new(),
			accumulators: Vec::new(),
		}
	}

	pub(crate) fn group_count(&self) -> usize {
		self.keys.len()
	}

	fn reset(&mut self) {
		self.index.clear();
		self.keys.clear();
		self.accumulators.clear();
	}

	/// Folds the selected rows into their groups and returns the touched group indices.
	fn ingest(&mut self, columns: &[ColumnData], row_count: usize) -> Result<BTreeSet<usize>> {
		let mut touched = BTreeSet::new();

		for row in select(&self.plan.predicates, columns, row_count) {
			let key: Vec<Value> = self.plan.group_by.iter().map(|&c| columns[c].get_value(row)).collect();

			let group = match self.index.get(&key) {
				Some(&group) => {
					for (output, slot) in self.plan.output.iter().zip(self.accumulators[group].iter_mut()) {
						if let Some(accumulator) = slot {
							if accumulator.update(columns[output.source].get_value(row)).is_none() {
								return_error!(internal(format!(
									"{} of column '{}' overflows a 64-bit integer",
									aggregate_name(output.kind),
									output.name
								)));
							}
						}
					}
					group
				}
				None => {
					let group = self.keys.len();
					let slots = self
						.plan
						.output
						.iter()
						.map(|output| match output.kind {
							OutputKind::Aggregate(aggregate) => {
								Some(Accumulator::new(aggregate, columns[output.source].get_value(row)))
							}
							OutputKind::GroupKey(_) | OutputKind::Column => None,
						})
						.collect();
					self.index.insert(key.clone(), group);
					self.keys.push(key);
					self.accumulators.push(slots);
					group
				}
			};

			touched.insert(group);
		}

		Ok(touched)
	}

	fn render(&self, groups: impl IntoIterator<Item = usize>) -> Result<Frame> {
		let mut frame = Frame::empty(self.plan.layout());

		for group in groups {
			frame.row_numbers.push(group as u64);
			for (idx, output) in self.plan.output.iter().enumerate() {
				let value = match (output.kind, &self.accumulators[group][idx]) {
					(OutputKind::GroupKey(pos), _) => self.keys[group][pos].clone(),
					(OutputKind::Aggregate(_), Some(accumulator)) => accumulator.value(),
					_ => return_error!(internal(format!("no value for column '{}'", output.name))),
				};
				frame.columns[idx].data.push_value(value)?;
			}
		}

		Ok(frame)
	}
}

fn aggregate_name(kind: OutputKind) -> &'static str {
	match kind {
		OutputKind::Aggregate(aggregate) => aggregate.as_str(),
		OutputKind::GroupKey(_) | OutputKind::Column => "value",
	}
}

impl ViewState for GroupedState {
	fn layout(&self) -> Vec<(String, Type)> {
		self.plan.layout().map(|(name, ty)| (name.to_string(), ty)).collect()
	}

	fn compute(&mut self, snapshot: &TableSnapshot<'_>) -> Result<Frame> {
		self.reset();
		self.ingest(snapshot.columns, snapshot.row_count)?;
		self.render(0..self.group_count())
	}

	fn diff(&mut self, change: &TableChange) -> Result<Changes> {
		let touched = self.ingest(&change.batch.data, change.batch.row_count)?;
		Ok(Changes {
			upserts: self.render(touched)?,
			removed: Vec::new(),
		})
	}
}
