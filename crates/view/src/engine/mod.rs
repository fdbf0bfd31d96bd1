// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Computation behind views.
//!
//! A [`ViewEngine`] validates a [`ViewConfig`] against a table schema and returns the
//! [`ViewState`] that renders the table ([`ViewState::compute`]) and turns each applied
//! batch into row changes ([`ViewState::diff`]). [`StandardViewEngine`] ships filters,
//! projections, and group-by aggregation.

mod aggregate;
mod filter;
mod plan;
mod project;

use prism_table::{Schema, TableChange, TableSnapshot};
use prism_type::{Result, Type};
use tracing::debug;

use crate::{Frame, ViewConfig};

pub trait ViewEngine: Send + Sync {
	/// Validates `config` for `table` and builds the state of a new view.
	///
	/// Fails with an invalid view config error for unknown columns, filter operands that
	/// do not fit the column type, and aggregates not applicable to the column type.
	fn prepare(&self, table: &str, schema: &Schema, config: &ViewConfig) -> Result<Box<dyn ViewState>>;
}

pub trait ViewState: Send {
	/// Output columns of every frame this state renders.
	fn layout(&self) -> Vec<(String, Type)>;

	/// Renders the whole table and resets incremental state to `snapshot.version`.
	fn compute(&mut self, snapshot: &TableSnapshot<'_>) -> Result<Frame>;

	/// Incorporates one applied batch and returns the affected output rows.
	fn diff(&mut self, change: &TableChange) -> Result<Changes>;
}

/// Output rows touched by one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
	pub upserts: Frame,
	pub removed: Vec<u64>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardViewEngine;

impl StandardViewEngine {
	pub fn new() -> Self {
		Self
	}
}

impl ViewEngine for StandardViewEngine {
	fn prepare(&self, table: &str, schema: &Schema, config: &ViewConfig) -> Result<Box<dyn ViewState>> {
		let plan = plan::Plan::new(table, schema, config)?;
		debug!(
			"Prepared view on table {} with {} output columns and {} filters",
			table,
			plan.output.len(),
			plan.predicates.len()
		);

		if config.is_aggregated() {
			Ok(Box::new(aggregate::GroupedState::new(plan)))
		} else {
			Ok(Box::new(project::ProjectState::new(plan)))
		}
	}
}
