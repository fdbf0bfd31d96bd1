// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use prism_table::{TableChange, TableSnapshot};
use prism_type::{ColumnData, Result, Type};

use crate::{
	Frame, FrameColumn,
	engine::{Changes, ViewState, filter::select, plan::Plan},
};

/// Filtered projection. Row numbers are table row indices, so appends only insert.
pub(crate) struct ProjectState {
	plan: Plan,
}

impl ProjectState {
	pub(crate) fn new(plan: Plan) -> Self {
		Self {
			plan,
		}
	}

	fn render(&self, columns: &[ColumnData], row_count: usize, first_row: u64) -> Frame {
		let rows = select(&self.plan.predicates, columns, row_count);

		Frame {
			row_numbers: rows.iter().map(|&row| first_row + row as u64).collect(),
			columns: self
				.plan
				.output
				.iter()
				.map(|output| FrameColumn {
					name: output.name.clone(),
					data: columns[output.source].take(&rows),
				})
				.collect(),
		}
	}
}

impl ViewState for ProjectState {
	fn layout(&self) -> Vec<(String, Type)> {
		self.plan.layout().map(|(name, ty)| (name.to_string(), ty)).collect()
	}

	fn compute(&mut self, snapshot: &TableSnapshot<'_>) -> Result<Frame> {
		Ok(self.render(snapshot.columns, snapshot.row_count, 0))
	}

	fn diff(&mut self, change: &TableChange) -> Result<Changes> {
		Ok(Changes {
			upserts: self.render(&change.batch.data, change.batch.row_count, change.first_row),
			removed: Vec::new(),
		})
	}
}
