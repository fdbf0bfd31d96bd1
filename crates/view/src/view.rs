// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use prism_table::{Table, TableChange};
use prism_type::{
	Error, ErrorKind, Result, TableVersion, Type,
	error::diagnostic::view::{engine_compute, view_not_found},
	return_error,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Delta, Frame, Replica, ViewConfig, ViewEngine, ViewState};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u64);

impl Display for ViewId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// A live, incrementally maintained render of one table.
///
/// The view remembers the version it last rendered. A change that does not continue
/// from that version is either stale (skipped) or reveals a gap, in which case the
/// view re-renders from the table instead of patching.
pub struct View {
	id: ViewId,
	table_name: String,
	table: Option<Table>,
	config: ViewConfig,
	state: Option<Box<dyn ViewState>>,
	replica: Replica,
}

impl View {
	/// Validates `config`, renders the table at its current version and returns the
	/// view with its initial [`Delta::Snapshot`].
	pub fn create(id: ViewId, table: Table, config: ViewConfig, engine: &dyn ViewEngine) -> Result<(Self, Delta)> {
		let state = engine.prepare(table.name(), table.schema(), &config)?;

		let mut view = Self {
			id,
			table_name: table.name().to_string(),
			table: Some(table),
			config,
			state: Some(state),
			replica: Replica::new(),
		};

		let delta = view.resync()?;
		debug!("Created view {} on table {} at version {}", id, view.table_name, delta.version());
		Ok((view, delta))
	}

	pub fn id(&self) -> ViewId {
		self.id
	}

	pub fn table_name(&self) -> &str {
		&self.table_name
	}

	pub fn config(&self) -> &ViewConfig {
		&self.config
	}

	/// Version of the last render.
	pub fn version(&self) -> TableVersion {
		self.replica.version()
	}

	pub fn layout(&self) -> Vec<(String, Type)> {
		self.state.as_ref().map(|state| state.layout()).unwrap_or_default()
	}

	pub fn is_closed(&self) -> bool {
		self.state.is_none()
	}

	/// Turns a table notification into the delta a client needs, if any.
	pub fn on_table_changed(&mut self, change: &TableChange) -> Result<Option<Delta>> {
		if *change.table != *self.table_name {
			return Ok(None);
		}

		let last = self.replica.version();
		let Some(state) = self.state.as_mut() else {
			return Ok(None);
		};

		if change.new_version <= last {
			trace!("View {} skips stale change {} (at {})", self.id, change.new_version, last);
			return Ok(None);
		}

		if change.old_version != last {
			debug!(
				"View {} expected change from version {}, got {}; re-rendering",
				self.id, last, change.old_version
			);
			return self.resync().map(Some);
		}

		let id = self.id;
		let changes = state.diff(change).map_err(|e| compute_error(id, e))?;
		let delta = Delta::Patch {
			from_version: change.old_version,
			to_version: change.new_version,
			upserts: changes.upserts,
			removed: changes.removed,
		};
		self.replica.apply(&delta)?;
		Ok(Some(delta))
	}

	/// Re-renders the whole table at its current version.
	pub fn resync(&mut self) -> Result<Delta> {
		let id = self.id;
		let (Some(table), Some(state)) = (&self.table, self.state.as_mut()) else {
			return_error!(view_not_found(id.0));
		};

		let (version, frame) = table
			.read(|snapshot| state.compute(&snapshot).map(|frame| (snapshot.version, frame)))
			.map_err(|e| compute_error(id, e))?;

		let delta = Delta::Snapshot {
			version,
			frame,
		};
		self.replica.apply(&delta)?;
		Ok(delta)
	}

	/// Current materialized frame.
	pub fn snapshot(&self) -> Frame {
		self.replica.frame().clone()
	}

	/// Releases engine state and the table handle. Idempotent.
	pub fn close(&mut self) {
		if self.state.take().is_some() {
			self.table = None;
			debug!("Closed view {} on table {}", self.id, self.table_name);
		}
	}
}

fn compute_error(id: ViewId, error: Error) -> Error {
	if error.kind() == ErrorKind::EngineComputeError {
		return error;
	}
	Error(engine_compute(id.0, error.message.clone()))
}
