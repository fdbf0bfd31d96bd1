// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{HashMap, HashSet};

use prism_type::{
	Result, TableVersion,
	error::diagnostic::{internal::internal, view::version_gap},
	return_error,
};
use serde::{Deserialize, Serialize};

use crate::Frame;

/// Change of a view between two renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
	/// Complete render at `version`, sent first and after every resync.
	Snapshot {
		version: TableVersion,
		frame: Frame,
	},
	/// Rows of `upserts` replace rows with the same row number or are inserted;
	/// rows listed in `removed` are dropped.
	Patch {
		from_version: TableVersion,
		to_version: TableVersion,
		upserts: Frame,
		removed: Vec<u64>,
	},
}

impl Delta {
	/// Version of the render after applying this delta.
	pub fn version(&self) -> TableVersion {
		match self {
			Delta::Snapshot {
				version,
				..
			} => *version,
			Delta::Patch {
				to_version,
				..
			} => *to_version,
		}
	}

	pub fn is_snapshot(&self) -> bool {
		matches!(self, Delta::Snapshot { .. })
	}
}

/// Materialized copy of a view built by replaying deltas.
#[derive(Debug, Clone, Default)]
pub struct Replica {
	version: TableVersion,
	frame: Frame,
	positions: HashMap<u64, usize>,
}

impl Replica {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn version(&self) -> TableVersion {
		self.version
	}

	pub fn frame(&self) -> &Frame {
		&self.frame
	}

	/// Applies `delta`. A patch must start at the replica's current version.
	pub fn apply(&mut self, delta: &Delta) -> Result<()> {
		match delta {
			Delta::Snapshot {
				version,
				frame,
			} => {
				self.version = *version;
				self.frame = frame.clone();
				self.reindex();
			}
			Delta::Patch {
				from_version,
				to_version,
				upserts,
				removed,
			} => {
				if *from_version != self.version {
					return_error!(version_gap(self.version.0, from_version.0));
				}
				if upserts.columns.len() != self.frame.columns.len() {
					return_error!(internal(format!(
						"patch has {} columns, view has {}",
						upserts.columns.len(),
						self.frame.columns.len()
					)));
				}

				for (pos, row_number) in upserts.row_numbers.iter().enumerate() {
					match self.positions.get(row_number) {
						Some(&idx) => {
							for (target, source) in self.frame.columns.iter_mut().zip(&upserts.columns) {
								target.data.set_value(idx, source.data.get_value(pos))?;
							}
						}
						None => {
							for (target, source) in self.frame.columns.iter_mut().zip(&upserts.columns) {
								target.data.push_value(source.data.get_value(pos))?;
							}
							self.positions.insert(*row_number, self.frame.row_numbers.len());
							self.frame.row_numbers.push(*row_number);
						}
					}
				}

				if !removed.is_empty() {
					let removed: HashSet<u64> = removed.iter().copied().collect();
					let keep: Vec<usize> = (0..self.frame.row_count())
						.filter(|&idx| !removed.contains(&self.frame.row_numbers[idx]))
						.collect();
					self.frame = self.frame.take(&keep);
					self.reindex();
				}

				self.version = *to_version;
			}
		}
		Ok(())
	}

	fn reindex(&mut self) {
		self.positions = self.frame.row_numbers.iter().enumerate().map(|(idx, &row_number)| (row_number, idx)).collect();
	}
}
