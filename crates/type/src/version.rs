// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};

/// Version of a table. Starts at 0 and advances by exactly one per applied batch.
#[repr(transparent)]
#[derive(Debug, Default, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableVersion(pub u64);

impl TableVersion {
	pub const INITIAL: TableVersion = TableVersion(0);

	pub fn next(self) -> TableVersion {
		TableVersion(self.0 + 1)
	}
}

impl Display for TableVersion {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl Deref for TableVersion {
	type Target = u64;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl PartialEq<u64> for TableVersion {
	fn eq(&self, other: &u64) -> bool {
		self.0.eq(other)
	}
}

impl From<TableVersion> for u64 {
	fn from(value: TableVersion) -> Self {
		value.0
	}
}

impl From<u64> for TableVersion {
	fn from(value: u64) -> Self {
		TableVersion(value)
	}
}
