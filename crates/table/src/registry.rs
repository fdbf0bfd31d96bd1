// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use prism_type::{
	Result, TableVersion,
	error::diagnostic::table::{duplicate_table_name, table_not_found},
	return_error,
};
use tracing::debug;

use crate::{RowBatch, Schema, Table};

/// Process-wide name to [`Table`] registry. Tables live as long as the registry.
#[derive(Clone, Default)]
pub struct TableRegistry {
	tables: Arc<DashMap<String, Table>>,
}

impl TableRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn create(&self, name: &str, schema: Schema) -> Result<Table> {
		match self.tables.entry(name.to_string()) {
			Entry::Occupied(_) => return_error!(duplicate_table_name(name)),
			Entry::Vacant(entry) => {
				let table = Table::new(name, schema)?;
				entry.insert(table.clone());
				debug!("Created table {} with {} columns", name, table.schema().len());
				Ok(table)
			}
		}
	}

	pub fn get(&self, name: &str) -> Result<Table> {
		match self.tables.get(name) {
			Some(table) => Ok(table.value().clone()),
			None => return_error!(table_not_found(name)),
		}
	}

	pub fn contains(&self, name: &str) -> bool {
		self.tables.contains_key(name)
	}

	/// Registered table names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.tables.iter().map(|entry| entry.key().clone()).collect();
		names.sort();
		names
	}

	pub fn append(&self, name: &str, batch: RowBatch) -> Result<TableVersion> {
		self.get(name)?.append(batch)
	}

	pub fn current_version(&self, name: &str) -> Result<TableVersion> {
		Ok(self.get(name)?.version())
	}

	pub fn len(&self) -> usize {
		self.tables.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}
}
