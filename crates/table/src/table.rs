// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use parking_lot::RwLock;
use prism_type::{ColumnData, Result, TableVersion};
use tracing::{debug, trace};

use crate::{
	Columns, RowBatch, Schema,
	feed::UpdateFeed,
	listener::{ListenerId, Listeners, TableChange, TableListener},
};

/// Handle to a shared, append-only, versioned table. Cloning is cheap.
#[derive(Clone)]
pub struct Table(Arc<TableInner>);

struct TableInner {
	name: Arc<str>,
	schema: Schema,
	store: RwLock<Store>,
	feed: UpdateFeed,
	listeners: Listeners,
}

struct Store {
	columns: Vec<ColumnData>,
	row_count: usize,
	version: TableVersion,
}

/// Consistent read of a table's contents at one version.
#[derive(Debug)]
pub struct TableSnapshot<'a> {
	pub version: TableVersion,
	pub row_count: usize,
	pub columns: &'a [ColumnData],
}

impl Table {
	/// Creates a table at version 0 with no rows.
	pub fn new(name: impl Into<Arc<str>>, schema: Schema) -> Result<Self> {
		let name = name.into();
		schema.validate(&name)?;

		let columns = schema.columns().iter().map(|c| ColumnData::with_capacity(c.r#type, 0)).collect();

		Ok(Self(Arc::new(TableInner {
			name,
			schema,
			store: RwLock::new(Store {
				columns,
				row_count: 0,
				version: TableVersion::INITIAL,
			}),
			feed: UpdateFeed::new(),
			listeners: Listeners::new(),
		})))
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub fn schema(&self) -> &Schema {
		&self.0.schema
	}

	pub fn version(&self) -> TableVersion {
		self.0.store.read().version
	}

	/// Number of rows stored.
	pub fn size(&self) -> usize {
		self.0.store.read().row_count
	}

	/// Validates `batch`, then applies it through the update feed and returns the new version.
	///
	/// A rejected batch never enters the feed and leaves the version unchanged.
	pub fn append(&self, batch: RowBatch) -> Result<TableVersion> {
		let inner = &self.0;
		let columns = Arc::new(batch.align(&inner.name, &inner.schema)?);

		inner.feed.submit(|| -> Result<TableVersion> {
			let change = {
				let mut store = inner.store.write();
				let first_row = store.row_count as u64;
				for (target, source) in store.columns.iter_mut().zip(columns.data.iter()) {
					target.extend(source)?;
				}
				store.row_count += columns.row_count;

				let old_version = store.version;
				store.version = old_version.next();

				TableChange {
					table: inner.name.clone(),
					old_version,
					new_version: store.version,
					first_row,
					batch: columns.clone(),
				}
			};

			trace!(
				"Appended {} rows to table {} at version {}",
				columns.row_count, inner.name, change.new_version
			);

			inner.listeners.notify(&change);
			Ok(change.new_version)
		})
	}

	/// Runs `f` against a consistent view of the table under its read lock.
	///
	/// `f` must not append to this table.
	pub fn read<R>(&self, f: impl FnOnce(TableSnapshot<'_>) -> R) -> R {
		let store = self.0.store.read();
		f(TableSnapshot {
			version: store.version,
			row_count: store.row_count,
			columns: &store.columns,
		})
	}

	/// Copies the table's columns together with the version they belong to.
	pub fn snapshot(&self) -> (TableVersion, Columns) {
		self.read(|snapshot| {
			(
				snapshot.version,
				Columns {
					data: snapshot.columns.to_vec(),
					row_count: snapshot.row_count,
				},
			)
		})
	}

	pub fn subscribe(&self, listener: Arc<dyn TableListener>) -> ListenerId {
		let id = self.0.listeners.add(listener);
		debug!("Registered listener {} on table {}", id, self.0.name);
		id
	}

	pub fn unsubscribe(&self, id: ListenerId) -> bool {
		let removed = self.0.listeners.remove(id);
		if removed {
			debug!("Removed listener {} from table {}", id, self.0.name);
		}
		removed
	}

	pub fn listener_count(&self) -> usize {
		self.0.listeners.len()
	}

	/// Appends holding or waiting for the update feed.
	pub fn pending_appends(&self) -> u64 {
		self.0.feed.queued()
	}
}

impl Debug for Table {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Table")
			.field("name", &self.0.name)
			.field("version", &self.version())
			.field("size", &self.size())
			.finish()
	}
}
