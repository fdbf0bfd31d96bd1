// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

use parking_lot::RwLock;
use prism_type::TableVersion;

use crate::Columns;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl Display for ListenerId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// Notification of one applied batch.
#[derive(Debug, Clone)]
pub struct TableChange {
	pub table: Arc<str>,
	pub old_version: TableVersion,
	pub new_version: TableVersion,
	/// Table row index of the first row in `batch`.
	pub first_row: u64,
	pub batch: Arc<Columns>,
}

/// Receives a [`TableChange`] for every applied batch, in version order.
///
/// Called while the table's update feed is held: implementations must not block
/// and must not append to the same table.
pub trait TableListener: Send + Sync {
	fn on_change(&self, change: &TableChange);
}

impl<F> TableListener for F
where
	F: Fn(&TableChange) + Send + Sync,
{
	fn on_change(&self, change: &TableChange) {
		self(change)
	}
}

pub(crate) struct Listeners {
	next_id: AtomicU64,
	entries: RwLock<Vec<(ListenerId, Arc<dyn TableListener>)>>,
}

impl Listeners {
	pub(crate) fn new() -> Self {
		Self {
			next_id: AtomicU64::new(1),
			entries: RwLock::new(Vec::new()),
		}
	}

	pub(crate) fn add(&self, listener: Arc<dyn TableListener>) -> ListenerId {
		let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.entries.write().push((id, listener));
		id
	}

	pub(crate) fn remove(&self, id: ListenerId) -> bool {
		let mut entries = self.entries.write();
		let before = entries.len();
		entries.retain(|(existing, _)| *existing != id);
		entries.len() != before
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub(crate) fn notify(&self, change: &TableChange) {
		let listeners: Vec<Arc<dyn TableListener>> =
			self.entries.read().iter().map(|(_, listener)| listener.clone()).collect();
		for listener in listeners {
			listener.on_change(change);
		}
	}
}
