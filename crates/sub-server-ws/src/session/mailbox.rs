// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::VecDeque;

use parking_lot::Mutex;
use prism_table::{TableChange, TableListener};
use tokio::sync::Notify;
use tracing::warn;

#[derive(Debug, Clone)]
pub enum MailboxEvent {
	Change(TableChange),
	/// Notifications were dropped. Every view has to re-snapshot.
	Resync,
}

/// Bounded queue between table listeners (producer threads) and a session task.
///
/// Pushing never blocks the producer: once `capacity` events are pending, the queue is
/// replaced by a single [`MailboxEvent::Resync`].
#[derive(Debug)]
pub struct Mailbox {
	inner: Mutex<MailboxState>,
	notify: Notify,
	capacity: usize,
}

#[derive(Debug, Default)]
struct MailboxState {
	queue: VecDeque<MailboxEvent>,
	closed: bool,
	overflows: u64,
}

impl Mailbox {
	pub fn new(capacity: usize) -> Self {
		Self {
			inner: Mutex::new(MailboxState::default()),
			notify: Notify::new(),
			capacity: capacity.max(1),
		}
	}

	pub fn push(&self, change: TableChange) {
		{
			let mut state = self.inner.lock();
			if state.closed {
				return;
			}

			if state.queue.len() >= self.capacity {
				warn!(
					"Mailbox overflow after {} pending changes, collapsing into a resync (table {} at version {})",
					state.queue.len(),
					change.table,
					change.new_version
				);
				state.queue.clear();
				state.queue.push_back(MailboxEvent::Resync);
				state.overflows += 1;
			} else {
				state.queue.push_back(MailboxEvent::Change(change));
			}
		}
		self.notify.notify_one();
	}

	/// Takes every pending event without waiting.
	pub fn drain(&self) -> Vec<MailboxEvent> {
		self.inner.lock().queue.drain(..).collect()
	}

	/// Waits for pending events. Returns `None` once the mailbox is closed.
	pub async fn recv(&self) -> Option<Vec<MailboxEvent>> {
		loop {
			{
				let mut state = self.inner.lock();
				if state.closed {
					return None;
				}
				if !state.queue.is_empty() {
					return Some(state.queue.drain(..).collect());
				}
			}
			self.notify.notified().await;
		}
	}

	/// Drops pending events and rejects later ones.
	pub fn close(&self) {
		{
			let mut state = self.inner.lock();
			state.closed = true;
			state.queue.clear();
		}
		self.notify.notify_one();
	}

	pub fn is_closed(&self) -> bool {
		self.inner.lock().closed
	}

	pub fn len(&self) -> usize {
		self.inner.lock().queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// How often pending changes were collapsed into a resync.
	pub fn overflows(&self) -> u64 {
		self.inner.lock().overflows
	}
}

impl TableListener for Mailbox {
	fn on_change(&self, change: &TableChange) {
		self.push(change.clone());
	}
}
