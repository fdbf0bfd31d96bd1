// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};

/// Per-table serialization point for appends.
///
/// Every submitter draws a ticket and waits until the ticket is served, so at
/// most one closure runs at a time and closures run in ticket order.
pub(crate) struct UpdateFeed {
	next_ticket: AtomicU64,
	serving: Mutex<u64>,
	turn: Condvar,
}

impl UpdateFeed {
	pub(crate) fn new() -> Self {
		Self {
			next_ticket: AtomicU64::new(0),
			serving: Mutex::new(0),
			turn: Condvar::new(),
		}
	}

	/// Runs `f` once every earlier ticket has completed.
	pub(crate) fn submit<R>(&self, f: impl FnOnce() -> R) -> R {
		let ticket = self.next_ticket.fetch_add(1, Ordering::AcqRel);

		let mut serving = self.serving.lock();
		while *serving != ticket {
			self.turn.wait(&mut serving);
		}
		drop(serving);

		let _turn = Turn(self);
		f()
	}

	/// Number of submitters holding or waiting for the feed.
	pub(crate) fn queued(&self) -> u64 {
		let serving = *self.serving.lock();
		self.next_ticket.load(Ordering::Acquire).saturating_sub(serving)
	}
}

/// Hands the feed to the next ticket, also when the closure panics.
struct Turn<'a>(&'a UpdateFeed);

impl Drop for Turn<'_> {
	fn drop(&mut self) {
		let mut serving = self.0.serving.lock();
		*serving += 1;
		self.0.turn.notify_all();
	}
}
