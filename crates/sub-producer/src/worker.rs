// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
	thread::{self, JoinHandle},
	time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use prism_table::Table;
use prism_type::{Result, error::diagnostic::internal::internal};
use tracing::{debug, error, info, trace, warn};

use crate::BatchSource;

/// Counters shared between the producer thread and its owner.
#[derive(Debug, Default)]
pub(crate) struct ProducerStats {
	pub(crate) running: AtomicBool,
	pub(crate) appended: AtomicU64,
	pub(crate) failed: AtomicU64,
}

/// The producer thread. Dropping the worker stops it and joins the thread.
pub(crate) struct ProducerWorker {
	stop: Option<Sender<()>>,
	handle: Option<JoinHandle<()>>,
}

impl ProducerWorker {
	pub(crate) fn spawn(
		table: Table,
		mut source: Box<dyn BatchSource>,
		interval: Duration,
		iterations: Option<u64>,
		stats: Arc<ProducerStats>,
	) -> Result<Self> {
		let (stop, stopped) = bounded(1);
		stats.running.store(true, Ordering::SeqCst);

		let thread_stats = stats.clone();
		let handle = thread::Builder::new()
			.name(format!("prism-producer-{}", table.name()))
			.spawn(move || {
				info!("Producer for table {} started", table.name());
				worker_loop(&table, source.as_mut(), interval, iterations, &stopped, &thread_stats);
				thread_stats.running.store(false, Ordering::SeqCst);
				info!("Producer for table {} stopped", table.name());
			})
			.map_err(|e| {
				stats.running.store(false, Ordering::SeqCst);
				prism_type::Error(internal(format!("failed to spawn producer thread: {}", e)))
			})?;

		Ok(Self {
			stop: Some(stop),
			handle: Some(handle),
		})
	}

	/// Signals the thread and waits for it to finish its current iteration.
	pub(crate) fn stop(&mut self) {
		if let Some(stop) = self.stop.take() {
			let _ = stop.try_send(());
		}
		if let Some(handle) = self.handle.take() {
			if handle.join().is_err() {
				warn!("Producer thread panicked");
			}
		}
	}
}

impl Drop for ProducerWorker {
	fn drop(&mut self) {
		self.stop();
	}
}

fn worker_loop(
	table: &Table,
	source: &mut dyn BatchSource,
	interval: Duration,
	iterations: Option<u64>,
	stopped: &Receiver<()>,
	stats: &ProducerStats,
) {
	let mut iteration = 0u64;

	while iterations.is_none_or(|limit| iteration < limit) {
		match source.next_batch(iteration, table.schema()).and_then(|batch| table.append(batch)) {
			Ok(version) => {
				stats.appended.fetch_add(1, Ordering::SeqCst);
				trace!("Producer appended iteration {} to {} at version {}", iteration, table.name(), version);
			}
			Err(e) => {
				stats.failed.fetch_add(1, Ordering::SeqCst);
				error!("Producer failed to append to {}: {}", table.name(), e);
			}
		}
		iteration += 1;

		match stopped.recv_timeout(interval) {
			Err(RecvTimeoutError::Timeout) => {}
			Ok(()) | Err(RecvTimeoutError::Disconnected) => {
				debug!("Producer for {} stopped after {} iterations", table.name(), iteration);
				return;
			}
		}
	}
}
