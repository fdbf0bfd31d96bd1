// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::TypeId, collections::HashMap};

use prism_sub_api::{HealthStatus, Subsystem};
use prism_type::Result;
use tracing::{debug, error, info};

/// Subsystems in start order. They are stopped in reverse.
#[derive(Default)]
pub(crate) struct Subsystems {
	subsystems: Vec<Box<dyn Subsystem>>,
	index: HashMap<TypeId, usize>,
	started: usize,
}

impl Subsystems {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn add(&mut self, subsystem: Box<dyn Subsystem>) {
		let type_id = (*subsystem).as_any().type_id();
		self.index.entry(type_id).or_insert(self.subsystems.len());
		self.subsystems.push(subsystem);
	}

	pub(crate) fn len(&self) -> usize {
		self.subsystems.len()
	}

	/// Starts every subsystem in order. On failure the already started ones are stopped
	/// again and the error is returned.
	pub(crate) async fn start_all(&mut self) -> Result<()> {
		if self.started > 0 {
			return Ok(());
		}

		info!("Starting {} subsystems", self.subsystems.len());
		for idx in 0..self.subsystems.len() {
			let subsystem = &mut self.subsystems[idx];
			let name = subsystem.name();
			debug!("Starting subsystem {}", name);

			if let Err(e) = subsystem.start().await {
				error!("Failed to start subsystem {}: {}", name, e);
				self.stop_all().await?;
				return Err(e);
			}
			self.started = idx + 1;
			debug!("Started subsystem {}", name);
		}

		Ok(())
	}

	/// Stops the started subsystems in reverse order. Every subsystem is asked to stop
	/// even when an earlier one fails; the first error is returned.
	pub(crate) async fn stop_all(&mut self) -> Result<()> {
		let mut first_error = None;

		for subsystem in self.subsystems[..self.started].iter_mut().rev() {
			let name = subsystem.name();
			debug!("Stopping subsystem {}", name);
			if let Err(e) = subsystem.shutdown().await {
				error!("Error stopping subsystem {}: {}", name, e);
				first_error.get_or_insert(e);
			}
		}
		self.started = 0;

		match first_error {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}

	pub(crate) fn names(&self) -> Vec<&'static str> {
		self.subsystems.iter().map(|subsystem| subsystem.name()).collect()
	}

	pub(crate) fn health(&self) -> Vec<(&'static str, HealthStatus)> {
		self.subsystems.iter().map(|subsystem| (subsystem.name(), subsystem.health_status())).collect()
	}

	/// The first registered subsystem of type `T`.
	pub(crate) fn get<T: 'static>(&self) -> Option<&T> {
		let index = *self.index.get(&TypeId::of::<T>())?;
		self.subsystems.get(index)?.as_any().downcast_ref::<T>()
	}

	/// Every registered subsystem of type `T`, in start order.
	pub(crate) fn all<T: 'static>(&self) -> impl Iterator<Item = &T> {
		self.subsystems.iter().filter_map(|subsystem| subsystem.as_any().downcast_ref::<T>())
	}
}

#[cfg(test)]
mod tests {
	use std::{
		any::Any,
		sync::{Arc, Mutex},
	};

	use async_trait::async_trait;
	use prism_type::error::diagnostic::internal::internal;

	use super::*;

	struct Recording {
		name: &'static str,
		log: Arc<Mutex<Vec<String>>>,
		fail_start: bool,
		running: bool,
	}

	impl Recording {
		fn boxed(name: &'static str, log: &Arc<Mutex<Vec<String>>>, fail_start: bool) -> Box<dyn Subsystem> {
			Box::new(Self {
				name,
				log: log.clone(),
				fail_start,
				running: false,
			})
		}
	}

	#[async_trait]
	impl Subsystem for Recording {
		fn name(&self) -> &'static str {
			self.name
		}

		async fn start(&mut self) -> Result<()> {
			if self.fail_start {
				return Err(prism_type::Error(internal("refusing to start")));
			}
			self.running = true;
			self.log.lock().unwrap().push(format!("start {}", self.name));
			Ok(())
		}

		async fn shutdown(&mut self) -> Result<()> {
			self.running = false;
			self.log.lock().unwrap().push(format!("stop {}", self.name));
			Ok(())
		}

		fn is_running(&self) -> bool {
			self.running
		}

		fn health_status(&self) -> HealthStatus {
			HealthStatus::Healthy
		}

		fn as_any(&self) -> &dyn Any {
			self
		}

		fn as_any_mut(&mut self) -> &mut dyn Any {
			self
		}
	}

	#[tokio::test]
	async fn test_stop_in_reverse_order() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut subsystems = Subsystems::new();
		subsystems.add(Recording::boxed("a", &log, false));
		subsystems.add(Recording::boxed("b", &log, false));

		subsystems.start_all().await.unwrap();
		subsystems.stop_all().await.unwrap();

		assert_eq!(*log.lock().unwrap(), vec!["start a", "start b", "stop b", "stop a"]);
	}

	#[tokio::test]
	async fn test_failed_start_rolls_back() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut subsystems = Subsystems::new();
		subsystems.add(Recording::boxed("a", &log, false));
		subsystems.add(Recording::boxed("b", &log, true));
		subsystems.add(Recording::boxed("c", &log, false));

		assert!(subsystems.start_all().await.is_err());
		assert_eq!(*log.lock().unwrap(), vec!["start a", "stop a"]);

		// Nothing left to stop.
		subsystems.stop_all().await.unwrap();
		assert_eq!(log.lock().unwrap().len(), 2);
	}

	#[test]
	fn test_lookup_by_type() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut subsystems = Subsystems::new();
		subsystems.add(Recording::boxed("a", &log, false));
		subsystems.add(Recording::boxed("b", &log, false));

		assert_eq!(subsystems.get::<Recording>().map(|r| r.name), Some("a"));
		assert_eq!(subsystems.all::<Recording>().count(), 2);
		assert_eq!(subsystems.names(), vec!["a", "b"]);
	}
}
