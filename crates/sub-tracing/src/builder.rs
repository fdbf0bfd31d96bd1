// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::Level;

use crate::TracingSubsystem;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TracingFormat {
	#[default]
	Compact,
	Pretty,
	Json,
}

/// Configures the process-wide tracing subscriber.
///
/// `RUST_LOG`, when set, overrides the configured filter.
#[derive(Debug, Clone)]
pub struct TracingBuilder {
	pub(crate) filter: String,
	pub(crate) format: TracingFormat,
	pub(crate) with_target: bool,
	pub(crate) with_thread_names: bool,
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl TracingBuilder {
	pub fn new() -> Self {
		Self {
			filter: Level::INFO.as_str().to_ascii_lowercase(),
			format: TracingFormat::Compact,
			with_target: true,
			with_thread_names: false,
		}
	}

	pub fn with_level(mut self, level: Level) -> Self {
		self.filter = level.as_str().to_ascii_lowercase();
		self
	}

	/// Filter directives such as `info,prism_sub_server_ws=debug`.
	pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
		self.filter = filter.into();
		self
	}

	pub fn with_format(mut self, format: TracingFormat) -> Self {
		self.format = format;
		self
	}

	pub fn with_target(mut self, enabled: bool) -> Self {
		self.with_target = enabled;
		self
	}

	pub fn with_thread_names(mut self, enabled: bool) -> Self {
		self.with_thread_names = enabled;
		self
	}

	pub fn filter(&self) -> &str {
		&self.filter
	}

	pub fn format(&self) -> TracingFormat {
		self.format
	}

	pub fn build(self) -> TracingSubsystem {
		TracingSubsystem::new(self)
	}
}
