// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use prism_table::TableRegistry;
use prism_view::ViewEngine;

use crate::{WsConfig, session::SessionRegistry};

/// Everything a connection task needs. Cheap to clone.
#[derive(Clone)]
pub struct WsState(Arc<WsStateInner>);

struct WsStateInner {
	config: WsConfig,
	tables: TableRegistry,
	engine: Arc<dyn ViewEngine>,
	sessions: SessionRegistry,
}

impl WsState {
	pub fn new(config: WsConfig, tables: TableRegistry, engine: Arc<dyn ViewEngine>) -> Self {
		Self(Arc::new(WsStateInner {
			config,
			tables,
			engine,
			sessions: SessionRegistry::new(),
		}))
	}

	pub fn config(&self) -> &WsConfig {
		&self.0.config
	}

	pub fn tables(&self) -> &TableRegistry {
		&self.0.tables
	}

	pub fn engine(&self) -> &Arc<dyn ViewEngine> {
		&self.0.engine
	}

	pub fn sessions(&self) -> &SessionRegistry {
		&self.0.sessions
	}

	pub fn max_connections(&self) -> usize {
		self.0.config.max_connections
	}
}
