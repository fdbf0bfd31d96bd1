// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use dashmap::DashMap;
use prism_table::TableRegistry;
use prism_view::ViewEngine;
use tokio::sync::mpsc;
use tracing::debug;

use super::{Session, SessionId};
use crate::Response;

/// Live sessions of a server, so shutdown can close them all.
#[derive(Clone, Default)]
pub struct SessionRegistry {
	sessions: Arc<DashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates and registers a session in the `Connecting` state.
	pub fn register(
		&self,
		tables: TableRegistry,
		engine: Arc<dyn ViewEngine>,
		mailbox_capacity: usize,
	) -> (Arc<Session>, mpsc::UnboundedReceiver<Response>) {
		let (session, receiver) = Session::new(tables, engine, mailbox_capacity);
		self.sessions.insert(session.id(), session.clone());
		debug!("Registered session {} ({} live)", session.id(), self.sessions.len());
		(session, receiver)
	}

	pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
		self.sessions.get(&id).map(|entry| entry.value().clone())
	}

	/// Closes and unregisters a session.
	pub fn remove(&self, id: SessionId, reason: &str) -> Option<Arc<Session>> {
		let (_, session) = self.sessions.remove(&id)?;
		session.close(reason);
		Some(session)
	}

	/// Closes every session. They stay registered until their connection ends.
	pub fn close_all(&self, reason: &str) -> usize {
		let sessions: Vec<Arc<Session>> = self.sessions.iter().map(|entry| entry.value().clone()).collect();
		sessions.iter().filter(|session| session.close(reason)).count()
	}

	pub fn len(&self) -> usize {
		self.sessions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sessions.is_empty()
	}
}
