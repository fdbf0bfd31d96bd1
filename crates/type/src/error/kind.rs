// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Coarse classification of a diagnostic, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
	/// A batch does not fit the table schema. The table is unchanged.
	SchemaMismatch,
	/// A schema was rejected at table creation.
	InvalidSchema,
	/// A view configuration was rejected by the engine.
	InvalidViewConfig,
	/// A table name is already registered.
	DuplicateName,
	/// A view missed a notification. Recovered by re-snapshotting, never sent to clients.
	VersionGap,
	/// The engine failed while maintaining a view.
	EngineComputeError,
	/// The connection failed. The session is torn down.
	TransportFailure,
	TableNotFound,
	ViewNotFound,
	BadRequest,
	SessionClosed,
	Internal,
}

impl ErrorKind {
	pub fn from_code(code: &str) -> Self {
		match code {
			"TABLE_001" => ErrorKind::DuplicateName,
			"TABLE_002" => ErrorKind::TableNotFound,
			"VIEW_005" => ErrorKind::ViewNotFound,
			"VIEW_006" => ErrorKind::EngineComputeError,
			"VIEW_007" => ErrorKind::VersionGap,
			"SESSION_001" => ErrorKind::SessionClosed,
			"SESSION_002" => ErrorKind::BadRequest,
			"SESSION_003" | "SESSION_004" | "SESSION_005" => ErrorKind::TransportFailure,
			code if code.starts_with("SCHEMA_") => ErrorKind::InvalidSchema,
			code if code.starts_with("BATCH_") => ErrorKind::SchemaMismatch,
			code if code.starts_with("VIEW_") => ErrorKind::InvalidViewConfig,
			_ => ErrorKind::Internal,
		}
	}

	/// Whether the affected party can continue after this error.
	pub fn is_recoverable(&self) -> bool {
		!matches!(self, ErrorKind::TransportFailure | ErrorKind::SessionClosed)
	}
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}
