// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use prism_type::error::diagnostic::session::transport_failure;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failures of a single WebSocket connection. None of them affect other sessions.
#[derive(Debug, Error)]
pub enum ConnectionError {
	#[error("handshake failed: {0}")]
	Handshake(#[source] tungstenite::Error),

	#[error("websocket error: {0}")]
	WebSocket(#[from] tungstenite::Error),

	#[error("failed to encode message: {0}")]
	Encode(#[from] serde_json::Error),
}

impl From<ConnectionError> for prism_type::Error {
	fn from(err: ConnectionError) -> Self {
		prism_type::Error(transport_failure(err.to_string()))
	}
}
