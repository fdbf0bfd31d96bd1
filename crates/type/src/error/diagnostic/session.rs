// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// SESSION_001: The session no longer accepts work
pub fn session_closed() -> Diagnostic {
	Diagnostic {
		code: "SESSION_001".to_string(),
		message: "session is closed".to_string(),
		label: None,
		help: Some("open a new connection".to_string()),
		notes: vec![],
	}
}

/// SESSION_002: The request could not be understood
pub fn bad_request(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "SESSION_002".to_string(),
		message: format!("bad request: {}", reason.into()),
		label: None,
		help: None,
		notes: vec![],
	}
}

/// SESSION_003: The connection failed
pub fn transport_failure(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "SESSION_003".to_string(),
		message: format!("transport failure: {}", reason.into()),
		label: None,
		help: None,
		notes: vec!["reconnecting starts a new session".to_string()],
	}
}

/// SESSION_004: The server could not bind its listener
pub fn bind_failed(addr: &str, error: impl std::fmt::Display) -> Diagnostic {
	Diagnostic {
		code: "SESSION_004".to_string(),
		message: format!("failed to bind {}: {}", addr, error),
		label: None,
		help: Some("check that the port is free and the address is local".to_string()),
		notes: vec![],
	}
}

/// SESSION_005: The bound address could not be read back
pub fn address_unavailable(error: impl std::fmt::Display) -> Diagnostic {
	Diagnostic {
		code: "SESSION_005".to_string(),
		message: format!("failed to read the bound address: {}", error),
		label: None,
		help: None,
		notes: vec![],
	}
}
