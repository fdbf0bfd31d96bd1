// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// An invariant was violated
pub fn internal(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "INTERNAL_ERROR".to_string(),
		message: format!("internal error: {}", reason.into()),
		label: None,
		help: Some("this is a bug, please report it".to_string()),
		notes: vec![],
	}
}
