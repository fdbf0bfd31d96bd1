// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

pub mod internal;
pub mod session;
pub mod table;
pub mod view;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
}

impl Diagnostic {
	pub fn kind(&self) -> ErrorKind {
		ErrorKind::from_code(&self.code)
	}
}

impl Display for Diagnostic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.code, self.message)?;
		if let Some(help) = &self.help {
			write!(f, " (help: {})", help)?;
		}
		Ok(())
	}
}
