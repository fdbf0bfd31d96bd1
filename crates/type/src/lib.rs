// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod error;
pub mod value;
mod version;

pub use error::{Diagnostic, Error, ErrorKind, Result};
pub use value::{Type, Value, column::ColumnData};
pub use version::TableVersion;
