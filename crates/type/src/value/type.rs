// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{Error, diagnostic::table::unsupported_type};

/// Primitive column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
	/// 64-bit signed integer
	Int,
	/// 64-bit IEEE 754 float
	Float,
	/// UTF-8 string
	Utf8,
	Boolean,
	/// Instant in UTC with millisecond precision
	DateTime,
	/// Calendar date
	Date,
}

impl Type {
	pub fn as_str(&self) -> &'static str {
		match self {
			Type::Int => "integer",
			Type::Float => "float",
			Type::Utf8 => "string",
			Type::Boolean => "boolean",
			Type::DateTime => "datetime",
			Type::Date => "date",
		}
	}

	pub fn is_numeric(&self) -> bool {
		matches!(self, Type::Int | Type::Float)
	}

	pub fn is_temporal(&self) -> bool {
		matches!(self, Type::DateTime | Type::Date)
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Type {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"integer" | "int" => Ok(Type::Int),
			"float" => Ok(Type::Float),
			"string" => Ok(Type::Utf8),
			"boolean" | "bool" => Ok(Type::Boolean),
			"datetime" | "timestamp" => Ok(Type::DateTime),
			"date" => Ok(Type::Date),
			_ => Err(Error(unsupported_type("?", s))),
		}
	}
}

impl Serialize for Type {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Type {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let name = String::deserialize(deserializer)?;
		Type::from_str(&name).map_err(|e| de::Error::custom(e.message.clone()))
	}
}
