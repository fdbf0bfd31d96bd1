// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{self, Display, Formatter},
	hash::{Hash, Hasher},
};

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, Serializer};

pub mod column;
mod r#type;

pub use r#type::Type;

use crate::error::{Error, diagnostic::table::invalid_value};

/// A single cell.
#[derive(Debug, Clone)]
pub enum Value {
	Int(i64),
	Float(f64),
	Utf8(String),
	Boolean(bool),
	DateTime(DateTime<Utc>),
	Date(NaiveDate),
}

impl Value {
	pub fn get_type(&self) -> Type {
		match self {
			Value::Int(_) => Type::Int,
			Value::Float(_) => Type::Float,
			Value::Utf8(_) => Type::Utf8,
			Value::Boolean(_) => Type::Boolean,
			Value::DateTime(_) => Type::DateTime,
			Value::Date(_) => Type::Date,
		}
	}

	/// Numeric view of the value, for aggregation and mixed comparisons.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Int(v) => Some(*v as f64),
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// Interprets a JSON value as the given column type.
	///
	/// Integers accept integral JSON numbers, floats accept any number, datetimes accept
	/// RFC 3339 strings or epoch milliseconds, dates accept `YYYY-MM-DD`.
	pub fn from_json(column: &str, ty: Type, json: &serde_json::Value) -> crate::Result<Value> {
		let reject = || Error(invalid_value(column, ty, &json.to_string()));

		match ty {
			Type::Int => json.as_i64().map(Value::Int).ok_or_else(reject),
			Type::Float => json.as_f64().map(Value::Float).ok_or_else(reject),
			Type::Utf8 => json.as_str().map(|s| Value::Utf8(s.to_string())).ok_or_else(reject),
			Type::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(reject),
			Type::DateTime => match json {
				serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
					.map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
					.map_err(|_| reject()),
				serde_json::Value::Number(n) => n
					.as_i64()
					.and_then(|millis| Utc.timestamp_millis_opt(millis).single())
					.map(Value::DateTime)
					.ok_or_else(reject),
				_ => Err(reject()),
			},
			Type::Date => json
				.as_str()
				.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
				.map(Value::Date)
				.ok_or_else(reject),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Int(l), Value::Int(r)) => l == r,
			(Value::Float(l), Value::Float(r)) => l.total_cmp(r) == Ordering::Equal,
			(Value::Utf8(l), Value::Utf8(r)) => l == r,
			(Value::Boolean(l), Value::Boolean(r)) => l == r,
			(Value::DateTime(l), Value::DateTime(r)) => l == r,
			(Value::Date(l), Value::Date(r)) => l == r,
			_ => false,
		}
	}
}

impl Eq for Value {}

impl Hash for Value {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			Value::Int(v) => v.hash(state),
			Value::Float(v) => v.to_bits().hash(state),
			Value::Utf8(v) => v.hash(state),
			Value::Boolean(v) => v.hash(state),
			Value::DateTime(v) => v.hash(state),
			Value::Date(v) => v.hash(state),
		}
	}
}

impl PartialOrd for Value {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		match (self, other) {
			(Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
			(Value::Float(l), Value::Float(r)) => l.partial_cmp(r),
			(Value::Int(_), Value::Float(_)) | (Value::Float(_), Value::Int(_)) => {
				self.as_f64()?.partial_cmp(&other.as_f64()?)
			}
			(Value::Utf8(l), Value::Utf8(r)) => Some(l.cmp(r)),
			(Value::Boolean(l), Value::Boolean(r)) => Some(l.cmp(r)),
			(Value::DateTime(l), Value::DateTime(r)) => Some(l.cmp(r)),
			(Value::Date(l), Value::Date(r)) => Some(l.cmp(r)),
			_ => None,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Int(v) => Display::fmt(v, f),
			Value::Float(v) => Display::fmt(v, f),
			Value::Utf8(v) => f.write_str(v),
			Value::Boolean(v) => Display::fmt(v, f),
			Value::DateTime(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::Millis, true)),
			Value::Date(v) => Display::fmt(v, f),
		}
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Value::Int(v) => serializer.serialize_i64(*v),
			Value::Float(v) => serializer.serialize_f64(*v),
			Value::Utf8(v) => serializer.serialize_str(v),
			Value::Boolean(v) => serializer.serialize_bool(*v),
			Value::DateTime(v) => v.serialize(serializer),
			Value::Date(v) => v.serialize(serializer),
		}
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Utf8(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Utf8(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Boolean(value)
	}
}
