// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashSet;

use indexmap::IndexMap;
use prism_type::{
	Result, Type,
	error::{
		Error,
		diagnostic::table::{duplicate_column, empty_column_name, empty_schema, malformed_batch, unsupported_type},
	},
	return_error,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
	pub name: String,
	pub r#type: Type,
}

/// Ordered column name to type mapping. Serializes as `{"x": "integer", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
	columns: Vec<SchemaColumn>,
}

impl Schema {
	/// Builds a schema without validating it; [`Schema::validate`] runs at table creation.
	pub fn new<N: Into<String>>(columns: impl IntoIterator<Item = (N, Type)>) -> Self {
		Self {
			columns: columns
				.into_iter()
				.map(|(name, r#type)| SchemaColumn {
					name: name.into(),
					r#type,
				})
				.collect(),
		}
	}

	/// Builds a schema from textual type names such as `"integer"`.
	pub fn parse<'a>(columns: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
		let mut result = Vec::new();
		for (name, type_name) in columns {
			let r#type = type_name.parse::<Type>().map_err(|_| Error(unsupported_type(name, type_name)))?;
			result.push(SchemaColumn {
				name: name.to_string(),
				r#type,
			});
		}
		Ok(Self {
			columns: result,
		})
	}

	/// Builds a schema from a JSON object mapping column names to type names.
	pub fn from_json(json: &serde_json::Value) -> Result<Self> {
		let Some(object) = json.as_object() else {
			return_error!(malformed_batch("schema must be an object of column name to type"));
		};

		let mut pairs = Vec::with_capacity(object.len());
		for (name, type_name) in object {
			let Some(type_name) = type_name.as_str() else {
				return_error!(unsupported_type(name, &type_name.to_string()));
			};
			pairs.push((name.as_str(), type_name));
		}
		Self::parse(pairs)
	}

	pub fn validate(&self, table: &str) -> Result<()> {
		if self.columns.is_empty() {
			return_error!(empty_schema(table));
		}

		let mut seen = HashSet::with_capacity(self.columns.len());
		for column in &self.columns {
			if column.name.is_empty() {
				return_error!(empty_column_name(table));
			}
			if !seen.insert(column.name.as_str()) {
				return_error!(duplicate_column(table, &column.name));
			}
		}
		Ok(())
	}

	pub fn columns(&self) -> &[SchemaColumn] {
		&self.columns
	}

	pub fn len(&self) -> usize {
		self.columns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}

	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c.name == name)
	}

	pub fn get_type(&self, name: &str) -> Option<Type> {
		self.columns.iter().find(|c| c.name == name).map(|c| c.r#type)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.columns.iter().map(|c| c.name.as_str())
	}
}

impl Serialize for Schema {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.columns.len()))?;
		for column in &self.columns {
			map.serialize_entry(&column.name, &column.r#type)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for Schema {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let columns = IndexMap::<String, String>::deserialize(deserializer)?;
		Schema::parse(columns.iter().map(|(name, ty)| (name.as_str(), ty.as_str())))
			.map_err(|e| de::Error::custom(e.message.clone()))
	}
}
