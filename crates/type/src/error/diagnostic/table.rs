// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;
use crate::value::Type;

/// TABLE_001: A table with this name is already registered
pub fn duplicate_table_name(name: &str) -> Diagnostic {
	Diagnostic {
		code: "TABLE_001".to_string(),
		message: format!("table '{}' already exists", name),
		label: Some("duplicate table name".to_string()),
		help: Some("choose a different name or open the existing table".to_string()),
		notes: vec![],
	}
}

/// TABLE_002: No table is registered under this name
pub fn table_not_found(name: &str) -> Diagnostic {
	Diagnostic {
		code: "TABLE_002".to_string(),
		message: format!("table '{}' not found", name),
		label: None,
		help: Some("list the hosted tables to see which names are available".to_string()),
		notes: vec![],
	}
}

/// SCHEMA_001: A schema needs at least one column
pub fn empty_schema(table: &str) -> Diagnostic {
	Diagnostic {
		code: "SCHEMA_001".to_string(),
		message: format!("schema of table '{}' has no columns", table),
		label: None,
		help: Some("declare at least one column, e.g. {\"x\": \"integer\"}".to_string()),
		notes: vec![],
	}
}

/// SCHEMA_002: A column name appears twice
pub fn duplicate_column(table: &str, column: &str) -> Diagnostic {
	Diagnostic {
		code: "SCHEMA_002".to_string(),
		message: format!("column '{}' is declared more than once in table '{}'", column, table),
		label: Some("duplicate column".to_string()),
		help: None,
		notes: vec![],
	}
}

/// SCHEMA_003: The column type is not one of the supported primitives
pub fn unsupported_type(column: &str, r#type: &str) -> Diagnostic {
	Diagnostic {
		code: "SCHEMA_003".to_string(),
		message: format!("column '{}' has unsupported type '{}'", column, r#type),
		label: None,
		help: Some("supported types are integer, float, string, boolean, datetime and date".to_string()),
		notes: vec![],
	}
}

/// SCHEMA_004: Column names must not be empty
pub fn empty_column_name(table: &str) -> Diagnostic {
	Diagnostic {
		code: "SCHEMA_004".to_string(),
		message: format!("table '{}' declares a column with an empty name", table),
		label: None,
		help: None,
		notes: vec![],
	}
}

/// BATCH_001: A schema column is absent from the batch
pub fn missing_column(table: &str, column: &str) -> Diagnostic {
	Diagnostic {
		code: "BATCH_001".to_string(),
		message: format!("batch for table '{}' is missing column '{}'", table, column),
		label: None,
		help: Some("every batch must carry all schema columns".to_string()),
		notes: vec![],
	}
}

/// BATCH_002: The batch carries a column the schema does not declare
pub fn unknown_column(table: &str, column: &str) -> Diagnostic {
	Diagnostic {
		code: "BATCH_002".to_string(),
		message: format!("table '{}' has no column '{}'", table, column),
		label: None,
		help: None,
		notes: vec!["the schema of a table cannot change after creation".to_string()],
	}
}

/// BATCH_003: A batch column has the wrong type
pub fn column_type_mismatch(table: &str, column: &str, expected: Type, actual: Type) -> Diagnostic {
	Diagnostic {
		code: "BATCH_003".to_string(),
		message: format!(
			"column '{}' of table '{}' expects {} values, batch carries {}",
			column, table, expected, actual
		),
		label: Some("type mismatch".to_string()),
		help: None,
		notes: vec![],
	}
}

/// BATCH_004: Batch columns differ in length
pub fn column_length_mismatch(table: &str, column: &str, expected: usize, actual: usize) -> Diagnostic {
	Diagnostic {
		code: "BATCH_004".to_string(),
		message: format!(
			"column '{}' of batch for table '{}' has {} values, expected {}",
			column, table, actual, expected
		),
		label: None,
		help: Some("all columns of a batch must have the same length".to_string()),
		notes: vec![],
	}
}

/// BATCH_005: A value cannot be interpreted as the column type
pub fn invalid_value(column: &str, r#type: Type, value: &str) -> Diagnostic {
	Diagnostic {
		code: "BATCH_005".to_string(),
		message: format!("value {} is not a valid {} for column '{}'", value, r#type, column),
		label: None,
		help: None,
		notes: vec![],
	}
}

/// BATCH_006: The batch payload has the wrong shape
pub fn malformed_batch(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "BATCH_006".to_string(),
		message: format!("malformed batch: {}", reason.into()),
		label: None,
		help: Some("send column-oriented data, e.g. {\"x\": [1, 2, 3]}".to_string()),
		notes: vec![],
	}
}
