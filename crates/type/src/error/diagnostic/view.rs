// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;
use crate::value::Type;

/// VIEW_001: The view references a column the table does not have
pub fn unknown_column(table: &str, column: &str) -> Diagnostic {
	Diagnostic {
		code: "VIEW_001".to_string(),
		message: format!("view references unknown column '{}' of table '{}'", column, table),
		label: None,
		help: Some("request the table schema to see the available columns".to_string()),
		notes: vec![],
	}
}

/// VIEW_002: A filter clause cannot be evaluated
pub fn invalid_filter(column: &str, operator: &str, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "VIEW_002".to_string(),
		message: format!("invalid filter on '{}' with operator '{}': {}", column, operator, reason.into()),
		label: None,
		help: Some("filters take the form [column, operator, value]".to_string()),
		notes: vec![],
	}
}

/// VIEW_003: The aggregate does not apply to the column type
pub fn aggregate_not_applicable(column: &str, aggregate: &str, r#type: Type) -> Diagnostic {
	Diagnostic {
		code: "VIEW_003".to_string(),
		message: format!("aggregate '{}' cannot be applied to {} column '{}'", aggregate, r#type, column),
		label: None,
		help: Some("sum and avg need numeric columns".to_string()),
		notes: vec![],
	}
}

/// VIEW_004: The view configuration is inconsistent
pub fn invalid_config(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "VIEW_004".to_string(),
		message: format!("invalid view configuration: {}", reason.into()),
		label: None,
		help: None,
		notes: vec![],
	}
}

/// VIEW_005: The session owns no view with this id
pub fn view_not_found(view_id: u64) -> Diagnostic {
	Diagnostic {
		code: "VIEW_005".to_string(),
		message: format!("view {} not found", view_id),
		label: None,
		help: Some("the view may have been removed or closed after an engine error".to_string()),
		notes: vec![],
	}
}

/// VIEW_006: The engine failed while maintaining a view
pub fn engine_compute(view_id: u64, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "VIEW_006".to_string(),
		message: format!("view {} failed to update: {}", view_id, reason.into()),
		label: None,
		help: Some("the view has been closed, create a new one to continue".to_string()),
		notes: vec![],
	}
}

/// VIEW_007: A view observed a change that does not follow its last version
pub fn version_gap(expected: u64, actual: u64) -> Diagnostic {
	Diagnostic {
		code: "VIEW_007".to_string(),
		message: format!("expected change from version {}, received change from version {}", expected, actual),
		label: None,
		help: None,
		notes: vec!["recovered by a full re-snapshot".to_string()],
	}
}
