// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Client requests.
//!
//! Every request is a JSON object `{"id": "...", "type": "<snake_case>", "payload": {...}}`.
//! The `id` is echoed on the response so clients can correlate them.

use prism_type::{Error, error::diagnostic::session::bad_request};
use prism_view::{ViewConfig, ViewId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(flatten)]
	pub payload: RequestPayload,
}

impl Request {
	pub fn new(id: impl Into<String>, payload: RequestPayload) -> Self {
		Self {
			id: Some(id.into()),
			payload,
		}
	}

	/// Parses a text frame. A missing or `null` payload counts as `{}`.
	///
	/// On failure the request id is returned alongside the error when it could be
	/// recovered, so the error response still correlates.
	pub fn decode(text: &str) -> Result<Request, (Option<String>, Error)> {
		let mut value: Value =
			serde_json::from_str(text).map_err(|e| (None, Error(bad_request(format!("invalid JSON: {}", e)))))?;

		let Some(object) = value.as_object_mut() else {
			return Err((None, Error(bad_request("a request must be a JSON object"))));
		};

		let id = object.get("id").and_then(Value::as_str).map(str::to_string);
		let payload = object.entry("payload").or_insert_with(|| Value::Object(Map::new()));
		if payload.is_null() {
			*payload = Value::Object(Map::new());
		}

		serde_json::from_value(value).map_err(|e| (id, Error(bad_request(e.to_string()))))
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RequestPayload {
	CreateView(CreateViewRequest),
	RemoveView(RemoveViewRequest),
	GetSchema(GetSchemaRequest),
	ListTables(ListTablesRequest),
	TableSize(TableSizeRequest),
	Update(UpdateRequest),
	ViewSnapshot(ViewSnapshotRequest),
	Close(CloseRequest),
}

impl RequestPayload {
	pub fn name(&self) -> &'static str {
		match self {
			RequestPayload::CreateView(_) => "create_view",
			RequestPayload::RemoveView(_) => "remove_view",
			RequestPayload::GetSchema(_) => "get_schema",
			RequestPayload::ListTables(_) => "list_tables",
			RequestPayload::TableSize(_) => "table_size",
			RequestPayload::Update(_) => "update",
			RequestPayload::ViewSnapshot(_) => "view_snapshot",
			RequestPayload::Close(_) => "close",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateViewRequest {
	pub table: String,
	#[serde(default)]
	pub config: ViewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveViewRequest {
	pub view_id: ViewId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSchemaRequest {
	pub table: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListTablesRequest {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSizeRequest {
	pub table: String,
}

/// Appends rows. `data` is either `{"column": [values...]}` or `[{"column": value}, ...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
	pub table: String,
	pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshotRequest {
	pub view_id: ViewId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloseRequest {}

#[cfg(test)]
mod tests {
	use prism_type::ErrorKind;
	use prism_view::FilterOperator;
	use serde_json::json;

	use super::*;

	#[test]
	fn test_decode_create_view() {
		let text = r#"{"id":"1","type":"create_view","payload":{"table":"t","config":{"columns":["x"],"filter":[["x",">",3]]}}}"#;
		let request = Request::decode(text).unwrap();
		assert_eq!(request.id.as_deref(), Some("1"));
		assert_eq!(
			request.payload,
			RequestPayload::CreateView(CreateViewRequest {
				table: "t".to_string(),
				config: ViewConfig::new().with_columns(["x"]).with_filter("x", FilterOperator::GreaterThan, json!(3)),
			})
		);
	}

	#[test]
	fn test_decode_without_payload() {
		let request = Request::decode(r#"{"id":"2","type":"list_tables"}"#).unwrap();
		assert_eq!(request.payload, RequestPayload::ListTables(ListTablesRequest {}));

		let request = Request::decode(r#"{"id":"3","type":"close","payload":null}"#).unwrap();
		assert_eq!(request.payload, RequestPayload::Close(CloseRequest {}));
	}

	#[test]
	fn test_decode_unknown_type_keeps_id() {
		let (id, err) = Request::decode(r#"{"id":"7","type":"drop_table","payload":{}}"#).unwrap_err();
		assert_eq!(id.as_deref(), Some("7"));
		assert_eq!(err.kind(), ErrorKind::BadRequest);
	}

	#[test]
	fn test_decode_garbage() {
		let (id, err) = Request::decode("not json").unwrap_err();
		assert_eq!(id, None);
		assert_eq!(err.kind(), ErrorKind::BadRequest);

		let (_, err) = Request::decode("[1, 2]").unwrap_err();
		assert_eq!(err.kind(), ErrorKind::BadRequest);
	}

	#[test]
	fn test_encode_matches_wire_shape() {
		let request = Request::new(
			"9",
			RequestPayload::RemoveView(RemoveViewRequest {
				view_id: ViewId(4),
			}),
		);
		assert_eq!(
			serde_json::to_value(&request).unwrap(),
			json!({"id": "9", "type": "remove_view", "payload": {"view_id": 4}})
		);
	}
}
