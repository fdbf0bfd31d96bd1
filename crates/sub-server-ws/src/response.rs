// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Server messages: responses echo the request `id`, pushes carry `id: null`.

use prism_table::Schema;
use prism_type::{Error, ErrorKind, TableVersion};
use prism_view::{Delta, ViewId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
	pub id: Option<String>,
	#[serde(flatten)]
	pub payload: ResponsePayload,
}

impl Response {
	pub fn reply(id: Option<String>, payload: ResponsePayload) -> Self {
		Self {
			id,
			payload,
		}
	}

	pub fn push(payload: ResponsePayload) -> Self {
		Self {
			id: None,
			payload,
		}
	}

	pub fn is_push(&self) -> bool {
		self.id.is_none()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ResponsePayload {
	ViewCreated {
		view_id: ViewId,
		snapshot: Delta,
	},
	ViewRemoved {
		view_id: ViewId,
	},
	Schema {
		table: String,
		schema: Schema,
	},
	Tables {
		names: Vec<String>,
	},
	TableSize {
		table: String,
		size: usize,
		version: TableVersion,
	},
	Updated {
		table: String,
		version: TableVersion,
	},
	ViewSnapshot {
		view_id: ViewId,
		snapshot: Delta,
	},
	ViewUpdate {
		view_id: ViewId,
		delta: Delta,
	},
	Error(ErrorResponse),
	SessionClosed {
		reason: String,
	},
}

impl ResponsePayload {
	pub fn error(view_id: Option<ViewId>, err: &Error) -> Self {
		ResponsePayload::Error(ErrorResponse {
			view_id,
			kind: err.kind(),
			code: err.code.clone(),
			message: err.message.clone(),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub view_id: Option<ViewId>,
	pub kind: ErrorKind,
	pub code: String,
	pub message: String,
}

#[cfg(test)]
mod tests {
	use prism_type::error::diagnostic::view::engine_compute;
	use serde_json::json;

	use super::*;

	#[test]
	fn test_push_has_null_id() {
		let response = Response::push(ResponsePayload::SessionClosed {
			reason: "bye".to_string(),
		});
		assert_eq!(
			serde_json::to_value(&response).unwrap(),
			json!({"id": null, "type": "session_closed", "payload": {"reason": "bye"}})
		);
	}

	#[test]
	fn test_error_carries_kind_and_view() {
		let err = Error(engine_compute(3, "boom"));
		let response = Response::push(ResponsePayload::error(Some(ViewId(3)), &err));
		let value = serde_json::to_value(&response).unwrap();
		assert_eq!(value["type"], "error");
		assert_eq!(value["payload"]["view_id"], 3);
		assert_eq!(value["payload"]["kind"], "EngineComputeError");
		assert_eq!(value["payload"]["code"], "VIEW_006");
	}

	#[test]
	fn test_response_decodes() {
		let text = r#"{"id":"4","type":"updated","payload":{"table":"t","version":2}}"#;
		let response: Response = serde_json::from_str(text).unwrap();
		assert_eq!(
			response,
			Response::reply(
				Some("4".to_string()),
				ResponsePayload::Updated {
					table: "t".to_string(),
					version: TableVersion(2),
				}
			)
		);
	}
}
