// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! WebSocket server subsystem for Prism.
//!
//! Every connection is a viewer session. Clients create views over registered tables
//! and receive the initial snapshot followed by one `view_update` per applied batch.
//!
//! # Message Protocol
//!
//! Requests are JSON objects, responses echo their `id`:
//!
//! ```json
//! {"id": "1", "type": "create_view", "payload": {"table": "data_source_one", "config": {}}}
//! {"id": "1", "type": "view_created", "payload": {"view_id": 1, "snapshot": {...}}}
//! ```
//!
//! Server pushes (`view_update`, `error`, `session_closed`) carry `"id": null`.

mod config;
mod error;
pub mod handler;
pub mod protocol;
pub mod response;
pub mod session;
mod state;
pub mod subsystem;

pub use config::WsConfig;
pub use error::ConnectionError;
pub use handler::handle_connection;
pub use protocol::{
	CloseRequest, CreateViewRequest, GetSchemaRequest, ListTablesRequest, RemoveViewRequest, Request,
	RequestPayload, TableSizeRequest, UpdateRequest, ViewSnapshotRequest,
};
pub use response::{ErrorResponse, Response, ResponsePayload};
pub use session::{Mailbox, MailboxEvent, Session, SessionId, SessionRegistry, SessionState};
pub use state::WsState;
pub use subsystem::WsSubsystem;
