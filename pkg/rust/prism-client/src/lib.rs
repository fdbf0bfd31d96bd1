// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod utils;
mod ws;

pub use prism_sub_server_ws::{
	CreateViewRequest, ErrorResponse, Request, RequestPayload, Response, ResponsePayload,
};
pub use prism_table::Schema;
pub use prism_type::{Error, ErrorKind, TableVersion};
pub use prism_view::{Delta, Frame, Replica, ViewConfig, ViewId};
pub use ws::WsClient;
