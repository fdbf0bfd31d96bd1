// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared setup for the end-to-end tests.

use std::time::Duration;

use prism::{Schema, Server, ServerBuilder, Type, WsConfig};
use prism_client::{Delta, Response, ResponsePayload, ViewId, WsClient};
use tokio::time::timeout;

pub const TABLE: &str = "data_source_one";

/// A server with an empty `data_source_one {x: integer}` table, listening on an
/// ephemeral loopback port.
pub async fn start_server() -> Server {
	let mut server = ServerBuilder::new()
		.with_table(TABLE, Schema::new([("x", Type::Int)]))
		.with_ws(WsConfig::new().bind_addr("127.0.0.1:0").shutdown_timeout(Duration::from_secs(5)))
		.build()
		.expect("failed to build server");
	server.start().await.expect("failed to start server");
	server
}

pub async fn connect(server: &Server) -> WsClient {
	let url = server.ws().and_then(|ws| ws.url()).expect("server has no websocket listener");
	WsClient::connect(&url).await.expect("failed to connect")
}

/// The next push, failing the test after five seconds.
pub async fn next_push(client: &mut WsClient) -> Response {
	timeout(Duration::from_secs(5), client.recv())
		.await
		.expect("timed out waiting for a push")
		.expect("connection closed")
}

/// The next `view_update` for `view_id`.
pub async fn next_delta(client: &mut WsClient, view_id: ViewId) -> Delta {
	loop {
		let push = next_push(client).await;
		match push.payload {
			ResponsePayload::ViewUpdate {
				view_id: id,
				delta,
			} if id == view_id => return delta,
			ResponsePayload::Error(err) => panic!("unexpected error push: {:?}", err),
			_ => {}
		}
	}
}
