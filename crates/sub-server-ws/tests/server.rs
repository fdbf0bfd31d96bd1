// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use prism_sub_api::Subsystem;
use prism_sub_server_ws::{Response, ResponsePayload, WsConfig, WsSubsystem};
use prism_table::TableRegistry;
use prism_testing::{
	fixture::{int_batch, int_table},
	wait_for,
};
use prism_type::TableVersion;
use prism_view::StandardViewEngine;
use serde_json::json;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start(tables: &TableRegistry) -> WsSubsystem {
	let config = WsConfig::new().bind_addr("127.0.0.1:0").shutdown_timeout(Duration::from_secs(5));
	let mut ws = WsSubsystem::new(config, tables.clone(), Arc::new(StandardViewEngine));
	ws.start().await.unwrap();
	ws
}

async fn send(client: &mut Client, request: serde_json::Value) {
	client.send(Message::Text(request.to_string().into())).await.unwrap();
}

async fn next(client: &mut Client) -> Response {
	loop {
		let message = timeout(Duration::from_secs(5), client.next()).await.unwrap().unwrap().unwrap();
		if let Message::Text(text) = message {
			return serde_json::from_str(&text).unwrap();
		}
	}
}

#[tokio::test]
async fn test_view_follows_appends() {
	let tables = TableRegistry::new();
	let table = int_table(&tables, "data_source_one");
	table.append(int_batch(0..10)).unwrap();

	let mut ws = start(&tables).await;
	let (mut client, _) = connect_async(ws.url().unwrap()).await.unwrap();

	send(&mut client, json!({"id": "1", "type": "create_view", "payload": {"table": "data_source_one"}})).await;
	let created = next(&mut client).await;
	assert_eq!(created.id.as_deref(), Some("1"));
	let ResponsePayload::ViewCreated {
		snapshot,
		..
	} = created.payload
	else {
		panic!("expected view_created, got {:?}", created.payload);
	};
	assert_eq!(snapshot.version(), TableVersion(1));

	table.append(int_batch(10..20)).unwrap();
	let update = next(&mut client).await;
	assert!(update.is_push());
	let ResponsePayload::ViewUpdate {
		delta,
		..
	} = update.payload
	else {
		panic!("expected view_update, got {:?}", update.payload);
	};
	assert_eq!(delta.version(), TableVersion(2));

	send(&mut client, json!({"id": "2", "type": "close"})).await;
	let closed = next(&mut client).await;
	assert_eq!(closed.id.as_deref(), Some("2"));
	assert!(matches!(closed.payload, ResponsePayload::SessionClosed { .. }));

	wait_for(|| ws.session_count() == 0, "session was never removed").await;
	assert_eq!(table.listener_count(), 0);
	assert_eq!(table.size(), 20);

	ws.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_wrong_path_is_rejected() {
	let tables = TableRegistry::new();
	let mut ws = start(&tables).await;

	let url = format!("ws://{}/elsewhere", ws.local_addr().unwrap());
	assert!(connect_async(url).await.is_err());
	assert_eq!(ws.session_count(), 0);

	ws.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_sessions() {
	let tables = TableRegistry::new();
	let table = int_table(&tables, "t");
	let mut ws = start(&tables).await;

	let (mut client, _) = connect_async(ws.url().unwrap()).await.unwrap();
	send(&mut client, json!({"id": "1", "type": "create_view", "payload": {"table": "t"}})).await;
	next(&mut client).await;
	assert_eq!(table.listener_count(), 1);

	ws.shutdown().await.unwrap();
	assert!(!ws.is_running());

	let closed = next(&mut client).await;
	assert_eq!(
		closed.payload,
		ResponsePayload::SessionClosed {
			reason: "server shutting down".to_string(),
		}
	);
	assert_eq!(table.listener_count(), 0);
	assert_eq!(ws.active_connections(), 0);
}

#[tokio::test]
async fn test_malformed_request_keeps_connection() {
	let tables = TableRegistry::new();
	int_table(&tables, "t");
	let mut ws = start(&tables).await;
	let (mut client, _) = connect_async(ws.url().unwrap()).await.unwrap();

	client.send(Message::Text("{oops".into())).await.unwrap();
	let error = next(&mut client).await;
	assert!(matches!(error.payload, ResponsePayload::Error(_)));

	send(&mut client, json!({"id": "2", "type": "list_tables"})).await;
	let tables_response = next(&mut client).await;
	assert_eq!(
		tables_response.payload,
		ResponsePayload::Tables {
			names: vec!["t".to_string()],
		}
	);

	ws.shutdown().await.unwrap();
}
