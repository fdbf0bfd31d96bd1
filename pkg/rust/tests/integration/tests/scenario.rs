// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use prism::{ErrorKind, RowBatch, TableVersion};
use prism_client::{Replica, ResponsePayload, ViewConfig};
use prism_integration_tests::{TABLE, connect, next_delta, next_push, start_server};
use prism_testing::{fixture::int_values, wait_for};
use serde_json::json;

#[tokio::test]
async fn test_view_over_growing_table() {
	let mut server = start_server().await;
	let table = server.tables().get(TABLE).unwrap();

	assert_eq!(table.append(RowBatch::new().with_column("x", (0..10).collect::<Vec<i64>>())).unwrap(), TableVersion(1));

	let mut client = connect(&server).await;
	let (view_id, snapshot) = client.create_view(TABLE, ViewConfig::new()).await.unwrap();
	assert!(snapshot.is_snapshot());
	assert_eq!(snapshot.version(), TableVersion(1));

	let mut replica = Replica::new();
	replica.apply(&snapshot).unwrap();
	assert_eq!(int_values(replica.frame(), "x"), (0..10).collect::<Vec<_>>());

	assert_eq!(table.append(RowBatch::new().with_column("x", (10..20).collect::<Vec<i64>>())).unwrap(), TableVersion(2));

	let delta = next_delta(&mut client, view_id).await;
	assert!(!delta.is_snapshot());
	assert_eq!(delta.version(), TableVersion(2));
	replica.apply(&delta).unwrap();
	assert_eq!(replica.frame().row_count(), 20);
	assert_eq!(int_values(replica.frame(), "x"), (0..20).collect::<Vec<_>>());

	client.close().await.unwrap();
	let ws = server.ws().unwrap();
	wait_for(|| ws.session_count() == 0, "session was never released").await;

	assert_eq!(table.size(), 20);
	assert_eq!(table.listener_count(), 0);

	server.stop().await.unwrap();
}

#[tokio::test]
async fn test_client_updates_reach_other_sessions() {
	let mut server = start_server().await;

	let mut viewer = connect(&server).await;
	let writer = connect(&server).await;

	let config = ViewConfig::new().with_group_by("x");
	let (view_id, snapshot) = viewer.create_view(TABLE, config.clone()).await.unwrap();
	let mut replica = Replica::new();
	replica.apply(&snapshot).unwrap();

	assert_eq!(writer.update(TABLE, json!({"x": [1, 1, 2]})).await.unwrap(), TableVersion(1));
	assert_eq!(writer.update(TABLE, json!([{"x": 2}, {"x": 3}])).await.unwrap(), TableVersion(2));

	for _ in 0..2 {
		let delta = next_delta(&mut viewer, view_id).await;
		replica.apply(&delta).unwrap();
	}

	let (_, fresh) = writer.create_view(TABLE, config).await.unwrap();
	let mut expected = Replica::new();
	expected.apply(&fresh).unwrap();
	assert_eq!(replica.version(), TableVersion(2));
	assert_eq!(replica.frame(), expected.frame());

	let current = viewer.view_snapshot(view_id).await.unwrap();
	assert_eq!(current.version(), TableVersion(2));

	assert_eq!(writer.table_size(TABLE).await.unwrap(), (5, TableVersion(2)));
	server.stop().await.unwrap();
}

#[tokio::test]
async fn test_request_errors_leave_session_usable() {
	let mut server = start_server().await;
	let client = connect(&server).await;

	let err = client.create_view("missing", ViewConfig::new()).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::TableNotFound);

	let err = client.update(TABLE, json!({"x": ["not a number"]})).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
	assert_eq!(server.tables().current_version(TABLE).unwrap(), TableVersion(0));

	let err = client.create_view(TABLE, ViewConfig::new().with_columns(["y"])).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidViewConfig);

	assert_eq!(client.list_tables().await.unwrap(), vec![TABLE.to_string()]);
	let schema = client.get_schema(TABLE).await.unwrap();
	assert_eq!(schema.names().collect::<Vec<_>>(), vec!["x"]);

	server.stop().await.unwrap();
}

#[tokio::test]
async fn test_server_stop_notifies_sessions() {
	let mut server = start_server().await;
	let mut client = connect(&server).await;
	client.create_view(TABLE, ViewConfig::new()).await.unwrap();

	server.stop().await.unwrap();

	let push = next_push(&mut client).await;
	assert!(matches!(push.payload, ResponsePayload::SessionClosed { .. }));
	assert_eq!(server.tables().get(TABLE).unwrap().listener_count(), 0);
}
