// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Barrier, thread};

use prism::{RowBatch, TableVersion};
use prism_client::{Replica, ViewConfig};
use prism_integration_tests::{TABLE, connect, next_delta, start_server};
use prism_testing::fixture::int_values;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_producers_append_concurrently() {
	let mut server = start_server().await;
	let table = server.tables().get(TABLE).unwrap();

	let mut client = connect(&server).await;
	let (view_id, snapshot) = client.create_view(TABLE, ViewConfig::new()).await.unwrap();
	let mut replica = Replica::new();
	replica.apply(&snapshot).unwrap();

	let barrier = Barrier::new(2);
	thread::scope(|scope| {
		for rows in [0i64..5, 100..103] {
			let table = table.clone();
			let barrier = &barrier;
			scope.spawn(move || {
				barrier.wait();
				table.append(RowBatch::new().with_column("x", rows.collect::<Vec<_>>())).unwrap();
			});
		}
	});

	assert_eq!(table.size(), 8);
	assert_eq!(table.version(), TableVersion(2));

	for _ in 0..2 {
		let delta = next_delta(&mut client, view_id).await;
		replica.apply(&delta).unwrap();
	}
	assert_eq!(replica.version(), TableVersion(2));

	let mut values = int_values(replica.frame(), "x");
	values.sort();
	assert_eq!(values, vec![0, 1, 2, 3, 4, 100, 101, 102]);

	// Each batch lands contiguously.
	let values = int_values(replica.frame(), "x");
	let first_batch_at = values.iter().position(|&x| x == 0).unwrap();
	assert_eq!(&values[first_batch_at..first_batch_at + 5], &[0, 1, 2, 3, 4]);

	server.stop().await.unwrap();
}
