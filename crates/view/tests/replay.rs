// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Replaying the deltas a view emits over its first snapshot must reproduce a fresh
//! render of the table at the latest version, also when notifications go missing.

use std::sync::Arc;

use parking_lot::Mutex;
use prism_table::{RowBatch, Schema, Table, TableChange};
use prism_type::Type;
use prism_view::{Aggregate, Delta, FilterOperator, Replica, StandardViewEngine, View, ViewConfig, ViewId};
use proptest::prelude::*;
use serde_json::json;

type Rows = Vec<(i64, i64)>;

fn table() -> Table {
	Table::new("replay", Schema::new([("k", Type::Int), ("v", Type::Int), ("label", Type::Utf8)])).unwrap()
}

fn batch(rows: &Rows) -> RowBatch {
	RowBatch::new()
		.with_column("k", rows.iter().map(|(k, _)| *k).collect::<Vec<_>>())
		.with_column("v", rows.iter().map(|(_, v)| *v).collect::<Vec<_>>())
		.with_column("label", rows.iter().map(|(k, _)| format!("group-{}", k)).collect::<Vec<_>>())
}

fn configs() -> Vec<ViewConfig> {
	vec![
		ViewConfig::new(),
		ViewConfig::new().with_columns(["v", "k"]).with_filter("v", FilterOperator::GreaterThan, json!(0)),
		ViewConfig::new().with_filter("k", FilterOperator::In, json!([1, 3])),
		ViewConfig::new().with_columns(["k", "v"]).with_group_by("k"),
		ViewConfig::new()
			.with_group_by("label")
			.with_aggregate("v", Aggregate::Avg)
			.with_aggregate("k", Aggregate::Max),
		ViewConfig::new()
			.with_columns(["k", "v"])
			.with_group_by("k")
			.with_aggregate("v", Aggregate::Min)
			.with_filter("v", FilterOperator::LessThanOrEqual, json!(50)),
	]
}

/// Appends `before`, creates every view, appends `after`, and checks each replica.
/// Changes whose index is listed in `dropped` are never delivered.
fn check(before: Vec<Rows>, after: Vec<Rows>, dropped: Vec<usize>) -> Result<(), TestCaseError> {
	let table = table();
	for rows in &before {
		table.append(batch(rows)).unwrap();
	}

	let changes = Arc::new(Mutex::new(Vec::<TableChange>::new()));
	{
		let changes = changes.clone();
		table.subscribe(Arc::new(move |change: &TableChange| changes.lock().push(change.clone())));
	}

	let mut views = Vec::new();
	for (idx, config) in configs().into_iter().enumerate() {
		let (view, initial) = View::create(ViewId(idx as u64 + 1), table.clone(), config, &StandardViewEngine).unwrap();
		let mut replica = Replica::new();
		replica.apply(&initial).unwrap();
		views.push((view, replica));
	}

	for rows in &after {
		table.append(batch(rows)).unwrap();
	}

	for (idx, change) in changes.lock().iter().enumerate() {
		if dropped.contains(&idx) {
			continue;
		}
		for (view, replica) in views.iter_mut() {
			if let Some(delta) = view.on_table_changed(change).unwrap() {
				replica.apply(&delta).unwrap();
			}
		}
	}

	let delivered = changes
		.lock()
		.iter()
		.enumerate()
		.filter(|(idx, _)| !dropped.contains(idx))
		.map(|(_, change)| change.new_version)
		.last();
	if !after.is_empty() && delivered != Some(table.version()) {
		return Ok(());
	}

	for (view, replica) in &views {
		let (_, fresh) = View::create(ViewId(99), table.clone(), view.config().clone(), &StandardViewEngine).unwrap();
		let Delta::Snapshot {
			frame,
			..
		} = fresh
		else {
			panic!("a new view starts with a snapshot");
		};
		prop_assert_eq!(replica.version(), table.version());
		prop_assert_eq!(replica.frame(), &frame);
	}

	Ok(())
}

fn rows() -> impl Strategy<Value = Rows> {
	prop::collection::vec((0i64..5, -100i64..100), 0..12)
}

proptest! {
	#[test]
	fn replay_matches_fresh_render(
		before in prop::collection::vec(rows(), 0..4),
		after in prop::collection::vec(rows(), 0..8),
	) {
		check(before, after, Vec::new())?;
	}

	#[test]
	fn replay_recovers_from_missed_changes(
		before in prop::collection::vec(rows(), 0..3),
		after in prop::collection::vec(rows(), 2..8),
		dropped in prop::collection::vec(0usize..8, 1..3),
	) {
		check(before, after, dropped)?;
	}
}
