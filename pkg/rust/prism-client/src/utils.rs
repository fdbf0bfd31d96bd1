// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

/// Generate a unique request ID
pub(crate) fn generate_request_id() -> String {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let count = COUNTER.fetch_add(1, Ordering::Relaxed);
	let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default();

	format!("{}-{}", timestamp, count)
}
