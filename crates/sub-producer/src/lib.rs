// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Producer loop: a dedicated thread that appends a batch to a table on a fixed cadence.
//!
//! The loop only ever calls [`Table::append`](prism_table::Table::append), so it shares
//! nothing with viewer sessions except the table and its update feed.

mod config;
mod source;
mod subsystem;
mod worker;

pub use config::ProducerConfig;
pub use source::{BatchSource, SequenceSource};
pub use subsystem::ProducerSubsystem;
