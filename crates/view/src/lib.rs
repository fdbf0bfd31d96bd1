// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Views over versioned tables.
//!
//! A [`View`] is bound to one [`Table`](prism_table::Table) and renders it through a
//! [`ViewEngine`] into a [`Frame`]. After the initial [`Delta::Snapshot`], every
//! [`TableChange`](prism_table::TableChange) is turned into a [`Delta::Patch`] that takes
//! the previous render to the next one. A [`Replica`] replays deltas the way a client does.

mod config;
mod delta;
pub mod engine;
mod frame;
mod view;

pub use config::{Aggregate, Filter, FilterOperator, ViewConfig};
pub use delta::{Delta, Replica};
pub use engine::{Changes, StandardViewEngine, ViewEngine, ViewState};
pub use frame::{Frame, FrameColumn};
pub use view::{View, ViewId};
