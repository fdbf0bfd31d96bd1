// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod fixture;
pub mod network;
pub mod util;

pub use util::wait::{wait_for, wait_for_blocking, wait_for_condition};
