// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Subsystem API crate providing the common lifecycle interface for Prism subsystems.
//!
//! A server is assembled from subsystems (tracing, the producer loop, the WebSocket
//! server). Each one is started in registration order and stopped in reverse order.

pub mod subsystem;

pub use subsystem::{HealthStatus, Subsystem};
