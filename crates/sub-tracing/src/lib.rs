// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod builder;
mod subsystem;

pub use builder::{TracingBuilder, TracingFormat};
pub use subsystem::TracingSubsystem;
