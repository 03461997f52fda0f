// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Lane Abstraction
//!
//! The base trait for swappable strategies driven by agents.
//!
//! A **Lane** encapsulates one algorithmic approach to a task. Agents own an
//! ordered set of lanes and decide which to run; lanes themselves hold no
//! per-tick state. Domain-specific traits (such as the data providers in
//! `khora-lanes`) extend [`Lane`] with their execution method.
//!
//! ```rust,ignore
//! use khora_core::lane::{Lane, LaneKind};
//!
//! struct MyProvider;
//!
//! impl Lane for MyProvider {
//!     fn strategy_name(&self) -> &'static str { "MyProvider" }
//!     fn lane_kind(&self) -> LaneKind { LaneKind::Memory }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
//! }
//! ```

use std::any::Any;
use std::fmt;

/// Classification of lanes by where they fetch their data from.
///
/// Agents use this for logging and cost estimation; a lane's kind never
/// changes its place in an agent's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Data already resident in process memory.
    Memory,
    /// Data held by records in the host container.
    Container,
    /// Data behind blocking external I/O.
    Io,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Memory => write!(f, "Memory"),
            LaneKind::Container => write!(f, "Container"),
            LaneKind::Io => write!(f, "I/O"),
        }
    }
}

/// Base trait for all lane types.
pub trait Lane: Send + Sync {
    /// Human-readable name identifying this lane's strategy.
    ///
    /// Used for logging and reported alongside the data a lane produced.
    fn strategy_name(&self) -> &'static str;

    /// The kind of source this lane reads from.
    fn lane_kind(&self) -> LaneKind;

    /// Relative cost of running this lane once. Higher is more expensive.
    fn estimate_cost(&self) -> f32 {
        match self.lane_kind() {
            LaneKind::Memory => 0.1,
            LaneKind::Container => 1.0,
            LaneKind::Io => 10.0,
        }
    }

    /// Downcast to a concrete type for type-specific operations.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to a concrete type (mutable) for type-specific operations.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
