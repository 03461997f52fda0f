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

//! # Khora Core
//!
//! Foundational crate containing the types and interface contracts of the
//! data resolution subsystem: addresses and their matching rules, the record
//! container contract consumed from the host, deferred edit operations, and
//! the agent/lane traits the higher-level crates implement.

#![warn(missing_docs)]

pub mod address;
pub mod agent;
pub mod context;
pub mod error;
pub mod event;
pub mod lane;
pub mod record;

pub use address::{Address, DataReference};
pub use context::EngineContext;
pub use error::{ResolveError, ResolveResult};
