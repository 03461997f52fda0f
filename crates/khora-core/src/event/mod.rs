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

//! Event-driven notification of request progress.
//!
//! The resolver publishes a [`DataEvent`] whenever a request changes state.
//! Consumers waiting on a request can block on the channel (and race it
//! against their own cancellation) instead of polling the record container.

mod bus;

pub use self::bus::EventBus;

use crate::address::Address;
use crate::record::RecordId;

/// A state change of a data request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEvent {
    /// The request's record.
    pub record: RecordId,
    /// The requested address.
    pub address: Address,
    /// What happened.
    pub kind: DataEventKind,
}

/// The kind of state change carried by a [`DataEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEventKind {
    /// The request entered `Loading`, either for the first time or after a version bump.
    Loading,
    /// The data was found by the named provider and queued for writing.
    Loaded {
        /// Strategy name of the provider that served the data.
        provider: &'static str,
    },
    /// The request timed out.
    NotFound,
}
