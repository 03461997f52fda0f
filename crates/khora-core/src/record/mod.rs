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

//! The contract between the resolver and the host's live record container.
//!
//! The host owns its records. The resolver only ever sees them through
//! [`RecordStore`]: it enumerates requests and sources while scanning, and
//! later hands back an [`Operation`] per record to be applied in one batch.

mod edit;

pub use edit::*;

use crate::address::Address;
use crate::error::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A unique identifier for a record in the host container.
///
/// It combines an index with a generation count to solve the "ABA problem".
/// When a record is removed, its index can be recycled for a new record, but
/// the generation is incremented so that stale ids never reach the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    /// The slot index of the record in its container.
    pub index: u32,
    /// A generation counter that is incremented each time the index is recycled.
    pub generation: u32,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// The lifecycle state of a data request.
///
/// ```text
/// Awaiting -> Loading -> Loaded
///                    \-> NotFound
/// Loaded | NotFound -> Loading   (when the request's version changes)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Created by a caller, not yet observed by the resolver.
    #[default]
    Awaiting,
    /// Being resolved; the resolver keeps trying until the timeout elapses.
    Loading,
    /// The data was found and written into the request's record.
    Loaded,
    /// No provider produced the data before the timeout.
    NotFound,
}

impl RequestStatus {
    /// Returns `true` for the terminal states `Loaded` and `NotFound`.
    pub fn is_settled(self) -> bool {
        matches!(self, RequestStatus::Loaded | RequestStatus::NotFound)
    }
}

/// The data-version marker written onto a record every time data is loaded into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datum {
    /// Starts at 1 on the first load and increases with every reload.
    pub revision: u32,
    /// The address the data was requested with.
    pub address: Address,
}

/// A view of a record tagged as a data request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRecord {
    /// The record holding the request.
    pub id: RecordId,
    /// The requested address (may be a pattern).
    pub address: Address,
    /// The current status.
    pub status: RequestStatus,
    /// Bumped by callers to force re-resolution.
    pub version: u32,
    /// How long resolution may keep failing before the request is `NotFound`.
    pub timeout: Duration,
}

/// A view of a record tagged as a data source.
#[derive(Debug, Clone, Copy)]
pub struct SourceRecord<'a> {
    /// The record holding the data.
    pub id: RecordId,
    /// The stored address the source is published under.
    pub address: Address,
    /// The current payload.
    pub bytes: &'a [u8],
}

/// The host's live record container, as seen by the resolver.
///
/// Enumeration takes `&self` and application takes `&mut self`, so no edit can
/// ever land while a scan is iterating.
pub trait RecordStore {
    /// Enumerates enabled records tagged as requests.
    fn requests(&self) -> Box<dyn Iterator<Item = RequestRecord> + '_>;

    /// Enumerates enabled records tagged as sources that currently hold bytes.
    fn sources(&self) -> Box<dyn Iterator<Item = SourceRecord<'_>> + '_>;

    /// Returns `true` if the record is still alive.
    fn contains(&self, id: RecordId) -> bool;

    /// Returns `true` if the record already owns a byte buffer.
    fn has_bytes(&self, id: RecordId) -> bool;

    /// Returns the record's data-version marker, if any.
    fn datum(&self, id: RecordId) -> Option<Datum>;

    /// Applies every edit of an operation to its target record, in order.
    ///
    /// # Errors
    /// Returns [`ResolveError::StaleRecord`] if the target no longer exists.
    fn apply(&mut self, operation: Operation) -> Result<(), ResolveError>;
}
