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

//! A reference implementation of the host record container.
//!
//! [`RecordWorld`] is a plain slot store: each record optionally carries a
//! request, a source tag, a byte buffer and a data-version marker. Hosts with
//! their own container implement [`RecordStore`] for it instead.

mod store;

use khora_core::address::Address;
use khora_core::error::ResolveError;
use khora_core::record::{
    Datum, Edit, Operation, RecordId, RecordStore, RequestRecord, RequestStatus, SourceRecord,
};
use std::time::Duration;
use store::SlotStore;

/// Marks a record as wanting the data at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRequest {
    /// The requested address (may be a pattern).
    pub address: Address,
    /// Written by the resolver through deferred edits.
    pub status: RequestStatus,
    /// Bump to force the resolver to fetch the data again.
    pub version: u32,
    /// How long resolution may keep failing before the request is `NotFound`.
    pub timeout: Duration,
}

impl DataRequest {
    /// Timeout used when none is given.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates an `Awaiting` request with the default timeout.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            status: RequestStatus::Awaiting,
            version: 0,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Publishes a record's byte buffer under `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSource {
    /// The stored address other records can request.
    pub address: Address,
}

impl DataSource {
    /// Creates a source tag.
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

/// A single record of the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Present if the record is a data request.
    pub request: Option<DataRequest>,
    /// Present if the record publishes its bytes.
    pub source: Option<DataSource>,
    /// The record's byte payload.
    pub bytes: Option<Vec<u8>>,
    /// Written by the resolver each time data is loaded into the record.
    pub datum: Option<Datum>,
    /// Disabled records are invisible to the resolver.
    pub enabled: bool,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            request: None,
            source: None,
            bytes: None,
            datum: None,
            enabled: true,
        }
    }
}

impl Record {
    /// Creates an empty, enabled record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a request.
    pub fn with_request(mut self, request: DataRequest) -> Self {
        self.request = Some(request);
        self
    }

    /// Attaches a source tag.
    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Attaches a byte buffer.
    pub fn with_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.bytes = Some(bytes.into());
        self
    }

    fn apply(&mut self, edit: Edit) {
        match edit {
            Edit::CreateBuffer(bytes) => self.bytes = Some(bytes),
            Edit::ResizeBuffer(len) => self.bytes.get_or_insert_with(Vec::new).resize(len, 0),
            Edit::SetBytes { offset, bytes } => {
                let buffer = self.bytes.get_or_insert_with(Vec::new);
                let end = offset + bytes.len();
                if buffer.len() < end {
                    buffer.resize(end, 0);
                }
                buffer[offset..end].copy_from_slice(&bytes);
            }
            Edit::SetStatus(status) => match self.request.as_mut() {
                Some(request) => request.status = status,
                None => log::warn!("Ignoring status {status:?} for a record without a request"),
            },
            Edit::AddDatum(datum) | Edit::SetDatum(datum) => self.datum = Some(datum),
        }
    }
}

/// The central container for all records.
#[derive(Debug, Clone, Default)]
pub struct RecordWorld {
    records: SlotStore,
}

impl RecordWorld {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record and returns its id.
    pub fn spawn(&mut self, record: Record) -> RecordId {
        self.records.insert(record)
    }

    /// Adds a record holding only a request.
    pub fn spawn_request(&mut self, request: DataRequest) -> RecordId {
        self.spawn(Record::new().with_request(request))
    }

    /// Adds a record publishing `bytes` under `address`.
    pub fn spawn_source(&mut self, address: Address, bytes: impl Into<Vec<u8>>) -> RecordId {
        self.spawn(
            Record::new()
                .with_source(DataSource::new(address))
                .with_bytes(bytes),
        )
    }

    /// Removes a record. Returns `true` if it existed.
    pub fn despawn(&mut self, id: RecordId) -> bool {
        self.records.remove(id).is_some()
    }

    /// Returns a record if it is alive.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    /// Returns a mutable record if it is alive.
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    /// Returns the record's request.
    pub fn request(&self, id: RecordId) -> Option<&DataRequest> {
        self.get(id)?.request.as_ref()
    }

    /// Returns the status of the record's request.
    pub fn status(&self, id: RecordId) -> Option<RequestStatus> {
        self.request(id).map(|request| request.status)
    }

    /// Returns the record's bytes.
    pub fn bytes(&self, id: RecordId) -> Option<&[u8]> {
        self.get(id)?.bytes.as_deref()
    }

    /// Returns the record's bytes as UTF-8 text, if they are valid UTF-8.
    pub fn read_utf8(&self, id: RecordId) -> Option<&str> {
        std::str::from_utf8(self.bytes(id)?).ok()
    }

    /// Replaces the record's bytes. Returns `false` if the record is dead.
    pub fn write_bytes(&mut self, id: RecordId, bytes: impl Into<Vec<u8>>) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.bytes = Some(bytes.into());
                true
            }
            None => false,
        }
    }

    /// Replaces the record's bytes with UTF-8 text.
    pub fn write_utf8(&mut self, id: RecordId, text: &str) -> bool {
        self.write_bytes(id, text.as_bytes())
    }

    /// Increments the request's version, forcing re-resolution. Returns the new version.
    pub fn bump_version(&mut self, id: RecordId) -> Option<u32> {
        let request = self.get_mut(id)?.request.as_mut()?;
        request.version = request.version.wrapping_add(1);
        Some(request.version)
    }

    /// Enables or disables a record. Returns `false` if the record is dead.
    pub fn set_enabled(&mut self, id: RecordId, enabled: bool) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Iterates over alive records.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.records.iter()
    }

    /// Number of alive records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the world holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for RecordWorld {
    fn requests(&self) -> Box<dyn Iterator<Item = RequestRecord> + '_> {
        Box::new(self.iter().filter(|(_, record)| record.enabled).filter_map(
            |(id, record)| {
                record.request.map(|request| RequestRecord {
                    id,
                    address: request.address,
                    status: request.status,
                    version: request.version,
                    timeout: request.timeout,
                })
            },
        ))
    }

    fn sources(&self) -> Box<dyn Iterator<Item = SourceRecord<'_>> + '_> {
        Box::new(self.iter().filter(|(_, record)| record.enabled).filter_map(
            |(id, record)| {
                let source = record.source?;
                let bytes = record.bytes.as_deref()?;
                Some(SourceRecord {
                    id,
                    address: source.address,
                    bytes,
                })
            },
        ))
    }

    fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    fn has_bytes(&self, id: RecordId) -> bool {
        self.bytes(id).is_some()
    }

    fn datum(&self, id: RecordId) -> Option<Datum> {
        self.get(id)?.datum
    }

    fn apply(&mut self, operation: Operation) -> Result<(), ResolveError> {
        let target = operation.target();
        let record = self
            .get_mut(target)
            .ok_or(ResolveError::StaleRecord(target))?;
        for edit in operation.into_edits() {
            record.apply(edit);
        }
        Ok(())
    }
}
