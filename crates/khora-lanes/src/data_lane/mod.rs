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

//! Data Lane
//!
//! Each provider in this module is a [`Lane`] that looks an address up in one
//! kind of source. The [`ProviderChain`] asks them in a fixed order and stops
//! at the first one that has the data.

mod chain;
mod embedded;
mod filesystem;
mod live_record;

pub use chain::*;
pub use embedded::*;
pub use filesystem::*;
pub use live_record::*;

use khora_core::address::Address;
use khora_core::error::ResolveError;
use khora_core::lane::Lane;
use khora_core::record::{RecordId, RecordStore};

/// Everything a provider may look at while resolving one address.
#[derive(Clone, Copy)]
pub struct DataQuery<'a> {
    /// The address being resolved (may be a pattern).
    pub address: &'a Address,
    /// The host container, read-only for the duration of the scan.
    pub records: Option<&'a dyn RecordStore>,
    /// The record that asked for the data, if any. Providers must not serve
    /// a request from its own record.
    pub requester: Option<RecordId>,
}

impl<'a> DataQuery<'a> {
    /// A query with no container and no requester.
    pub fn standalone(address: &'a Address) -> Self {
        Self {
            address,
            records: None,
            requester: None,
        }
    }

    /// A query that can also see the records of `records`.
    pub fn with_records(address: &'a Address, records: &'a dyn RecordStore) -> Self {
        Self {
            address,
            records: Some(records),
            requester: None,
        }
    }

    /// Marks `id` as the requesting record.
    pub fn requested_by(mut self, id: RecordId) -> Self {
        self.requester = Some(id);
        self
    }
}

/// A lane that can produce the bytes stored under an address.
pub trait DataProvider: Lane {
    /// Looks `query.address` up in this provider's source.
    ///
    /// Returns an owned copy of the bytes, or `None` if this provider has no
    /// match.
    ///
    /// # Errors
    /// Returns [`ResolveError::ProviderIo`] for hard I/O faults. A missing
    /// entry is never an error.
    fn provide(&self, query: &DataQuery<'_>) -> Result<Option<Vec<u8>>, ResolveError>;
}

/// The outcome of running an address through the [`ProviderChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A provider had the data.
    Found {
        /// The bytes, owned by the caller.
        bytes: Vec<u8>,
        /// Strategy name of the provider that served them.
        provider: &'static str,
    },
    /// No provider had the data.
    NotFound,
}

impl Resolution {
    /// Consumes the resolution, returning the bytes if found.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Resolution::Found { bytes, .. } => Some(bytes),
            Resolution::NotFound => None,
        }
    }
}
