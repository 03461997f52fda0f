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

//! Error type shared by every layer of the data resolution subsystem.
//!
//! Only hard I/O faults and malformed input are errors. A request whose data
//! cannot be found is expressed as a status, never through this type.

use crate::address::Address;
use crate::record::RecordId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving data or mutating records.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The address was malformed and rejected before entering any state machine.
    #[error("invalid address `{address}`: {reason}")]
    InvalidAddress {
        /// The rejected input.
        address: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The filesystem failed for a reason other than the file not existing.
    #[error("failed to read `{}`", path.display())]
    ProviderIo {
        /// The path that was being accessed.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Embedded data was already registered at this exact address.
    #[error("embedded data is already registered at `{0}`")]
    DuplicateEmbeddedAddress(Address),

    /// An operation targeted a record that no longer exists.
    #[error("record {0} no longer exists")]
    StaleRecord(RecordId),
}

/// A `Result` alias using [`ResolveError`].
pub type ResolveResult<T> = Result<T, ResolveError>;
