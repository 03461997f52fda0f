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

//! The in-memory provider for data the host registers at startup.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use khora_core::address::Address;
use khora_core::error::ResolveError;
use khora_core::lane::{Lane, LaneKind};

use super::{DataProvider, DataQuery};

/// Bytes handed to the embedded table.
#[derive(Debug, Clone)]
pub enum EmbeddedSource {
    /// Data compiled into the binary.
    Static(&'static [u8]),
    /// Data loaded at runtime and shared with the host.
    Shared(Arc<[u8]>),
}

impl EmbeddedSource {
    /// The bytes behind this source.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EmbeddedSource::Static(bytes) => bytes,
            EmbeddedSource::Shared(bytes) => bytes,
        }
    }
}

impl From<&'static [u8]> for EmbeddedSource {
    fn from(bytes: &'static [u8]) -> Self {
        EmbeddedSource::Static(bytes)
    }
}

impl<const N: usize> From<&'static [u8; N]> for EmbeddedSource {
    fn from(bytes: &'static [u8; N]) -> Self {
        EmbeddedSource::Static(bytes)
    }
}

impl From<&'static str> for EmbeddedSource {
    fn from(text: &'static str) -> Self {
        EmbeddedSource::Static(text.as_bytes())
    }
}

impl From<Vec<u8>> for EmbeddedSource {
    fn from(bytes: Vec<u8>) -> Self {
        EmbeddedSource::Shared(bytes.into())
    }
}

impl From<Arc<[u8]>> for EmbeddedSource {
    fn from(bytes: Arc<[u8]>) -> Self {
        EmbeddedSource::Shared(bytes)
    }
}

/// One entry of the embedded table.
#[derive(Debug, Clone)]
pub struct EmbeddedResource {
    /// The address the data is published under.
    pub address: Address,
    /// The data.
    pub source: EmbeddedSource,
}

impl fmt::Display for EmbeddedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmbeddedResource: {}", self.address)
    }
}

/// Serves data from a table filled by explicit registration.
///
/// Entries are matched in registration order.
#[derive(Debug, Default)]
pub struct EmbeddedProvider {
    entries: Vec<EmbeddedResource>,
}

impl EmbeddedProvider {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `source` under `address`.
    ///
    /// # Errors
    /// Returns [`ResolveError::DuplicateEmbeddedAddress`] if the address is
    /// already registered; the existing entry is kept.
    pub fn insert(
        &mut self,
        address: Address,
        source: impl Into<EmbeddedSource>,
    ) -> Result<(), ResolveError> {
        if self.entries.iter().any(|entry| entry.address == address) {
            return Err(ResolveError::DuplicateEmbeddedAddress(address));
        }
        self.entries.push(EmbeddedResource {
            address,
            source: source.into(),
        });
        Ok(())
    }

    /// Returns the first entry whose address matches `query`.
    pub fn find(&self, query: &Address) -> Option<&EmbeddedResource> {
        self.entries.iter().find(|entry| query.matches(&entry.address))
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lane for EmbeddedProvider {
    fn strategy_name(&self) -> &'static str {
        "Embedded"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Memory
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl DataProvider for EmbeddedProvider {
    fn provide(&self, query: &DataQuery<'_>) -> Result<Option<Vec<u8>>, ResolveError> {
        Ok(self
            .find(query.address)
            .map(|entry| entry.source.as_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_wins() {
        let mut provider = EmbeddedProvider::new();
        let address = Address::from_static("Shaders/unlit.shader");

        provider.insert(address, b"first").expect("first insert");
        let err = provider
            .insert(address, b"second".to_vec())
            .expect_err("duplicate must be rejected");

        assert!(matches!(err, ResolveError::DuplicateEmbeddedAddress(a) if a == address));
        assert_eq!(provider.len(), 1);
        let bytes = provider
            .provide(&DataQuery::standalone(&address))
            .expect("embedded lookup never fails");
        assert_eq!(bytes.as_deref(), Some(&b"first"[..]));
    }

    #[test]
    fn lookup_uses_pattern_matching() {
        let mut provider = EmbeddedProvider::new();
        provider
            .insert(Address::from_static("Materials/unlit.mat"), "unlit")
            .expect("insert");

        let query = Address::from_static("*.mat");
        assert_eq!(
            provider.find(&query).map(|entry| entry.source.as_bytes()),
            Some(&b"unlit"[..])
        );
        assert!(provider
            .find(&Address::from_static("Materials/lit.mat"))
            .is_none());
    }

    #[test]
    fn display_names_the_address() {
        let resource = EmbeddedResource {
            address: Address::from_static("a/b.txt"),
            source: EmbeddedSource::from(&b""[..]),
        };
        assert_eq!(resource.to_string(), "EmbeddedResource: a/b.txt");
    }
}
