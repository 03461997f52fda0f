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

//! Serves data published by other records of the host container.

use std::any::Any;

use khora_core::error::ResolveError;
use khora_core::lane::{Lane, LaneKind};

use super::{DataProvider, DataQuery};

/// Scans the host's source records for a matching address.
///
/// Only sees the container state as of the current scan: bytes written by
/// the deferred flush of this tick show up on the next one.
#[derive(Debug, Default)]
pub struct LiveRecordProvider;

impl LiveRecordProvider {
    /// Creates a new `LiveRecordProvider`.
    pub fn new() -> Self {
        Self
    }
}

impl Lane for LiveRecordProvider {
    fn strategy_name(&self) -> &'static str {
        "LiveRecord"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Container
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl DataProvider for LiveRecordProvider {
    fn provide(&self, query: &DataQuery<'_>) -> Result<Option<Vec<u8>>, ResolveError> {
        let Some(records) = query.records else {
            return Ok(None);
        };

        let found = records
            .sources()
            .filter(|source| Some(source.id) != query.requester)
            .find(|source| query.address.matches(&source.address))
            .map(|source| source.bytes.to_vec());
        Ok(found)
    }
}
