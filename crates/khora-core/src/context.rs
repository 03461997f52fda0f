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

//! Core engine context handed to agents on every lifecycle call.

use crate::record::RecordStore;

/// Engine context providing access to the host's subsystems.
///
/// This structure is built by the host for the duration of a single agent
/// call and dropped right after, so agents never hold on to host state.
pub struct EngineContext<'a> {
    /// The host's live record container.
    pub records: &'a mut dyn RecordStore,
}

impl<'a> EngineContext<'a> {
    /// Wraps the host's record container.
    pub fn new(records: &'a mut dyn RecordStore) -> Self {
        Self { records }
    }
}
