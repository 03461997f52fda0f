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

use super::{Datum, RecordId, RequestStatus};

/// A single field-level change to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Gives the record a byte buffer, taking ownership of `bytes`.
    CreateBuffer(Vec<u8>),
    /// Resizes the record's buffer, zero-filling any growth.
    ResizeBuffer(usize),
    /// Overwrites bytes starting at `offset`, growing the buffer if needed.
    SetBytes {
        /// Position of the first byte written.
        offset: usize,
        /// The bytes to write.
        bytes: Vec<u8>,
    },
    /// Replaces the status of the record's request.
    SetStatus(RequestStatus),
    /// Attaches a data-version marker to a record that has none.
    AddDatum(Datum),
    /// Replaces the record's data-version marker.
    SetDatum(Datum),
}

/// An ordered list of edits targeted at one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    target: RecordId,
    edits: Vec<Edit>,
}

impl Operation {
    /// Creates an empty operation for `target`.
    pub fn new(target: RecordId) -> Self {
        Self {
            target,
            edits: Vec::new(),
        }
    }

    /// The record this operation applies to.
    pub fn target(&self) -> RecordId {
        self.target
    }

    /// Appends an edit.
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// The edits in application order.
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Consumes the operation, yielding its edits in application order.
    pub fn into_edits(self) -> Vec<Edit> {
        self.edits
    }

    /// Number of edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns `true` if the operation holds no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
