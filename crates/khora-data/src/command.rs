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

//! Deferred record edits.
//!
//! A resolver scan reads the record container while it decides what to do, so
//! it cannot write to it at the same time. Edits are queued in a
//! [`CommandBuffer`] instead and applied in one pass once the scan is over.

use khora_core::record::{Edit, Operation, RecordId, RecordStore};
use std::collections::HashMap;

/// Collects edits per target record and applies them in bulk.
///
/// Edits for one record are grouped into a single [`Operation`], kept in the
/// order they were enqueued. Operations are applied in the order their target
/// was first seen.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    slots: HashMap<RecordId, usize>,
    operations: Vec<Operation>,
    pending_edits: usize,
}

impl CommandBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an edit for `target`.
    pub fn enqueue(&mut self, target: RecordId, edit: Edit) {
        let operations = &mut self.operations;
        let slot = *self.slots.entry(target).or_insert_with(|| {
            operations.push(Operation::new(target));
            operations.len() - 1
        });
        self.operations[slot].push(edit);
        self.pending_edits += 1;
    }

    /// Applies every queued operation to `store` and empties the buffer.
    ///
    /// Operations whose target has disappeared since they were queued are
    /// skipped. Returns the number of operations applied.
    pub fn flush(&mut self, store: &mut dyn RecordStore) -> usize {
        self.slots.clear();
        self.pending_edits = 0;

        let mut applied = 0;
        for operation in self.operations.drain(..) {
            let target = operation.target();
            if !store.contains(target) {
                log::debug!(
                    "Skipping {} deferred edits for removed record {target}",
                    operation.edits().len()
                );
                continue;
            }
            match store.apply(operation) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("Dropping deferred edits for record {target}: {e}"),
            }
        }
        applied
    }

    /// Number of queued edits.
    pub fn len(&self) -> usize {
        self.pending_edits
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending_edits == 0
    }

    /// Number of distinct target records.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Drops every queued edit without applying it.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.operations.clear();
        self.pending_edits = 0;
    }
}
