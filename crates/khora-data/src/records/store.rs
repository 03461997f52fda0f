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

//! Internal record slots and ID management.

use super::Record;
use khora_core::record::RecordId;

/// Internal manager for record slots.
///
/// Maintains a dense list of slots, each holding the slot's current `RecordId`
/// and the record if it is alive. Removed slots are recycled through a free
/// list with their generation incremented.
#[derive(Debug, Clone, Default)]
pub(crate) struct SlotStore {
    slots: Vec<(RecordId, Option<Record>)>,
    freed: Vec<u32>,
    alive: usize,
}

impl SlotStore {
    /// Stores a record in a new or recycled slot.
    pub fn insert(&mut self, record: Record) -> RecordId {
        self.alive += 1;
        if let Some(index) = self.freed.pop() {
            let (id, slot) = &mut self.slots[index as usize];
            id.generation += 1;
            *slot = Some(record);
            *id
        } else {
            let id = RecordId {
                index: self.slots.len() as u32,
                generation: 0,
            };
            self.slots.push((id, Some(record)));
            id
        }
    }

    /// Removes a record, freeing its slot. Returns it if `id` was alive.
    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        let (slot_id, slot) = self.slots.get_mut(id.index as usize)?;
        if *slot_id != id {
            return None;
        }
        let record = slot.take()?;
        self.freed.push(id.index);
        self.alive -= 1;
        Some(record)
    }

    /// Returns the record if `id` is alive and its generation is current.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.slots
            .get(id.index as usize)
            .and_then(|(slot_id, record)| (*slot_id == id).then_some(record.as_ref()).flatten())
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.slots
            .get_mut(id.index as usize)
            .and_then(|(slot_id, record)| (*slot_id == id).then_some(record.as_mut()).flatten())
    }

    /// Iterates over alive records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.slots
            .iter()
            .filter_map(|(id, record)| record.as_ref().map(|record| (*id, record)))
    }

    /// Number of alive records.
    pub fn len(&self) -> usize {
        self.alive
    }
}
