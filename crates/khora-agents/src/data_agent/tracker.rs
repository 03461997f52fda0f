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

//! Per-request timing and version bookkeeping.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use khora_core::record::RecordId;

/// Timing state of a request while it is `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingTask {
    /// The tick the task was started on.
    pub started_tick: u64,
    /// Wall-clock start, for diagnostics only.
    pub started_at: Instant,
    /// Sum of the tick deltas spent without finding the data.
    pub elapsed: Duration,
}

impl LoadingTask {
    /// Creates a task with nothing elapsed.
    pub fn new(started_tick: u64) -> Self {
        Self {
            started_tick,
            started_at: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Adds a tick's delta to the elapsed time.
    pub fn accumulate(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    /// Returns `true` once the elapsed time has reached `timeout`.
    pub fn has_timed_out(&self, timeout: Duration) -> bool {
        self.elapsed >= timeout
    }
}

/// Keeps the [`LoadingTask`] of every loading request and the version each
/// settled request completed under.
#[derive(Debug, Default)]
pub struct RequestTracker {
    tasks: HashMap<RecordId, LoadingTask>,
    completed: HashMap<RecordId, u32>,
}

impl RequestTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh task for `id`, discarding any previous one.
    pub fn begin(&mut self, id: RecordId, tick: u64) -> &mut LoadingTask {
        self.tasks.insert(id, LoadingTask::new(tick));
        self.task_mut(id, tick)
    }

    /// Returns the task of `id`, creating it if the request was seen
    /// `Loading` without one.
    pub fn task_mut(&mut self, id: RecordId, tick: u64) -> &mut LoadingTask {
        self.tasks
            .entry(id)
            .or_insert_with(|| LoadingTask::new(tick))
    }

    /// Returns the task of `id`, if it is loading.
    pub fn task(&self, id: RecordId) -> Option<&LoadingTask> {
        self.tasks.get(&id)
    }

    /// Drops the task of `id` and remembers the version it completed under.
    pub fn complete(&mut self, id: RecordId, version: u32) -> Option<LoadingTask> {
        self.completed.insert(id, version);
        self.tasks.remove(&id)
    }

    /// Remembers `version` for a request settled outside the resolver.
    pub fn remember(&mut self, id: RecordId, version: u32) {
        self.completed.insert(id, version);
    }

    /// The version `id` last completed under.
    pub fn completed_version(&self, id: RecordId) -> Option<u32> {
        self.completed.get(&id).copied()
    }

    /// Number of requests currently loading.
    pub fn loading_count(&self) -> usize {
        self.tasks.len()
    }

    /// Forgets every request not in `seen`.
    pub fn retain(&mut self, seen: &HashSet<RecordId>) {
        self.tasks.retain(|id, _| seen.contains(id));
        self.completed.retain(|id, _| seen.contains(id));
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.completed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> RecordId {
        RecordId {
            index,
            generation: 0,
        }
    }

    #[test]
    fn begin_resets_elapsed() {
        let mut tracker = RequestTracker::new();
        tracker.begin(id(0), 1).accumulate(Duration::from_millis(300));
        assert_eq!(
            tracker.task(id(0)).map(|t| t.elapsed),
            Some(Duration::from_millis(300))
        );

        let task = tracker.begin(id(0), 5);
        assert_eq!(task.elapsed, Duration::ZERO);
        assert_eq!(task.started_tick, 5);
        assert_eq!(tracker.loading_count(), 1);
    }

    #[test]
    fn task_mut_keeps_existing_task() {
        let mut tracker = RequestTracker::new();
        tracker.task_mut(id(0), 1).accumulate(Duration::from_millis(10));
        tracker.task_mut(id(0), 2).accumulate(Duration::from_millis(10));

        let task = tracker.task(id(0)).expect("task was created lazily");
        assert_eq!(task.started_tick, 1);
        assert_eq!(task.elapsed, Duration::from_millis(20));
    }

    #[test]
    fn complete_drops_task_and_remembers_version() {
        let mut tracker = RequestTracker::new();
        tracker.begin(id(3), 1);

        assert!(tracker.complete(id(3), 7).is_some());
        assert!(tracker.task(id(3)).is_none());
        assert_eq!(tracker.completed_version(id(3)), Some(7));
        assert_eq!(tracker.loading_count(), 0);
    }

    #[test]
    fn retain_forgets_vanished_requests() {
        let mut tracker = RequestTracker::new();
        tracker.begin(id(0), 1);
        tracker.begin(id(1), 1);
        tracker.remember(id(2), 4);

        let seen = HashSet::from([id(1)]);
        tracker.retain(&seen);

        assert!(tracker.task(id(0)).is_none());
        assert!(tracker.task(id(1)).is_some());
        assert_eq!(tracker.completed_version(id(2)), None);
    }

    #[test]
    fn timeout_is_inclusive() {
        let mut task = LoadingTask::new(0);
        task.accumulate(Duration::from_millis(499));
        assert!(!task.has_timed_out(Duration::from_millis(500)));
        task.accumulate(Duration::from_millis(1));
        assert!(task.has_timed_out(Duration::from_millis(500)));
    }
}
