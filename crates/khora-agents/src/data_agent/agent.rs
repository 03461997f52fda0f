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

//! The agent resolving data requests.
//!
//! Each tick scans the request records of the host container, runs the
//! loading ones through the [`ProviderChain`], and queues the resulting edits
//! in a [`CommandBuffer`]. The buffer is flushed once the scan is over, so
//! nothing written during tick N is visible to providers before tick N+1.

use std::any::Any;
use std::collections::HashSet;
use std::time::Duration;

use flume::Sender;
use khora_core::address::Address;
use khora_core::agent::{Agent, AgentStatus};
use khora_core::error::ResolveError;
use khora_core::event::{DataEvent, DataEventKind};
use khora_core::record::{Datum, Edit, RecordStore, RequestRecord, RequestStatus};
use khora_core::EngineContext;
use khora_data::CommandBuffer;
use khora_lanes::data_lane::{
    DataQuery, EmbeddedProvider, EmbeddedSource, FilesystemSettings, ProviderChain, Resolution,
};

use super::tracker::RequestTracker;

/// The agent responsible for resolving data requests.
pub struct DataAgent {
    chain: ProviderChain,
    tracker: RequestTracker,
    commands: CommandBuffer,
    pending_events: Vec<DataEvent>,
    event_sender: Option<Sender<DataEvent>>,
    tick: u64,
    last_applied: usize,
    loaded_total: u64,
    not_found_total: u64,
}

impl Agent for DataAgent {
    fn name(&self) -> &'static str {
        "DataAgent"
    }

    fn start(&mut self, _context: &mut EngineContext<'_>) {
        log::info!(
            "DataAgent: Starting with providers {:?}",
            self.chain.strategy_names()
        );
    }

    fn update(
        &mut self,
        context: &mut EngineContext<'_>,
        delta: Duration,
    ) -> Result<(), ResolveError> {
        self.advance(context.records, delta)
    }

    fn finish(&mut self, _context: &mut EngineContext<'_>) {
        log::info!(
            "DataAgent: Finished after {} ticks ({} loaded, {} not found, {} still loading)",
            self.tick,
            self.loaded_total,
            self.not_found_total,
            self.tracker.loading_count(),
        );
        self.tracker.clear();
        self.commands.clear();
    }

    fn report_status(&self) -> AgentStatus {
        AgentStatus {
            agent_name: self.name(),
            tick: self.tick,
            message: format!(
                "tick={} loading={} loaded_total={} not_found_total={} last_applied={}",
                self.tick,
                self.tracker.loading_count(),
                self.loaded_total,
                self.not_found_total,
                self.last_applied,
            ),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl DataAgent {
    /// Creates an agent using the standard provider chain.
    pub fn new() -> Self {
        Self::with_chain(ProviderChain::standard(&FilesystemSettings::default()))
    }

    /// Creates an agent using the standard provider chain with the given
    /// filesystem settings.
    pub fn from_settings(settings: &FilesystemSettings) -> Self {
        Self::with_chain(ProviderChain::standard(settings))
    }

    /// Creates an agent using a custom provider chain.
    pub fn with_chain(chain: ProviderChain) -> Self {
        Self {
            chain,
            tracker: RequestTracker::new(),
            commands: CommandBuffer::new(),
            pending_events: Vec::new(),
            event_sender: None,
            tick: 0,
            last_applied: 0,
            loaded_total: 0,
            not_found_total: 0,
        }
    }

    /// Attaches a sender for request state changes.
    pub fn with_event_sender(mut self, sender: Sender<DataEvent>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// The provider chain.
    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Mutable access to the provider chain.
    pub fn chain_mut(&mut self) -> &mut ProviderChain {
        &mut self.chain
    }

    /// The per-request bookkeeping.
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// Number of ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Adds `source` to the embedded table under `address`.
    ///
    /// Returns `false` if the address was already registered (the first
    /// registration is kept) or the chain has no embedded table.
    pub fn register(&mut self, source: impl Into<EmbeddedSource>, address: Address) -> bool {
        let Some(embedded) = self.chain.provider_mut::<EmbeddedProvider>() else {
            log::warn!("DataAgent: No embedded provider to register '{address}' with");
            return false;
        };
        match embedded.insert(address, source) {
            Ok(()) => {
                log::debug!("DataAgent: Registered embedded data '{address}'");
                true
            }
            Err(e) => {
                log::warn!("DataAgent: {e}");
                false
            }
        }
    }

    /// Looks `address` up once, outside the tick loop.
    ///
    /// # Errors
    /// Returns [`ResolveError::ProviderIo`] for hard filesystem faults.
    pub fn resolve(
        &self,
        address: &Address,
        records: &dyn RecordStore,
    ) -> Result<Resolution, ResolveError> {
        self.chain
            .resolve(&DataQuery::with_records(address, records))
    }

    /// Runs one resolution tick over `records`.
    ///
    /// A provider fault on one request does not stop the others from being
    /// resolved, and the edits queued by the scan are always applied.
    ///
    /// # Errors
    /// Returns the first [`ResolveError::ProviderIo`] hit during the scan.
    /// The faulting request stays `Loading` and keeps counting toward its
    /// timeout.
    pub fn advance(
        &mut self,
        records: &mut dyn RecordStore,
        delta: Duration,
    ) -> Result<(), ResolveError> {
        self.tick += 1;

        let scan = self.scan(&*records, delta);

        self.last_applied = self.commands.flush(records);
        self.publish_events();
        scan
    }

    fn scan(&mut self, records: &dyn RecordStore, delta: Duration) -> Result<(), ResolveError> {
        let requests: Vec<RequestRecord> = records.requests().collect();
        let mut seen = HashSet::with_capacity(requests.len());
        let mut first_error = None;

        for request in &requests {
            seen.insert(request.id);
            if let Err(e) = self.step(records, request, delta) {
                log::error!(
                    "DataAgent: Resolving '{}' failed on tick {}: {e}",
                    request.address,
                    self.tick
                );
                first_error.get_or_insert(e);
            }
        }

        self.tracker.retain(&seen);
        first_error.map_or(Ok(()), Err)
    }

    fn step(
        &mut self,
        records: &dyn RecordStore,
        request: &RequestRecord,
        delta: Duration,
    ) -> Result<(), ResolveError> {
        let id = request.id;

        match request.status {
            RequestStatus::Awaiting => self.enter_loading(request),
            RequestStatus::Loaded | RequestStatus::NotFound => {
                match self.tracker.completed_version(id) {
                    Some(version) if version != request.version => self.enter_loading(request),
                    Some(_) => return Ok(()),
                    None => {
                        // Settled by someone else; watch for version bumps from here on.
                        self.tracker.remember(id, request.version);
                        return Ok(());
                    }
                }
            }
            RequestStatus::Loading => {}
        }

        let query = DataQuery::with_records(&request.address, records).requested_by(id);
        match self.chain.resolve(&query) {
            Ok(Resolution::Found { bytes, provider }) => {
                self.queue_loaded(records, request, bytes, provider);
                Ok(())
            }
            Ok(Resolution::NotFound) => {
                self.count_miss(request, delta);
                Ok(())
            }
            Err(e) => {
                self.count_miss(request, delta);
                Err(e)
            }
        }
    }

    /// Charges `delta` to a request that produced no data this tick and
    /// settles it as `NotFound` once its timeout has elapsed.
    fn count_miss(&mut self, request: &RequestRecord, delta: Duration) {
        let id = request.id;
        let task = self.tracker.task_mut(id, self.tick);
        task.accumulate(delta);
        if !task.has_timed_out(request.timeout) {
            return;
        }

        log::warn!(
            "DataAgent: '{}' not found after {:?} (request {id})",
            request.address,
            request.timeout
        );
        self.commands
            .enqueue(id, Edit::SetStatus(RequestStatus::NotFound));
        self.tracker.complete(id, request.version);
        self.not_found_total += 1;
        self.emit(request, DataEventKind::NotFound);
    }

    fn enter_loading(&mut self, request: &RequestRecord) {
        log::debug!(
            "DataAgent: Loading '{}' (request {}, version {})",
            request.address,
            request.id,
            request.version
        );
        self.tracker.begin(request.id, self.tick);
        self.commands
            .enqueue(request.id, Edit::SetStatus(RequestStatus::Loading));
        self.emit(request, DataEventKind::Loading);
    }

    fn queue_loaded(
        &mut self,
        records: &dyn RecordStore,
        request: &RequestRecord,
        bytes: Vec<u8>,
        provider: &'static str,
    ) {
        let id = request.id;
        log::info!(
            "DataAgent: Loaded '{}' from {provider} ({} bytes, request {id})",
            request.address,
            bytes.len()
        );

        if records.has_bytes(id) {
            self.commands.enqueue(id, Edit::ResizeBuffer(bytes.len()));
            self.commands.enqueue(id, Edit::SetBytes { offset: 0, bytes });
        } else {
            self.commands.enqueue(id, Edit::CreateBuffer(bytes));
        }

        let datum_edit = match records.datum(id) {
            Some(datum) => Edit::SetDatum(Datum {
                revision: datum.revision.saturating_add(1),
                address: request.address,
            }),
            None => Edit::AddDatum(Datum {
                revision: 1,
                address: request.address,
            }),
        };
        self.commands.enqueue(id, datum_edit);
        self.commands
            .enqueue(id, Edit::SetStatus(RequestStatus::Loaded));

        self.tracker.complete(id, request.version);
        self.loaded_total += 1;
        self.emit(request, DataEventKind::Loaded { provider });
    }

    fn emit(&mut self, request: &RequestRecord, kind: DataEventKind) {
        if self.event_sender.is_some() {
            self.pending_events.push(DataEvent {
                record: request.id,
                address: request.address,
                kind,
            });
        }
    }

    fn publish_events(&mut self) {
        let Some(sender) = &self.event_sender else {
            return;
        };
        let mut disconnected = false;
        for event in self.pending_events.drain(..) {
            if sender.send(event).is_err() {
                disconnected = true;
                break;
            }
        }
        if disconnected {
            log::debug!("DataAgent: Event receiver dropped, disabling events");
            self.event_sender = None;
        }
    }
}

impl Default for DataAgent {
    fn default() -> Self {
        Self::new()
    }
}
