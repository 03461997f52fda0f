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

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use khora_agents::data_agent::DataAgent;
use khora_core::agent::{Agent, AgentStatus};
use khora_core::event::{DataEvent, EventBus};
use khora_core::record::{Datum, RecordId, RecordStore, RequestStatus};
use khora_core::{Address, EngineContext, ResolveError};
use khora_data::{DataRequest, RecordWorld};
use khora_lanes::data_lane::{EmbeddedSource, Resolution};

use crate::config::ResolverConfig;

/// A record container and the agent resolving its data requests.
pub struct DataHub {
    world: RecordWorld,
    agent: DataAgent,
    events: EventBus<DataEvent>,
    default_timeout: Duration,
}

impl DataHub {
    /// Creates a hub with the default configuration.
    pub fn new() -> Self {
        Self::build(&ResolverConfig::default())
    }

    /// Creates a hub from `config`, reading and registering its embedded files.
    pub fn from_config(config: ResolverConfig) -> Result<Self> {
        let mut hub = Self::build(&config);
        for entry in &config.embedded {
            let bytes = fs::read(&entry.path).with_context(|| {
                format!(
                    "Failed to read embedded data for '{}' from {}",
                    entry.address,
                    entry.path.display()
                )
            })?;
            hub.register(bytes, entry.address);
        }
        Ok(hub)
    }

    fn build(config: &ResolverConfig) -> Self {
        let events = EventBus::new();
        let mut agent = DataAgent::from_settings(&config.filesystem);
        if config.emit_events {
            agent = agent.with_event_sender(events.sender());
        }

        let mut world = RecordWorld::new();
        agent.start(&mut EngineContext::new(&mut world));

        Self {
            world,
            agent,
            events,
            default_timeout: config.default_timeout(),
        }
    }

    /// Runs one resolution tick.
    ///
    /// # Errors
    /// Returns [`ResolveError::ProviderIo`] if the filesystem failed for a
    /// reason other than a missing file.
    pub fn advance(&mut self, delta: Duration) -> Result<(), ResolveError> {
        let mut context = EngineContext::new(&mut self.world);
        self.agent.update(&mut context, delta)
    }

    /// Looks `address` up once, outside the tick loop.
    pub fn resolve(&self, address: &str) -> Result<Resolution, ResolveError> {
        let address = Address::new(address)?;
        self.agent.resolve(&address, &self.world)
    }

    /// Adds data to the embedded table. Returns `false` if `address` was
    /// already registered, in which case the first registration is kept.
    pub fn register(&mut self, source: impl Into<EmbeddedSource>, address: Address) -> bool {
        self.agent.register(source, address)
    }

    /// Creates a request for `address` with the configured default timeout.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidAddress`] without creating anything if
    /// `address` is malformed.
    pub fn request(&mut self, address: &str) -> Result<RecordId, ResolveError> {
        self.request_with_timeout(address, self.default_timeout)
    }

    /// Creates a request for `address` with an explicit timeout.
    pub fn request_with_timeout(
        &mut self,
        address: &str,
        timeout: Duration,
    ) -> Result<RecordId, ResolveError> {
        let address = Address::new(address)?;
        let id = self
            .world
            .spawn_request(DataRequest::new(address).with_timeout(timeout));
        log::trace!("DataHub: Requested '{address}' as {id}");
        Ok(id)
    }

    /// Status of a request, or `None` if `id` is not a live request.
    pub fn status(&self, id: RecordId) -> Option<RequestStatus> {
        self.world.status(id)
    }

    /// The bytes loaded into a request's record.
    pub fn bytes(&self, id: RecordId) -> Option<&[u8]> {
        self.world.bytes(id)
    }

    /// The data-version marker of a record.
    pub fn datum(&self, id: RecordId) -> Option<Datum> {
        self.world.datum(id)
    }

    /// Forces a request to be resolved again. Returns its new version.
    pub fn bump_version(&mut self, id: RecordId) -> Option<u32> {
        self.world.bump_version(id)
    }

    /// The record container.
    pub fn world(&self) -> &RecordWorld {
        &self.world
    }

    /// Mutable access to the record container.
    pub fn world_mut(&mut self) -> &mut RecordWorld {
        &mut self.world
    }

    /// Request state changes, if enabled in the configuration.
    pub fn events(&self) -> &flume::Receiver<DataEvent> {
        self.events.receiver()
    }

    /// Takes every request state change published so far.
    pub fn drain_events(&self) -> Vec<DataEvent> {
        self.events.drain()
    }

    /// The resolution agent.
    pub fn agent(&self) -> &DataAgent {
        &self.agent
    }

    /// The agent's counters.
    pub fn report_status(&self) -> AgentStatus {
        self.agent.report_status()
    }
}

impl Default for DataHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DataHub {
    fn drop(&mut self) {
        self.agent.finish(&mut EngineContext::new(&mut self.world));
    }
}
