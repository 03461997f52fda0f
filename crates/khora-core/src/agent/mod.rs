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

//! Traits for tick-driven engine subsystems (Agents).

use crate::error::ResolveError;
use crate::EngineContext;
use std::any::Any;
use std::time::Duration;

/// A snapshot of an agent's health, for logging and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStatus {
    /// The agent that produced the report.
    pub agent_name: &'static str,
    /// Number of ticks the agent has run.
    pub tick: u64,
    /// A short human-readable summary of the agent's counters.
    pub message: String,
}

/// The interface of a tick-driven subsystem.
///
/// The host calls [`start`](Agent::start) once, [`update`](Agent::update) once
/// per step with the elapsed time, and [`finish`](Agent::finish) on shutdown.
/// Agents never spawn threads or block waiting for work; anything that is not
/// ready is carried over to the next `update` as state.
pub trait Agent: Send + Sync {
    /// Returns the name of this agent, used in logs and status reports.
    fn name(&self) -> &'static str;

    /// Called once before the first update.
    fn start(&mut self, _context: &mut EngineContext<'_>) {}

    /// Runs one step of the agent's work.
    ///
    /// # Errors
    /// Returns hard faults the agent cannot express as state.
    fn update(
        &mut self,
        context: &mut EngineContext<'_>,
        delta: Duration,
    ) -> Result<(), ResolveError>;

    /// Called once when the host shuts the agent down.
    fn finish(&mut self, _context: &mut EngineContext<'_>) {}

    /// Reports the current status and counters of the agent.
    fn report_status(&self) -> AgentStatus;

    /// Allows downcasting to concrete agent types.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to concrete agent types.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
