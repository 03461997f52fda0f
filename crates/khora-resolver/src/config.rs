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

//! Resolver configuration, stored as RON.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use khora_core::Address;
use khora_lanes::data_lane::FilesystemSettings;
use serde::{Deserialize, Serialize};

/// A file registered into the embedded table when the hub is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedEntry {
    /// The address the file's bytes are published under.
    pub address: Address,
    /// The file to read, relative to the working directory unless absolute.
    pub path: PathBuf,
}

/// Settings of a [`DataHub`](crate::DataHub).
///
/// ```ron
/// (
///     default_timeout_ms: 2000,
///     filesystem: (enabled: true, root: Some("assets")),
///     embedded: [
///         (address: "Shaders/unlit.shader", path: "builtin/unlit.shader"),
///     ],
///     emit_events: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Timeout given to requests created without an explicit one.
    pub default_timeout_ms: u64,
    /// Filesystem provider settings.
    pub filesystem: FilesystemSettings,
    /// Files to register into the embedded table.
    pub embedded: Vec<EmbeddedEntry>,
    /// Whether the hub publishes request state changes on its event channel.
    pub emit_events: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 5000,
            filesystem: FilesystemSettings::default(),
            embedded: Vec::new(),
            emit_events: false,
        }
    }
}

impl ResolverConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).context("Failed to parse resolver configuration")
    }

    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read resolver configuration {}", path.display()))?;
        Self::from_ron_str(&text).with_context(|| format!("In {}", path.display()))
    }

    /// Serializes the configuration as pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty).context("Failed to serialize resolver configuration")
    }

    /// [`default_timeout_ms`](Self::default_timeout_ms) as a `Duration`.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}
