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

//! The last-resort provider, reading addresses as file paths.

use std::any::Any;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use khora_core::address::Address;
use khora_core::error::ResolveError;
use khora_core::lane::{Lane, LaneKind};
use serde::{Deserialize, Serialize};

use super::{DataProvider, DataQuery};

/// Settings for the [`FilesystemProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemSettings {
    /// Whether the chain consults the filesystem at all.
    pub enabled: bool,
    /// Directory relative addresses are joined to. `None` uses the working directory.
    pub root: Option<PathBuf>,
}

impl Default for FilesystemSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            root: None,
        }
    }
}

/// Reads the file an address names, blocking the calling thread.
#[derive(Debug, Default, Clone)]
pub struct FilesystemProvider {
    root: Option<PathBuf>,
}

impl FilesystemProvider {
    /// Creates a provider resolving relative addresses against the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider resolving relative addresses against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// The configured root, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// The path an address maps to.
    pub fn path_for(&self, address: &Address) -> PathBuf {
        let path = address.as_path();
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn read(path: &Path) -> Result<Option<Vec<u8>>, ResolveError> {
        let io_error = |source: io::Error| ResolveError::ProviderIo {
            path: path.to_path_buf(),
            source,
        };

        match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => return Ok(None),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e)),
        }

        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            // Removed between the two calls.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e)),
        }
    }
}

impl From<&FilesystemSettings> for FilesystemProvider {
    fn from(settings: &FilesystemSettings) -> Self {
        Self {
            root: settings.root.clone(),
        }
    }
}

impl Lane for FilesystemProvider {
    fn strategy_name(&self) -> &'static str {
        "Filesystem"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Io
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl DataProvider for FilesystemProvider {
    fn provide(&self, query: &DataQuery<'_>) -> Result<Option<Vec<u8>>, ResolveError> {
        if query.address.is_wildcard() {
            return Ok(None);
        }
        let path = self.path_for(query.address);
        log::trace!("FilesystemProvider: probing {}", path.display());
        Self::read(&path)
    }
}
