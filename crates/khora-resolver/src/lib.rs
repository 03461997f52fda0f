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

//! The public-facing API of the Khora data resolver.
//!
//! A [`DataHub`] owns a record container and the resolution agent. Hosts call
//! [`DataHub::request`] to ask for data by address and [`DataHub::advance`]
//! once per step; requests move from `Awaiting` to `Loaded` or `NotFound`
//! without ever blocking the caller.
//!
//! ```rust,no_run
//! use khora_resolver::prelude::*;
//! use std::time::Duration;
//!
//! let mut hub = DataHub::new();
//! hub.register(b"unlit", Address::from_static("Materials/unlit.mat"));
//! let request = hub.request("*/unlit.mat")?;
//! hub.advance(Duration::from_millis(16))?;
//! assert_eq!(hub.status(request), Some(RequestStatus::Loaded));
//! # Ok::<(), ResolveError>(())
//! ```

#![warn(missing_docs)]

mod config;
mod hub;

pub use config::{EmbeddedEntry, ResolverConfig};
pub use hub::DataHub;

/// The types most hosts need.
pub mod prelude {
    pub use crate::{DataHub, EmbeddedEntry, ResolverConfig};
    pub use khora_core::event::{DataEvent, DataEventKind};
    pub use khora_core::record::{Datum, RecordId, RecordStore, RequestStatus};
    pub use khora_core::{Address, DataReference, ResolveError};
    pub use khora_data::{DataRequest, DataSource, Record, RecordWorld};
    pub use khora_lanes::data_lane::{EmbeddedSource, FilesystemSettings, Resolution};
}
