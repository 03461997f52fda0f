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

//! # Khora Data
//!
//! The **[D]ata** layer of the resolver: the deferred [`CommandBuffer`] that
//! carries record edits out of a scan, and [`RecordWorld`], a reference
//! implementation of the host record container.

#![warn(missing_docs)]

pub mod command;
pub mod records;

pub use command::CommandBuffer;
pub use records::{DataRequest, DataSource, Record, RecordWorld};
