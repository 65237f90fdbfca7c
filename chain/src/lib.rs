// Copyright 2026 Main Chain Sync Contributors
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

//! The chain store for the main-chain synchronisation core: block index,
//! heaviest-tip tracking, loose-block reconciliation, and the
//! time-travel / common-ancestor queries the sync state machine and RPC
//! protocol both sit on top of.

#![deny(unused_mut)]

pub mod error;
pub mod persist;
pub mod store;

pub use error::ChainError;
pub use persist::{BlockPersister, LmdbPersister, MemoryPersister};
pub use store::{ChainStore, MAX_LOOSE_BLOCKS};
