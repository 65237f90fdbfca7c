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

//! The pull-sync controller for the main-chain synchronisation core:
//! the eight-state machine that keeps a node's [`mc_chain::ChainStore`]
//! caught up with its peers, the gossip ingestion path new blocks
//! arrive through, and the telemetry counters both feed.

#![deny(unused_mut)]

pub mod constants;
pub mod error;
pub mod ingest;
pub mod machine;
pub mod mode;
pub mod telemetry;

pub use error::SyncError;
pub use ingest::{ingest_batch, on_gossip_block};
pub use machine::{RetrievalPhase, SyncMachine, SyncState};
pub use mode::NetworkMode;
pub use telemetry::{Counters, Snapshot};
