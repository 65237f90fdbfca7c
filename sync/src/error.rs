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

//! §7 Error Handling Design: one `thiserror`-derived enum for every kind of
//! failure the sync machine can hit. None of these ever propagate past the
//! state handler that produced it -- handlers return `(SyncState,
//! Option<Duration>)`, not `Result`. `SyncError` exists so a handler has
//! something precise to log (`warn`/`error`, per the escalation rule in
//! §7) at the point of failure.

/// A failure the sync machine recovers from locally by returning to an
/// earlier state.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
	#[error("block failed proof or miner-whitelist check")]
	InvalidBlock,
	#[error("RPC query referenced an unknown start hash")]
	UnknownStart,
	#[error("peer's chain does not glue to ours at the expected point")]
	ChainMismatch,
	#[error("no trusted peer is available")]
	PeerUnavailable,
	#[error("the underlying request failed: {0}")]
	RequestFailed(#[from] mc_p2p::ProtocolError),
}
