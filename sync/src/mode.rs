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

//! The three modes a node can be configured in (§4.3). `Standalone` skips
//! pull sync entirely; `PublicNetwork` is the only mode that enforces the
//! miner whitelist during gossip validation (§4.4).

/// How this node participates in the network.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NetworkMode {
	/// No peers; the sync machine starts (and stays) `Synchronised`.
	Standalone,
	/// Peers are trusted without a miner whitelist check.
	PrivateNetwork,
	/// Peers are trusted, but gossiped blocks must carry a whitelisted
	/// miner identity to be accepted.
	PublicNetwork,
}
