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

//! §4.5 Peer selection: a uniform random pick among the peers a collaborator
//! considers trusted (or, for Phase B, directly connected).

use mc_util::Lcg;

use crate::trust::PeerAddress;

/// The set of peers the sync machine may pick from. An embedder implements
/// this against its real connection table; `mc-sync`'s tests use a fixed
/// `Vec<PeerAddress>`.
pub trait PeerSet: Send + Sync {
	/// Peers this node has authenticated/whitelisted enough to pull a
	/// chain from (Phase A/C).
	fn trusted_peers(&self) -> Vec<PeerAddress>;

	/// Every peer this node currently has a live connection to (Phase B's
	/// `HEAVIEST_CHAIN` request tolerates any connected peer, not just a
	/// trusted one).
	fn connected_peers(&self) -> Vec<PeerAddress> {
		self.trusted_peers()
	}
}

/// Picks one peer uniformly at random from a [`PeerSet`]. Backed by a
/// process-wide LCG (§9 Design Note: "a process-wide RNG is acceptable but
/// should be seeded deterministically only in tests").
pub struct PeerSelector {
	rng: Lcg,
}

impl PeerSelector {
	/// Builds a selector seeded non-deterministically, for production use.
	pub fn new() -> PeerSelector {
		PeerSelector { rng: Lcg::default() }
	}

	/// Builds a selector with a fixed seed, for reproducible tests.
	pub fn with_seed(seed: u64) -> PeerSelector {
		PeerSelector {
			rng: Lcg::with_seed(seed),
		}
	}

	/// Picks a uniformly random trusted peer. `None` if none are connected
	/// -- callers treat this as "try again later" (§4.5).
	pub fn pick_trusted(&self, peers: &dyn PeerSet) -> Option<PeerAddress> {
		let candidates = peers.trusted_peers();
		self.rng.index(candidates.len()).map(|i| candidates[i].clone())
	}

	/// Picks a uniformly random connected peer (Phase B).
	pub fn pick_connected(&self, peers: &dyn PeerSet) -> Option<PeerAddress> {
		let candidates = peers.connected_peers();
		self.rng.index(candidates.len()).map(|i| candidates[i].clone())
	}
}

impl Default for PeerSelector {
	fn default() -> Self {
		PeerSelector::new()
	}
}
