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

//! The trust subsystem is an external oracle (§2: "informed by outcomes").
//! `mc-sync` depends on this trait rather than a concrete peer database,
//! the same way the chain pipeline elsewhere in this workspace depends on
//! trait seams rather than concrete servers -- it lets the gossip and sync
//! code be tested without a real reputation store.

/// An address on the (out-of-scope) messaging substrate. Opaque to this
/// core beyond equality and display.
pub type PeerAddress = String;

/// Feedback a collaborator gives about a specific peer's behaviour.
/// `mc-sync`'s gossip handler calls `good` for every block that passes
/// `IsBlockValid`; nothing in this core ever calls `bad` today (clearly
/// invalid blocks are simply dropped, per §1's BFT non-goal), but the
/// trait carries it so an embedder's trust model can react to more than
/// just positive signal.
pub trait TrustFeedback: Send + Sync {
	/// Records positive feedback for `peer` (e.g. it sent a block that
	/// validated).
	fn good(&self, peer: &PeerAddress);

	/// Records negative feedback for `peer`.
	fn bad(&self, peer: &PeerAddress);
}

/// A `TrustFeedback` that discards every signal. Useful in tests that only
/// care about chain-store mechanics.
#[derive(Default)]
pub struct NoopTrust;

impl TrustFeedback for NoopTrust {
	fn good(&self, _peer: &PeerAddress) {}
	fn bad(&self, _peer: &PeerAddress) {}
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::*;
	use std::sync::Mutex;

	/// Records every call, for assertions in `mc-sync`'s own tests as well
	/// as this crate's.
	#[derive(Default)]
	pub struct RecordingTrust {
		pub good: Mutex<Vec<PeerAddress>>,
		pub bad: Mutex<Vec<PeerAddress>>,
	}

	impl TrustFeedback for RecordingTrust {
		fn good(&self, peer: &PeerAddress) {
			self.good.lock().unwrap().push(peer.clone());
		}
		fn bad(&self, peer: &PeerAddress) {
			self.bad.lock().unwrap().push(peer.clone());
		}
	}
}
