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

//! Drives `SyncMachine` through a full Phase A -> Phase C run against
//! fake `RpcClient`/`PeerSet` collaborators and a real `ChainStore`,
//! exercising the sync logic against an in-process fake network instead
//! of real sockets.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use mc_chain::ChainStore;
use mc_core::block::{AlwaysValid, Block, BlockBody, Identity, ProofOfWork};
use mc_core::digest::{Digest, GENESIS_DIGEST};
use mc_p2p::{Endpoint, PeerAddress, PeerSelector, PeerSet, Reply, RpcClient, Travelogue};
use mc_sync::{Counters, NetworkMode, SyncMachine, SyncState};

fn block(number: u64, previous: Digest, salt: u8) -> Block {
	let mut b = Block {
		hash: Digest::zero(),
		previous_hash: previous,
		block_number: number,
		miner: Identity::from_bytes(vec![salt]),
		proof: ProofOfWork(vec![salt]),
		body: BlockBody::empty(),
	};
	b.update_digest();
	b
}

struct FixedPeers(Vec<PeerAddress>);
impl PeerSet for FixedPeers {
	fn trusted_peers(&self) -> Vec<PeerAddress> {
		self.0.clone()
	}
}

/// Replies to `HEAVIEST_CHAIN`/`TIME_TRAVEL`/`COMMON_SUB_CHAIN` calls by
/// walking a fixed peer chain -- a minimal stand-in for a real peer's own
/// `MainChainProtocol`, good enough to exercise the controller's own logic.
struct FakePeerChain {
	store: ChainStore,
}

impl RpcClient for FakePeerChain {
	fn call(
		&self,
		_peer: &PeerAddress,
		endpoint: Endpoint,
	) -> Pin<Box<dyn Future<Output = Result<Reply, mc_p2p::ProtocolError>> + Send>> {
		let reply = match endpoint {
			Endpoint::HeaviestChain { max_count } => {
				let proto = mc_p2p::MainChainProtocol::new(&self.store);
				Reply::Blocks(proto.heaviest_chain(max_count))
			}
			Endpoint::TimeTravel { start, limit } => {
				let proto = mc_p2p::MainChainProtocol::new(&self.store);
				Reply::Travelogue(proto.time_travel(start, limit))
			}
			Endpoint::CommonSubChain { start, last_seen, limit } => {
				let proto = mc_p2p::MainChainProtocol::new(&self.store);
				Reply::Blocks(proto.common_sub_chain(start, last_seen, limit))
			}
		};
		Box::pin(async move { Ok(reply) })
	}
}

fn peer_chain_of_length(n: u64) -> (ChainStore, Vec<Block>) {
	let genesis = Block::genesis();
	let store = ChainStore::new(genesis.clone());
	let mut prev = genesis.hash;
	let mut blocks = vec![genesis];
	for i in 1..=n {
		let b = block(i, prev, i as u8);
		prev = b.hash;
		blocks.push(b.clone());
		store.add_block(b, &AlwaysValid);
	}
	(store, blocks)
}

#[tokio::test]
async fn catches_up_a_fresh_node_to_a_short_peer_chain_via_phase_a() {
	let (peer_store, peer_blocks) = peer_chain_of_length(5);
	let local = Arc::new(ChainStore::new(Block::genesis()));

	let mut machine = SyncMachine::new(
		local.clone(),
		Arc::new(FakePeerChain { store: peer_store }),
		Arc::new(FixedPeers(vec!["peer-a".to_string()])),
		Arc::new(AlwaysValid),
		Arc::new(Counters::default()),
		PeerSelector::with_seed(1),
		NetworkMode::PrivateNetwork,
	);

	for _ in 0..10 {
		if machine.state() == SyncState::Synchronising {
			break;
		}
		machine.tick().await;
	}

	assert_eq!(machine.state(), SyncState::Synchronising);
	assert_eq!(local.get_heaviest_block_hash(), peer_blocks.last().unwrap().hash);
}

#[tokio::test]
async fn phase_c_pulls_in_a_locally_discovered_loose_subtree() {
	let (peer_store, peer_blocks) = peer_chain_of_length(5);
	let local = Arc::new(ChainStore::new(Block::genesis()));
	// The node already heard block 5 by gossip, out of order: it's loose
	// until Phase C walks the common-sub-chain back to fill in 1..4.
	local.add_block((*peer_blocks.last().unwrap()).clone(), &AlwaysValid);
	assert!(local.has_missing_blocks());

	let mut machine = SyncMachine::new(
		local.clone(),
		Arc::new(FakePeerChain { store: peer_store }),
		Arc::new(FixedPeers(vec!["peer-a".to_string()])),
		Arc::new(AlwaysValid),
		Arc::new(Counters::default()),
		PeerSelector::with_seed(1),
		NetworkMode::PrivateNetwork,
	);
	machine.set_state(SyncState::Synchronising);

	for _ in 0..5 {
		if !local.has_missing_blocks() {
			break;
		}
		machine.tick().await;
	}

	assert!(!local.has_missing_blocks());
	assert_eq!(local.get_heaviest_block_hash(), peer_blocks.last().unwrap().hash);
}

#[test]
fn genesis_digest_is_never_the_zero_digest() {
	// Sanity check the sentinel overload the whole sync machine leans on:
	// "at tip" and "ambiguous" must be observably distinct.
	assert_ne!(*GENESIS_DIGEST, Digest::zero());
	let _ = Travelogue {
		blocks: vec![],
		next_hash: *GENESIS_DIGEST,
		proceed: true,
	};
}
