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

//! §4.4 Gossip ingestion path, plus the batch-ingestion path the sync
//! machine's Phases A/B/B'/C feed their `TIME_TRAVEL`/`HEAVIEST_CHAIN`/
//! `COMMON_SUB_CHAIN` responses through.
//!
//! **Supplemented from `original_source`** (`HandleChainResponse` in the
//! original service): the batch path rejects the *entire* batch if a
//! genesis-numbered block inside it doesn't match `GENESIS_DIGEST` --
//! the peer is presumed to be on a different network -- rather than
//! ingesting the blocks that do make sense. The single-block gossip path
//! has no equivalent rule because a genesis block is never gossiped (it
//! predates every peer's connection).

use std::collections::HashSet;

use mc_core::block::{Block, BlockVerifier, Identity};
use mc_core::digest::GENESIS_DIGEST;
use mc_core::status::BlockStatus;
use mc_p2p::{PeerAddress, TrustFeedback};

use crate::error::SyncError;
use crate::mode::NetworkMode;
use crate::telemetry::Counters;

/// `IsBlockValid` (§4.4): the proof check always applies; the miner
/// whitelist only applies in `PublicNetwork` mode.
pub fn is_block_valid(
	block: &Block,
	verifier: &dyn BlockVerifier,
	mode: NetworkMode,
	whitelist: &HashSet<Identity>,
) -> bool {
	if !verifier.verify(block) {
		return false;
	}
	match mode {
		NetworkMode::PublicNetwork => whitelist.contains(&block.miner),
		NetworkMode::PrivateNetwork | NetworkMode::Standalone => true,
	}
}

/// The single-block push path: a block arrived on the gossip channel.
/// Recomputes the digest first -- §4.2: "never trusts the sender's hash
/// field" -- then validates, gives trust feedback, and inserts.
#[allow(clippy::too_many_arguments)]
pub fn on_gossip_block(
	chain: &mc_chain::ChainStore,
	verifier: &dyn BlockVerifier,
	trust: &dyn TrustFeedback,
	counters: &Counters,
	mode: NetworkMode,
	whitelist: &HashSet<Identity>,
	from: &PeerAddress,
	mut block: Block,
) -> BlockStatus {
	block.update_digest();
	counters.incr_recv_block_total();

	if !is_block_valid(&block, verifier, mode, whitelist) {
		counters.incr_recv_block_invalid_total();
		return BlockStatus::Invalid;
	}

	trust.good(from);
	let status = chain.add_block(block, verifier);
	match status {
		BlockStatus::Added => counters.incr_recv_block_valid_total(),
		BlockStatus::Loose => counters.incr_recv_block_loose_total(),
		BlockStatus::Duplicate => counters.incr_recv_block_duplicate_total(),
		BlockStatus::Invalid => counters.incr_recv_block_invalid_total(),
	}
	status
}

/// The batch path used by the sync machine's own phases. Every block must
/// already carry a correct hash (it came from `add_block`'s own
/// recompute-and-compare, via the RPC response's wire-deserialised
/// blocks) -- this function's only extra job beyond looping `add_block`
/// is the genesis-network-mismatch guard above.
pub fn ingest_batch(
	chain: &mc_chain::ChainStore,
	verifier: &dyn BlockVerifier,
	counters: &Counters,
	blocks: Vec<Block>,
) -> Result<(), SyncError> {
	for block in &blocks {
		if block.is_genesis() && block.hash != *GENESIS_DIGEST {
			return Err(SyncError::ChainMismatch);
		}
	}

	for block in blocks {
		if block.is_genesis() {
			continue;
		}
		let status = chain.add_block(block, verifier);
		match status {
			BlockStatus::Added => counters.incr_recv_block_valid_total(),
			BlockStatus::Loose => counters.incr_recv_block_loose_total(),
			BlockStatus::Duplicate => counters.incr_recv_block_duplicate_total(),
			BlockStatus::Invalid => counters.incr_recv_block_invalid_total(),
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use mc_chain::ChainStore;
	use mc_core::block::{AlwaysInvalid, AlwaysValid, BlockBody, ProofOfWork};
	use mc_core::digest::Digest;
	use mc_p2p::trust::test_support::RecordingTrust;

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

	#[test]
	fn gossip_block_with_tampered_hash_is_recomputed_not_trusted() {
		let store = ChainStore::new(Block::genesis());
		let counters = Counters::default();
		let trust = RecordingTrust::default();
		let mut b = block(1, Block::genesis().hash, 1);
		let honest_hash = b.hash;
		b.hash = Digest::zero();

		let status = on_gossip_block(
			&store,
			&AlwaysValid,
			&trust,
			&counters,
			NetworkMode::PrivateNetwork,
			&HashSet::new(),
			&"peer-a".to_string(),
			b,
		);
		assert_eq!(status, BlockStatus::Added);
		assert!(store.get_block(&honest_hash).is_some());
	}

	#[test]
	fn invalid_proof_increments_invalid_counter_and_gives_no_trust() {
		let store = ChainStore::new(Block::genesis());
		let counters = Counters::default();
		let trust = RecordingTrust::default();
		let b = block(1, Block::genesis().hash, 1);

		let status = on_gossip_block(
			&store,
			&AlwaysInvalid,
			&trust,
			&counters,
			NetworkMode::PrivateNetwork,
			&HashSet::new(),
			&"peer-a".to_string(),
			b,
		);
		assert_eq!(status, BlockStatus::Invalid);
		assert_eq!(counters.snapshot().recv_block_invalid_total, 1);
		assert!(trust.good.lock().unwrap().is_empty());
	}

	#[test]
	fn public_network_rejects_unwhitelisted_miner() {
		let store = ChainStore::new(Block::genesis());
		let counters = Counters::default();
		let trust = RecordingTrust::default();
		let b = block(1, Block::genesis().hash, 1);

		let status = on_gossip_block(
			&store,
			&AlwaysValid,
			&trust,
			&counters,
			NetworkMode::PublicNetwork,
			&HashSet::new(),
			&"peer-a".to_string(),
			b,
		);
		assert_eq!(status, BlockStatus::Invalid);
	}

	#[test]
	fn batch_rejects_whole_batch_on_genesis_mismatch() {
		let store = ChainStore::new(Block::genesis());
		let counters = Counters::default();
		let wrong_genesis = block(0, Digest::zero(), 0xFF);
		let b1 = block(1, Block::genesis().hash, 1);

		let err = ingest_batch(&store, &AlwaysValid, &counters, vec![wrong_genesis, b1.clone()]).unwrap_err();
		assert!(matches!(err, SyncError::ChainMismatch));
		assert!(store.get_block(&b1.hash).is_none());
	}

	#[test]
	fn batch_skips_the_real_genesis_without_calling_add_block() {
		let store = ChainStore::new(Block::genesis());
		let counters = Counters::default();
		let b1 = block(1, Block::genesis().hash, 1);
		ingest_batch(&store, &AlwaysValid, &counters, vec![Block::genesis(), b1.clone()]).unwrap();
		assert!(store.get_block(&b1.hash).is_some());
	}
}
