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

//! End-to-end exercises of `ChainStore` against a durable `LmdbPersister`,
//! covering the replay path that the in-module unit tests (built only
//! against `MemoryPersister`) don't reach.

use std::sync::Arc;

use mc_chain::{ChainStore, LmdbPersister};
use mc_core::block::{AlwaysValid, Block, BlockBody, Identity, ProofOfWork};
use mc_core::digest::Digest;
use mc_core::status::BlockStatus;

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
fn a_store_restarted_against_the_same_lmdb_directory_keeps_its_chain() {
	let dir = tempfile::tempdir().unwrap();
	let genesis = Block::genesis();

	let path = dir.path().to_str().unwrap();

	{
		let persister = Arc::new(LmdbPersister::open(path).unwrap());
		let store = ChainStore::with_persister(genesis.clone(), persister);
		let b1 = block(1, genesis.hash, 1);
		let b2 = block(2, b1.hash, 2);
		assert_eq!(store.add_block(b1, &AlwaysValid), BlockStatus::Added);
		assert_eq!(store.add_block(b2.clone(), &AlwaysValid), BlockStatus::Added);
		assert_eq!(store.get_heaviest_block_hash(), b2.hash);
	}

	let persister = Arc::new(LmdbPersister::open(path).unwrap());
	let restarted = ChainStore::with_persister(genesis.clone(), persister);
	let heaviest = restarted.get_heaviest_chain(10);
	let numbers: Vec<u64> = heaviest.iter().map(|b| b.block_number).collect();
	assert_eq!(numbers, vec![2, 1, 0]);
}

#[test]
fn loose_blocks_surviving_a_restart_still_flush_once_their_parent_arrives() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().to_str().unwrap();
	let genesis = Block::genesis();
	let b1 = block(1, genesis.hash, 1);
	let b2 = block(2, b1.hash, 2);

	{
		let persister = Arc::new(LmdbPersister::open(path).unwrap());
		let store = ChainStore::with_persister(genesis.clone(), persister);
		// b1 is never submitted in this process: b2 persists as loose.
		assert_eq!(store.add_block(b2.clone(), &AlwaysValid), BlockStatus::Loose);
	}

	let persister = Arc::new(LmdbPersister::open(path).unwrap());
	let restarted = ChainStore::with_persister(genesis.clone(), persister);
	assert!(restarted.has_missing_blocks());
	assert_eq!(restarted.add_block(b1, &AlwaysValid), BlockStatus::Added);
	assert!(!restarted.has_missing_blocks());
	assert_eq!(restarted.get_heaviest_block_hash(), b2.hash);
}

#[test]
fn a_block_flushed_from_the_loose_pool_is_not_persisted_twice() {
	// b2 arrives loose (persisted once, by `add_block`'s own append),
	// then b1 arrives and flushes it into `linked`. If the flush path
	// re-persisted b2, the log would hold two records for it, and a
	// restart would re-link it a second time -- turning its one real
	// sibling-less parent-child edge into a spurious fork.
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().to_str().unwrap();
	let genesis = Block::genesis();
	let b1 = block(1, genesis.hash, 1);
	let b2 = block(2, b1.hash, 2);
	let b3 = block(3, b2.hash, 3);

	{
		let persister = Arc::new(LmdbPersister::open(path).unwrap());
		let store = ChainStore::with_persister(genesis.clone(), persister);
		assert_eq!(store.add_block(b2.clone(), &AlwaysValid), BlockStatus::Loose);
		assert_eq!(store.add_block(b1.clone(), &AlwaysValid), BlockStatus::Added);
		assert_eq!(store.get_heaviest_block_hash(), b2.hash);
	}

	let persister = Arc::new(LmdbPersister::open(path).unwrap());
	let restarted = ChainStore::with_persister(genesis.clone(), persister);
	assert_eq!(restarted.get_heaviest_block_hash(), b2.hash);

	// A duplicate b2 record would have inserted a second, identical-hash
	// child under b1, making the forward walk from b1 see a tie and
	// report the ambiguous (all-zero) sentinel instead of b2's real,
	// unique hash with a clean "reached the tip" next_hash.
	let (forward, next) = restarted.time_travel(b1.hash, 1);
	assert_eq!(forward.len(), 1);
	assert_eq!(forward[0].hash, b2.hash);
	assert_eq!(next, *mc_core::digest::GENESIS_DIGEST);

	// The chain must still accept b2's real child cleanly after restart.
	assert_eq!(restarted.add_block(b3.clone(), &AlwaysValid), BlockStatus::Added);
	assert_eq!(restarted.get_heaviest_block_hash(), b3.hash);
}
