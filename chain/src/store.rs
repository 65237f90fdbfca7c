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

//! The chain store: an in-memory block index guarded by a single
//! `mc_util::RwLock`, backed by a pluggable [`crate::persist::BlockPersister`]
//! for durability. This is the one place heaviest-tip selection,
//! loose-block reconciliation, and the time-travel/common-ancestor queries
//! live -- everything else in the workspace is a client of it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, trace, warn};

use mc_core::block::{Block, BlockVerifier};
use mc_core::digest::{Digest, GENESIS_DIGEST};
use mc_core::status::BlockStatus;
use mc_util::RwLock;

use crate::error::ChainError;
use crate::persist::{BlockPersister, MemoryPersister};

/// Hard cap on the number of loose (parent-not-yet-seen) blocks the store
/// will hold at once. §9 Design Note flags unbounded loose storage as an
/// open question under adversarial peers; this spec resolves it with a
/// cap and an eviction policy (see `DESIGN.md`): once the cap is reached,
/// the oldest loose block (by insertion order) is dropped to make room
/// for the newest arrival, rather than refusing the newest.
pub const MAX_LOOSE_BLOCKS: usize = 10_000;

/// A block's position in the weight order used to pick the heaviest tip.
/// §4.1: "depth-and-proof lexicographic order is sufficient for this
/// spec" -- `block_number` dominates, the raw proof bytes break ties.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct Weight(u64, Vec<u8>);

fn weight_of(block: &Block) -> Weight {
	Weight(block.block_number, block.proof.0.clone())
}

struct LinkedBlock {
	block: Arc<Block>,
	weight: Weight,
}

/// Everything the store protects under its lock. Kept as one struct so a
/// single `write()` guard covers a whole `add_block` call, matching the
/// "AddBlock calls are serialised by the chain store's own mutual
/// exclusion" guarantee in §5.
struct Inner {
	linked: HashMap<Digest, LinkedBlock>,
	/// `parent hash -> linked child hashes`, used for the forward walk in
	/// `time_travel` and for flushing loose descendants.
	children: HashMap<Digest, Vec<Digest>>,
	/// Loose blocks, keyed by their own hash.
	loose: HashMap<Digest, Arc<Block>>,
	/// Insertion order of `loose`, oldest first, for the eviction policy.
	loose_order: Vec<Digest>,
	heaviest: Digest,
}

impl Inner {
	fn heaviest_weight(&self) -> &Weight {
		&self.linked[&self.heaviest].weight
	}
}

/// The chain store. Cheap to clone (an `Arc` around the lock and the
/// persister) so it can be shared between the sync machine's task and the
/// gossip-handling task without any of them owning it outright.
pub struct ChainStore {
	inner: RwLock<Inner>,
	persister: Arc<dyn BlockPersister>,
}

impl ChainStore {
	/// Builds a fresh store seeded with `genesis`, persisting nothing
	/// (suitable for tests and for any embedder that re-syncs from peers
	/// on every start).
	pub fn new(genesis: Block) -> ChainStore {
		ChainStore::with_persister(genesis, Arc::new(MemoryPersister::new()))
	}

	/// Builds a store backed by `persister`, replaying any previously
	/// persisted blocks (in append order) on top of `genesis` before
	/// returning. `genesis` itself is not re-persisted if it was already
	/// the first replayed block.
	pub fn with_persister(genesis: Block, persister: Arc<dyn BlockPersister>) -> ChainStore {
		assert!(genesis.is_genesis(), "store must be seeded with a genesis block");
		assert_eq!(
			genesis.compute_digest(),
			genesis.hash,
			"genesis block hash does not match its own fields"
		);

		let mut linked = HashMap::new();
		linked.insert(
			genesis.hash,
			LinkedBlock {
				weight: weight_of(&genesis),
				block: Arc::new(genesis.clone()),
			},
		);
		let store = ChainStore {
			inner: RwLock::new(Inner {
				linked,
				children: HashMap::new(),
				loose: HashMap::new(),
				loose_order: Vec::new(),
				heaviest: genesis.hash,
			}),
			persister,
		};

		match store.persister.replay() {
			Ok(replayed) => {
				for block in replayed {
					if block.hash == genesis.hash {
						continue;
					}
					store.ingest(block);
				}
			}
			Err(e) => warn!("chain store: failed to replay persisted blocks: {e}"),
		}
		store
	}

	/// Inserts `block`, recomputing its weight and flushing any loose
	/// descendants that become linkable. §4.1 preconditions: the block's
	/// `hash` must already match `compute_digest()` and pass `verifier` --
	/// callers that received the block over the wire must have already
	/// recomputed the hash themselves (§4.2/§4.4 never trust a wire hash).
	pub fn add_block(&self, block: Block, verifier: &dyn BlockVerifier) -> BlockStatus {
		if block.compute_digest() != block.hash {
			trace!("chain store: rejecting block {:?}: hash mismatch", block.hash);
			return BlockStatus::Invalid;
		}
		if !verifier.verify(&block) {
			trace!("chain store: rejecting block {:?}: failed proof check", block.hash);
			return BlockStatus::Invalid;
		}

		{
			let inner = self.inner.read();
			if inner.linked.contains_key(&block.hash) || inner.loose.contains_key(&block.hash) {
				return BlockStatus::Duplicate;
			}
		}

		let status = self.ingest(block.clone());
		if !matches!(status, BlockStatus::Invalid | BlockStatus::Duplicate) {
			if let Err(e) = self.persister.append(&block) {
				warn!("chain store: failed to persist block {:?}: {e}", block.hash);
			}
		}
		status
	}

	/// Shared insertion path used both by `add_block` and by persister
	/// replay on startup. Returns the status of `block` itself; loose
	/// descendants flushed as a side effect are logged but their statuses
	/// are not returned (mirrors the original "BFS until a fixed point"
	/// description, which has no separate return channel for the flushed
	/// blocks). Never persists: every block this function ever sees --
	/// including one flushed out of the loose pool -- was already
	/// appended to the durable log the first time it arrived, whether
	/// that was via `add_block`'s own append or via a prior replay.
	/// Persisting again here would duplicate that block's record in the
	/// log under a second sequence number.
	fn ingest(&self, block: Block) -> BlockStatus {
		let mut inner = self.inner.write();

		let is_linked_parent = block.is_genesis() || inner.linked.contains_key(&block.previous_hash);
		if !is_linked_parent {
			if inner.loose.len() >= MAX_LOOSE_BLOCKS {
				let evicted = inner.loose_order.remove(0);
				inner.loose.remove(&evicted);
				debug!("chain store: loose pool full, evicting {evicted:?}");
			}
			let hash = block.hash;
			inner.loose.insert(hash, Arc::new(block));
			inner.loose_order.push(hash);
			return BlockStatus::Loose;
		}

		self.link(&mut inner, block);
		BlockStatus::Added
	}

	/// Links `block` into `linked`, updates the heaviest tip if warranted,
	/// and recursively flushes any loose blocks whose parent is now this
	/// one (BFS until a fixed point, per §4.1 "Loose flush").
	fn link(&self, inner: &mut Inner, block: Block) {
		let hash = block.hash;
		let previous = block.previous_hash;
		let weight = weight_of(&block);

		inner.children.entry(previous).or_default().push(hash);
		inner.linked.insert(
			hash,
			LinkedBlock {
				weight: weight.clone(),
				block: Arc::new(block),
			},
		);
		if weight > *inner.heaviest_weight() {
			inner.heaviest = hash;
		}

		let mut frontier = vec![hash];
		while let Some(parent_hash) = frontier.pop() {
			let waiting: Vec<Digest> = inner
				.loose
				.values()
				.filter(|b| b.previous_hash == parent_hash)
				.map(|b| b.hash)
				.collect();
			for child_hash in waiting {
				let child = inner.loose.remove(&child_hash).expect("just filtered from loose");
				inner.loose_order.retain(|h| *h != child_hash);
				let child_weight = weight_of(&child);
				inner.children.entry(parent_hash).or_default().push(child_hash);
				inner.linked.insert(
					child_hash,
					LinkedBlock {
						weight: child_weight.clone(),
						block: child,
					},
				);
				if child_weight > *inner.heaviest_weight() {
					inner.heaviest = child_hash;
				}
				frontier.push(child_hash);
			}
		}
	}

	/// Returns the stored block for `hash`, if known and linked. Loose
	/// blocks are deliberately not returned here -- they are not yet part
	/// of the chain (§3 Block: "`GetBlock(hash)` returns the same block
	/// object across calls" is specified in terms of chain membership).
	pub fn get_block(&self, hash: &Digest) -> Option<Arc<Block>> {
		self.inner.read().linked.get(hash).map(|lb| lb.block.clone())
	}

	/// Always returns a block -- genesis at worst.
	pub fn get_heaviest_block(&self) -> Arc<Block> {
		let inner = self.inner.read();
		inner.linked[&inner.heaviest].block.clone()
	}

	pub fn get_heaviest_block_hash(&self) -> Digest {
		self.inner.read().heaviest
	}

	/// Up to `max_count` blocks ending at the heaviest tip, tip-first.
	pub fn get_heaviest_chain(&self, max_count: u64) -> Vec<Arc<Block>> {
		let inner = self.inner.read();
		let mut out = Vec::new();
		let mut cursor = inner.heaviest;
		while (out.len() as u64) < max_count {
			let Some(lb) = inner.linked.get(&cursor) else {
				break;
			};
			out.push(lb.block.clone());
			if lb.block.is_genesis() {
				break;
			}
			cursor = lb.block.previous_hash;
		}
		out
	}

	/// Path from `start` walking back until either an ancestor of
	/// `last_seen` is reached or `limit` blocks have been collected.
	/// `start`-first, ancestor-last; ties broken toward the deepest
	/// qualifying ancestor, which the backward walk finds naturally (it
	/// stops at the first -- i.e. closest -- qualifying block).
	pub fn get_path_to_common_ancestor(
		&self,
		start: Digest,
		last_seen: Digest,
		limit: u64,
	) -> Result<Vec<Arc<Block>>, ChainError> {
		let inner = self.inner.read();
		if !inner.linked.contains_key(&start) {
			return Err(ChainError::UnknownStart);
		}

		let ancestors_of_last_seen = self.ancestor_set(&inner, last_seen);

		let mut out = Vec::new();
		let mut cursor = start;
		loop {
			let Some(lb) = inner.linked.get(&cursor) else {
				break;
			};
			out.push(lb.block.clone());
			if ancestors_of_last_seen.contains(&cursor) || (limit > 0 && out.len() as u64 >= limit) {
				break;
			}
			if lb.block.is_genesis() {
				break;
			}
			cursor = lb.block.previous_hash;
		}
		Ok(out)
	}

	/// All ancestors of `hash` (inclusive), walking back to genesis. Empty
	/// if `hash` is unknown -- an unreachable `last_seen` simply never
	/// matches during the common-ancestor walk, which still terminates at
	/// `limit` or genesis.
	fn ancestor_set(&self, inner: &Inner, hash: Digest) -> HashSet<Digest> {
		let mut set = HashSet::new();
		let mut cursor = hash;
		while let Some(lb) = inner.linked.get(&cursor) {
			set.insert(cursor);
			if lb.block.is_genesis() {
				break;
			}
			cursor = lb.block.previous_hash;
		}
		set
	}

	/// The central pull primitive (§4.1). Semantics by sign of `limit`:
	/// see module docs on `crate` / the design spec -- reproduced briefly
	/// here since this is the trickiest piece of the store:
	///
	/// * `limit > 0`: forward walk from `start`, excluding `start` itself.
	///   Stops at the tip (`next_hash = GENESIS_DIGEST` sentinel) or at an
	///   ambiguous fork (`next_hash` empty, tied-weight children).
	/// * `limit < 0`: backward walk from `start`, including `start`.
	///   `next_hash` is the parent of the last block returned.
	/// * `limit == 0`: empty result, empty `next_hash`.
	pub fn time_travel(&self, start: Digest, limit: i64) -> (Vec<Arc<Block>>, Digest) {
		if limit == 0 {
			return (Vec::new(), Digest::zero());
		}
		let inner = self.inner.read();
		if !inner.linked.contains_key(&start) {
			return (Vec::new(), Digest::zero());
		}

		if limit > 0 {
			self.time_travel_forward(&inner, start, limit as u64)
		} else {
			self.time_travel_backward(&inner, start, (-limit) as u64)
		}
	}

	fn time_travel_forward(&self, inner: &Inner, start: Digest, count: u64) -> (Vec<Arc<Block>>, Digest) {
		let mut out = Vec::new();
		let mut cursor = start;
		loop {
			if out.len() as u64 >= count {
				let lb = &inner.linked[&cursor];
				return (out, next_child_hash(inner, lb));
			}
			let children = inner.children.get(&cursor).cloned().unwrap_or_default();
			match heaviest_child(inner, &children) {
				None => {
					// No children: `cursor` is the tip of its chain.
					return (out, *GENESIS_DIGEST);
				}
				Some(None) => {
					// Tied weight among multiple children: ambiguous.
					return (out, Digest::zero());
				}
				Some(Some(next)) => {
					out.push(inner.linked[&next].block.clone());
					cursor = next;
				}
			}
		}
	}

	fn time_travel_backward(&self, inner: &Inner, start: Digest, count: u64) -> (Vec<Arc<Block>>, Digest) {
		let mut out = Vec::new();
		let mut cursor = start;
		loop {
			let lb = &inner.linked[&cursor];
			out.push(lb.block.clone());
			if out.len() as u64 >= count || lb.block.is_genesis() {
				let next_hash = if lb.block.is_genesis() {
					Digest::zero()
				} else {
					lb.block.previous_hash
				};
				return (out, next_hash);
			}
			cursor = lb.block.previous_hash;
		}
	}

	/// Hashes of loose blocks whose parent has never been seen at all --
	/// i.e. the root of each disconnected loose subtree, not every block
	/// in it.
	pub fn get_missing_tips(&self) -> HashSet<Digest> {
		let inner = self.inner.read();
		inner
			.loose
			.values()
			.filter(|b| !inner.linked.contains_key(&b.previous_hash) && !inner.loose.contains_key(&b.previous_hash))
			.map(|b| b.hash)
			.collect()
	}

	pub fn has_missing_blocks(&self) -> bool {
		!self.get_missing_tips().is_empty()
	}
}

/// Picks the unique heaviest of `children` (all linked). `None` if there
/// are no children; `Some(None)` if the heaviest is ambiguous (a tie);
/// `Some(Some(hash))` otherwise.
fn heaviest_child(inner: &Inner, children: &[Digest]) -> Option<Option<Digest>> {
	if children.is_empty() {
		return None;
	}
	let mut best: Option<(&Digest, &Weight)> = None;
	let mut tied = false;
	for hash in children {
		let weight = &inner.linked[hash].weight;
		match best {
			None => best = Some((hash, weight)),
			Some((_, best_weight)) if *weight > *best_weight => {
				best = Some((hash, weight));
				tied = false;
			}
			Some((_, best_weight)) if *weight == *best_weight => tied = true,
			_ => {}
		}
	}
	if tied {
		Some(None)
	} else {
		best.map(|(hash, _)| Some(*hash))
	}
}

fn next_child_hash(inner: &Inner, lb: &LinkedBlock) -> Digest {
	match inner.children.get(&lb.block.hash) {
		None => *GENESIS_DIGEST,
		Some(children) => match heaviest_child(inner, children) {
			None | Some(None) => Digest::zero(),
			Some(Some(hash)) => hash,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use mc_core::block::{AlwaysInvalid, AlwaysValid, BlockBody, Identity, ProofOfWork};

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

	fn genesis() -> Block {
		block(0, Digest::zero(), 0)
	}

	#[test]
	fn scenario1_genesis_only() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		assert_eq!(*store.get_heaviest_block(), genesis);
		let (blocks, next) = store.time_travel(genesis.hash, 10);
		assert_eq!(blocks, vec![]);
		assert_eq!(next, *GENESIS_DIGEST);
	}

	#[test]
	fn scenario2_linear_chain() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		let mut prev = genesis.hash;
		let mut blocks = Vec::new();
		for n in 1..=5u64 {
			let b = block(n, prev, n as u8);
			prev = b.hash;
			blocks.push(b.clone());
			assert_eq!(store.add_block(b, &AlwaysValid), BlockStatus::Added);
		}

		let heaviest = store.get_heaviest_chain(3);
		let numbers: Vec<u64> = heaviest.iter().map(|b| b.block_number).collect();
		assert_eq!(numbers, vec![5, 4, 3]);

		let (tt, next) = store.time_travel(blocks[1].hash, 2);
		let tt_numbers: Vec<u64> = tt.iter().map(|b| b.block_number).collect();
		assert_eq!(tt_numbers, vec![3, 4]);
		assert_eq!(next, blocks[4].hash);
	}

	#[test]
	fn scenario3_loose_then_linked() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		let b1 = block(1, genesis.hash, 1);
		let b2 = block(2, b1.hash, 2);
		let b3 = block(3, b2.hash, 3);

		assert_eq!(store.add_block(b1.clone(), &AlwaysValid), BlockStatus::Added);
		assert_eq!(store.add_block(b3.clone(), &AlwaysValid), BlockStatus::Loose);
		assert!(store.has_missing_blocks());
		assert_eq!(store.add_block(b2.clone(), &AlwaysValid), BlockStatus::Added);

		assert!(!store.has_missing_blocks());
		assert!(store.get_block(&b3.hash).is_some());
	}

	#[test]
	fn scenario4_fork_unique_heaviest() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		let b1 = block(1, genesis.hash, 1);
		store.add_block(b1.clone(), &AlwaysValid);
		let b2a = block(2, b1.hash, 0xAA);
		let b2b = block(2, b1.hash, 0x01);
		store.add_block(b2a.clone(), &AlwaysValid);
		store.add_block(b2b.clone(), &AlwaysValid);
		let b3a = block(3, b2a.hash, 1);
		store.add_block(b3a.clone(), &AlwaysValid);

		assert_eq!(store.get_heaviest_block_hash(), b3a.hash);
		let chain = store.get_heaviest_chain(4);
		let hashes: Vec<Digest> = chain.iter().map(|b| b.hash).collect();
		assert_eq!(hashes, vec![b3a.hash, b2a.hash, b1.hash, genesis.hash]);
	}

	#[test]
	fn duplicate_add_is_idempotent() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		let b1 = block(1, genesis.hash, 1);
		assert_eq!(store.add_block(b1.clone(), &AlwaysValid), BlockStatus::Added);
		assert_eq!(store.add_block(b1.clone(), &AlwaysValid), BlockStatus::Duplicate);
		assert_eq!(store.get_heaviest_block_hash(), b1.hash);
	}

	#[test]
	fn invalid_proof_is_rejected() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		let b1 = block(1, genesis.hash, 1);
		assert_eq!(store.add_block(b1, &AlwaysInvalid), BlockStatus::Invalid);
		assert_eq!(store.get_heaviest_block_hash(), genesis.hash);
	}

	#[test]
	fn ambiguous_forward_reference_enters_phase_b() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		let b1 = block(1, genesis.hash, 1);
		store.add_block(b1.clone(), &AlwaysValid);
		// Same proof bytes on both children -> tied weight, genuinely
		// ambiguous which one is "heaviest" at this depth.
		let b2a = block(2, b1.hash, 9);
		let b2b = block(2, b1.hash, 9);
		store.add_block(b2a, &AlwaysValid);
		// b2b has a different hash (different miner identity would be
		// needed for a true tie with distinct blocks); construct it with a
		// distinct previous-hash-independent salt but equal proof weight.
		let mut b2b = b2b;
		b2b.miner = Identity::from_bytes(vec![0xFF]);
		b2b.update_digest();
		store.add_block(b2b, &AlwaysValid);

		let (blocks, next) = store.time_travel(b1.hash, 5);
		assert_eq!(blocks.len(), 0);
		assert!(next.is_zero());
	}

	#[test]
	fn backward_time_travel_includes_start() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		let mut prev = genesis.hash;
		let mut hashes = vec![genesis.hash];
		for n in 1..=5u64 {
			let b = block(n, prev, n as u8);
			prev = b.hash;
			hashes.push(b.hash);
			store.add_block(b, &AlwaysValid);
        }
		let (blocks, next) = store.time_travel(hashes[4], -2);
		let numbers: Vec<u64> = blocks.iter().map(|b| b.block_number).collect();
		assert_eq!(numbers, vec![4, 3]);
		assert_eq!(next, hashes[2]);
	}

	#[test]
	fn missing_tips_only_reports_root_of_loose_subtree() {
		let genesis = genesis();
		let store = ChainStore::new(genesis.clone());
		let b1 = block(1, genesis.hash, 1);
		let b2 = block(2, b1.hash, 2);
		let b3 = block(3, b2.hash, 3);
		// b1 never arrives: b2 and b3 are both loose, but only b2's parent
		// (b1) has genuinely never been seen.
		store.add_block(b3.clone(), &AlwaysValid);
		store.add_block(b2.clone(), &AlwaysValid);

		let tips = store.get_missing_tips();
		assert_eq!(tips, HashSet::from([b2.hash]));
	}
}
