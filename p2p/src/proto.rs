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

//! The three RPC endpoints (§4.2/§6) and the wire types they trade in.
//!
//! The protocol is modelled as a plain trait (`MainChainProtocol`)
//! implemented against a `&dyn ChainReader` -- the read-only subset of
//! `mc_chain::ChainStore`'s API this surface actually needs -- so the whole
//! thing is exercisable in unit tests without any networking, the same way
//! the gossip and sync code sit behind trait seams rather than concrete
//! servers.

use std::sync::Arc;

use mc_chain::store::ChainStore;
use mc_chain::ChainError;
use mc_core::block::Block;
use mc_core::codec::{Error as CodecError, Readable, Reader, Writeable, Writer};
use mc_core::digest::Digest;

/// Service identifier this protocol is exposed under.
pub const SERVICE_MAIN_CHAIN: &str = "MAIN_CHAIN";
/// Request/response channel name within the service.
pub const CHANNEL_RPC: &str = "RPC";
/// Publish/subscribe channel new blocks are gossiped on.
pub const CHANNEL_BLOCKS: &str = "BLOCKS";
/// Protocol identifier within `SERVICE_MAIN_CHAIN` that the three RPC
/// endpoints are registered under.
pub const RPC_MAIN_CHAIN: &str = "MAIN_CHAIN";

/// Endpoint id: `GetHeaviestChain`.
pub const ENDPOINT_HEAVIEST_CHAIN: u8 = 1;
/// Endpoint id: `TimeTravel`.
pub const ENDPOINT_TIME_TRAVEL: u8 = 2;
/// Endpoint id: `GetPathToCommonAncestor`.
pub const ENDPOINT_COMMON_SUB_CHAIN: u8 = 3;

/// The server may cap any `HEAVIEST_CHAIN`/`TIME_TRAVEL` request larger
/// than this.
pub const MAX_CHAIN_REQUEST_SIZE: u64 = 10_000;
/// The server may cap any `COMMON_SUB_CHAIN` request larger than this.
pub const MAX_SUB_CHAIN_SIZE: u64 = 1_000;

/// The read-only subset of the chain store the RPC surface needs. Kept
/// separate from the full `ChainStore` API so the protocol layer can't
/// accidentally reach for a mutating method.
pub trait ChainReader: Send + Sync {
	fn get_heaviest_chain(&self, max_count: u64) -> Vec<Arc<Block>>;
	fn time_travel(&self, start: Digest, limit: i64) -> (Vec<Arc<Block>>, Digest);
	fn get_path_to_common_ancestor(
		&self,
		start: Digest,
		last_seen: Digest,
		limit: u64,
	) -> Result<Vec<Arc<Block>>, ChainError>;
}

impl ChainReader for ChainStore {
	fn get_heaviest_chain(&self, max_count: u64) -> Vec<Arc<Block>> {
		ChainStore::get_heaviest_chain(self, max_count)
	}
	fn time_travel(&self, start: Digest, limit: i64) -> (Vec<Arc<Block>>, Digest) {
		ChainStore::time_travel(self, start, limit)
	}
	fn get_path_to_common_ancestor(
		&self,
		start: Digest,
		last_seen: Digest,
		limit: u64,
	) -> Result<Vec<Arc<Block>>, ChainError> {
		ChainStore::get_path_to_common_ancestor(self, start, last_seen, limit)
	}
}

/// The response envelope of endpoint 2, `TIME_TRAVEL`.
///
/// `next_hash` is deliberately overloaded (§9 Design Note): empty means
/// "ambiguous forward reference", `GENESIS_DIGEST` means "you have reached
/// the tip", anything else is a real hash to continue from. `proceed` is
/// reserved: always `true`, never branched on (§9 Open Question).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Travelogue {
	pub blocks: Vec<Block>,
	pub next_hash: Digest,
	pub proceed: bool,
}

const TRAVELOGUE_FIELD_BLOCKS: u8 = 1;
const TRAVELOGUE_FIELD_NEXT_HASH: u8 = 2;
const TRAVELOGUE_FIELD_PROCEED: u8 = 3;

impl Writeable for Travelogue {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), CodecError> {
		writer.write_field(TRAVELOGUE_FIELD_BLOCKS, |w| self.blocks.write(w))?;
		writer.write_field(TRAVELOGUE_FIELD_NEXT_HASH, |w| self.next_hash.write(w))?;
		writer.write_field(TRAVELOGUE_FIELD_PROCEED, |w| w.write_bool(self.proceed))?;
		Ok(())
	}
}

impl Readable for Travelogue {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, CodecError> {
		reader.expect_key(TRAVELOGUE_FIELD_BLOCKS)?;
		let blocks = Vec::<Block>::read(reader)?;
		reader.expect_key(TRAVELOGUE_FIELD_NEXT_HASH)?;
		let next_hash = Digest::read(reader)?;
		reader.expect_key(TRAVELOGUE_FIELD_PROCEED)?;
		let proceed = reader.read_bool()?;
		Ok(Travelogue {
			blocks,
			next_hash,
			proceed,
		})
	}
}

/// Implements the three server-side endpoints against a `ChainReader`.
/// Stateless beyond the reader it's handed, so embedders can build one per
/// incoming request.
pub struct MainChainProtocol<'a> {
	chain: &'a dyn ChainReader,
}

impl<'a> MainChainProtocol<'a> {
	pub fn new(chain: &'a dyn ChainReader) -> MainChainProtocol<'a> {
		MainChainProtocol { chain }
	}

	/// Endpoint 1: the heaviest chain, genesis-direction first, capped at
	/// `MAX_CHAIN_REQUEST_SIZE`.
	pub fn heaviest_chain(&self, max_count: u64) -> Vec<Block> {
		let capped = max_count.min(MAX_CHAIN_REQUEST_SIZE);
		let mut blocks = self.chain.get_heaviest_chain(capped);
		blocks.reverse();
		blocks.into_iter().map(|b| (*b).clone()).collect()
	}

	/// Endpoint 2: forward/backward walk per §4.1. Positive `limit` is
	/// capped at `MAX_CHAIN_REQUEST_SIZE`; negative `limit` is capped in
	/// magnitude the same way.
	pub fn time_travel(&self, start: Digest, limit: i64) -> Travelogue {
		let capped = cap_limit(limit);
		let (blocks, next_hash) = self.chain.time_travel(start, capped);
		Travelogue {
			blocks: blocks.into_iter().map(|b| (*b).clone()).collect(),
			next_hash,
			proceed: true,
		}
	}

	/// Endpoint 3: path from `start` back to the common ancestor with
	/// `last_seen`, ancestor-first on the wire. Empty on failure (unknown
	/// `start`), matching the RPC contract's use of an empty sequence as
	/// its failure signal rather than propagating `ChainError`.
	pub fn common_sub_chain(&self, start: Digest, last_seen: Digest, limit: u64) -> Vec<Block> {
		let capped = limit.min(MAX_SUB_CHAIN_SIZE);
		let mut blocks = match self.chain.get_path_to_common_ancestor(start, last_seen, capped) {
			Ok(blocks) => blocks,
			Err(_) => return Vec::new(),
		};
		blocks.reverse();
		blocks.into_iter().map(|b| (*b).clone()).collect()
	}
}

fn cap_limit(limit: i64) -> i64 {
	if limit > 0 {
		limit.min(MAX_CHAIN_REQUEST_SIZE as i64)
	} else if limit < 0 {
		limit.max(-(MAX_CHAIN_REQUEST_SIZE as i64))
	} else {
		0
	}
}
