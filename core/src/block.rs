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

//! The block record itself: identity, parent link, and the opaque
//! transaction body the core never interprets.

use crate::codec::{Error as CodecError, Readable, Reader, Writeable, Writer};
use crate::digest::Digest;

/// Opaque miner/producer identity. The core never interprets these bytes —
/// whitelisting (public-network mode) and signature verification are the
/// embedder's concern.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Identity(pub Vec<u8>);

impl Identity {
	pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Identity {
		Identity(bytes.into())
	}
}

impl Writeable for Identity {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), CodecError> {
		writer.write_bytes(&self.0)
	}
}

impl Readable for Identity {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, CodecError> {
		Ok(Identity(reader.read_bytes()?))
	}
}

/// Opaque proof-of-work attachment. Real proof verification (hash puzzles,
/// signatures, whatever the consensus rule actually is) lives outside this
/// core — see `BlockVerifier`. This type only carries the bytes the
/// producer stamped onto the block so they survive the wire round-trip.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ProofOfWork(pub Vec<u8>);

impl Writeable for ProofOfWork {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), CodecError> {
		writer.write_bytes(&self.0)
	}
}

impl Readable for ProofOfWork {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, CodecError> {
		Ok(ProofOfWork(reader.read_bytes()?))
	}
}

/// A single slice of opaque transaction bytes. The core treats these as
/// cargo: it never parses, executes, or validates them (§1 out of scope).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TransactionSlice(pub Vec<Vec<u8>>);

impl Writeable for TransactionSlice {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), CodecError> {
		writer.write_u64(self.0.len() as u64)?;
		for tx in &self.0 {
			writer.write_bytes(tx)?;
		}
		Ok(())
	}
}

impl Readable for TransactionSlice {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, CodecError> {
		let len = reader.read_u64()? as usize;
		let mut txs = Vec::with_capacity(len.min(4096));
		for _ in 0..len {
			txs.push(reader.read_bytes()?);
		}
		Ok(TransactionSlice(txs))
	}
}

/// The block body: a sequence of transaction slices, opaque to the core.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct BlockBody {
	pub slices: Vec<TransactionSlice>,
}

impl BlockBody {
	pub fn empty() -> BlockBody {
		BlockBody { slices: Vec::new() }
	}

	/// Total number of individual transactions across all slices. Used only
	/// for logging (§4.4 debug trace of received blocks).
	pub fn transaction_count(&self) -> usize {
		self.slices.iter().map(|s| s.0.len()).sum()
	}
}

impl Writeable for BlockBody {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), CodecError> {
		self.slices.write(writer)
	}
}

impl Readable for BlockBody {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, CodecError> {
		Ok(BlockBody {
			slices: Readable::read(reader)?,
		})
	}
}

/// A block in the main chain. `hash` is derived from the other fields via
/// `update_digest` — callers must never trust a `hash` they didn't compute
/// themselves from a block received over the wire (§4.2 gossip handler).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Block {
	pub hash: Digest,
	pub previous_hash: Digest,
	pub block_number: u64,
	pub miner: Identity,
	pub proof: ProofOfWork,
	pub body: BlockBody,
}

impl Block {
	/// Builds the canonical genesis block: `block_number == 0`, every other
	/// field at its default value. Its hash is always
	/// `crate::digest::GENESIS_DIGEST` -- not because genesis is exempt
	/// from `update_digest`, but because hashing its (entirely default)
	/// fields happens to reproduce the same fixed preimage that constant
	/// is defined from.
	pub fn genesis() -> Block {
		let mut b = Block {
			hash: Digest::zero(),
			previous_hash: Digest::zero(),
			block_number: 0,
			miner: Identity::default(),
			proof: ProofOfWork::default(),
			body: BlockBody::empty(),
		};
		b.update_digest();
		b
	}

	/// True iff this is the well-known initial block.
	pub fn is_genesis(&self) -> bool {
		self.block_number == 0
	}

	/// Recomputes `hash` from every other field, discarding whatever hash was
	/// there before. The only way a `Block`'s `hash` should ever be set.
	pub fn update_digest(&mut self) {
		self.hash = self.compute_digest();
	}

	/// Computes what `hash` should be, without mutating `self`. Used both by
	/// `update_digest` and by callers that want to check a wire `Block`
	/// against its claimed hash without accepting the claim (P1: for every
	/// block returned by any query, `compute_digest(block) == block.hash`).
	pub fn compute_digest(&self) -> Digest {
		let mut body_bytes = Vec::new();
		// Body contents feed into the digest positionally; a codec Writer
		// would do, but hashing happens before we know we even want to wire
		// this block, so we hash a cheap ad hoc encoding instead.
		body_bytes.extend_from_slice(&self.previous_hash.as_bytes()[..]);
		body_bytes.extend_from_slice(&self.block_number.to_be_bytes());
		body_bytes.extend_from_slice(&self.miner.0);
		body_bytes.extend_from_slice(&self.proof.0);
		for slice in &self.body.slices {
			for tx in &slice.0 {
				body_bytes.extend_from_slice(tx);
			}
		}
		Digest::hash_bytes(&body_bytes)
	}
}

/// Verifies a block's proof of work / signature. Real verification is a
/// pure, external concern (§1); this trait is the seam the chain store and
/// gossip handler call through, so tests can substitute `AlwaysValid` /
/// `AlwaysInvalid` without any real cryptography.
pub trait BlockVerifier: Send + Sync {
	fn verify(&self, block: &Block) -> bool;
}

/// A verifier that accepts every block. Useful as the default in contexts
/// that only care about chain-store mechanics, not proof validity.
#[derive(Default)]
pub struct AlwaysValid;

impl BlockVerifier for AlwaysValid {
	fn verify(&self, _block: &Block) -> bool {
		true
	}
}

/// A verifier that rejects every block. Used in tests exercising the
/// `Invalid` status path.
#[derive(Default)]
pub struct AlwaysInvalid;

impl BlockVerifier for AlwaysInvalid {
	fn verify(&self, _block: &Block) -> bool {
		false
	}
}

const BLOCK_FIELD_HASH: u8 = 1;
const BLOCK_FIELD_PREVIOUS_HASH: u8 = 2;
const BLOCK_FIELD_BLOCK_NUMBER: u8 = 3;
const BLOCK_FIELD_MINER: u8 = 4;
const BLOCK_FIELD_PROOF: u8 = 5;
const BLOCK_FIELD_BODY: u8 = 6;

impl Writeable for Block {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), CodecError> {
		writer.write_field(BLOCK_FIELD_HASH, |w| self.hash.write(w))?;
		writer.write_field(BLOCK_FIELD_PREVIOUS_HASH, |w| self.previous_hash.write(w))?;
		writer.write_field(BLOCK_FIELD_BLOCK_NUMBER, |w| w.write_u64(self.block_number))?;
		writer.write_field(BLOCK_FIELD_MINER, |w| self.miner.write(w))?;
		writer.write_field(BLOCK_FIELD_PROOF, |w| self.proof.write(w))?;
		writer.write_field(BLOCK_FIELD_BODY, |w| self.body.write(w))?;
		Ok(())
	}
}

impl Readable for Block {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, CodecError> {
		reader.expect_key(BLOCK_FIELD_HASH)?;
		let hash = Digest::read(reader)?;
		reader.expect_key(BLOCK_FIELD_PREVIOUS_HASH)?;
		let previous_hash = Digest::read(reader)?;
		reader.expect_key(BLOCK_FIELD_BLOCK_NUMBER)?;
		let block_number = reader.read_u64()?;
		reader.expect_key(BLOCK_FIELD_MINER)?;
		let miner = Identity::read(reader)?;
		reader.expect_key(BLOCK_FIELD_PROOF)?;
		let proof = ProofOfWork::read(reader)?;
		reader.expect_key(BLOCK_FIELD_BODY)?;
		let body = BlockBody::read(reader)?;
		Ok(Block {
			hash,
			previous_hash,
			block_number,
			miner,
			proof,
			body,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::{deserialize, serialize};

	fn sample_block(number: u64, previous: Digest) -> Block {
		let mut b = Block {
			hash: Digest::zero(),
			previous_hash: previous,
			block_number: number,
			miner: Identity::from_bytes(vec![1, 2, 3]),
			proof: ProofOfWork(vec![0xAB; 4]),
			body: BlockBody::empty(),
		};
		b.update_digest();
		b
	}

	#[test]
	fn genesis_hash_matches_the_compile_time_constant() {
		assert_eq!(Block::genesis().hash, *crate::digest::GENESIS_DIGEST);
	}

	#[test]
	fn is_genesis_iff_number_zero() {
		let genesis = sample_block(0, Digest::zero());
		let child = sample_block(1, genesis.hash);
		assert!(genesis.is_genesis());
		assert!(!child.is_genesis());
	}

	#[test]
	fn update_digest_is_deterministic_and_order_sensitive() {
		let a = sample_block(1, Digest::zero());
		let mut b = a.clone();
		b.block_number = 2;
		b.update_digest();
		assert_ne!(a.hash, b.hash);
	}

	#[test]
	fn compute_digest_matches_stored_hash_for_honest_block() {
		let b = sample_block(5, Digest::hash_bytes(b"parent"));
		assert_eq!(b.compute_digest(), b.hash);
	}

	#[test]
	fn tampered_hash_is_detected_by_recompute() {
		let mut b = sample_block(5, Digest::hash_bytes(b"parent"));
		b.hash = Digest::zero();
		assert_ne!(b.compute_digest(), b.hash);
	}

	#[test]
	fn block_roundtrips_through_codec() {
		let b = sample_block(7, Digest::hash_bytes(b"parent"));
		let bytes = serialize(&b).unwrap();
		let back: Block = deserialize(&bytes).unwrap();
		assert_eq!(b, back);
	}
}
