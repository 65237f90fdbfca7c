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

//! Block identity: a fixed-size cryptographic digest, plus the genesis
//! sentinel every non-loose block must ultimately trace back to.

use std::fmt;
use std::str::FromStr;

use blake2_rfc::blake2b::blake2b;

/// Number of bytes in a `Digest`.
pub const DIGEST_LEN: usize = 32;

lazy_static::lazy_static! {
	/// The well-known hash of the canonical genesis block (`block_number ==
	/// 0`, every other field at its default value -- see
	/// `mc_core::block::genesis`). Fixed across the whole network: every
	/// node's chain store is seeded with the same genesis, so this digest
	/// identifies it without either peer having to ask the other first.
	///
	/// Deliberately overloaded on the wire (§9 Design Note): as a
	/// `next_hash` value it also means "you have reached the tip" during a
	/// forward `TimeTravel`, distinct from both a real hash and the
	/// all-zero "ambiguous" sentinel (`Digest::zero`).
	pub static ref GENESIS_DIGEST: Digest = Digest::hash_bytes(&[0u8; 40]);
}

/// Opaque, fixed-size block hash. Equality is byte equality.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
	/// Wraps raw bytes as a digest.
	pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Digest {
		Digest(bytes)
	}

	/// The all-zero digest. Used as the genesis block's `previous_hash` and
	/// as the empty/unset sentinel for `Travelogue::next_hash`.
	pub const fn zero() -> Digest {
		Digest([0u8; DIGEST_LEN])
	}

	/// True if this is the all-zero sentinel (an "empty" digest on the wire).
	pub fn is_zero(&self) -> bool {
		self.0 == [0u8; DIGEST_LEN]
	}

	/// Byte view of this digest.
	pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
		&self.0
	}

	/// Hashes an arbitrary byte slice into a digest. The one-way function
	/// used throughout this crate to derive `Block::hash` from its other
	/// fields; never used to verify a proof of work (that is an external,
	/// out-of-scope concern — see `crate::block::BlockVerifier`).
	pub fn hash_bytes(data: &[u8]) -> Digest {
		let out = blake2b(DIGEST_LEN, &[], data);
		let mut bytes = [0u8; DIGEST_LEN];
		bytes.copy_from_slice(out.as_bytes());
		Digest(bytes)
	}
}

impl fmt::Debug for Digest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Digest({})", hex::encode(self.0))
	}
}

impl fmt::Display for Digest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", hex::encode(self.0))
	}
}

/// Error returned when parsing a `Digest` from a hex string.
#[derive(Debug, thiserror::Error)]
pub enum DigestParseError {
	#[error("invalid hex: {0}")]
	Hex(#[from] hex::FromHexError),
	#[error("expected {DIGEST_LEN} bytes, got {0}")]
	WrongLength(usize),
}

impl FromStr for Digest {
	type Err = DigestParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let bytes = hex::decode(s)?;
		if bytes.len() != DIGEST_LEN {
			return Err(DigestParseError::WrongLength(bytes.len()));
		}
		let mut out = [0u8; DIGEST_LEN];
		out.copy_from_slice(&bytes);
		Ok(Digest(out))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash_is_deterministic() {
		let a = Digest::hash_bytes(b"hello");
		let b = Digest::hash_bytes(b"hello");
		assert_eq!(a, b);
	}

	#[test]
	fn different_input_different_hash() {
		let a = Digest::hash_bytes(b"hello");
		let b = Digest::hash_bytes(b"world");
		assert_ne!(a, b);
	}

	#[test]
	fn zero_is_zero() {
		assert!(Digest::zero().is_zero());
		assert!(!Digest::hash_bytes(b"x").is_zero());
	}

	#[test]
	fn display_then_parse_roundtrips() {
		let d = Digest::hash_bytes(b"roundtrip");
		let s = d.to_string();
		let parsed: Digest = s.parse().unwrap();
		assert_eq!(d, parsed);
	}

	#[test]
	fn parse_rejects_wrong_length() {
		let err = "abcd".parse::<Digest>().unwrap_err();
		assert!(matches!(err, DigestParseError::WrongLength(_)));
	}
}
