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

//! Serialization and deserialization layer specialized for the tagged-map
//! binary encoding used on the wire (see module docs on `Writeable`).
//!
//! Every field of a serialized record is written as a `(key: u8, value)`
//! pair, where the key is a stable small integer assigned when the field
//! was introduced. Keys start at 1 and are never reordered or reused —
//! that's what lets an old peer and a new peer, each missing some of the
//! other's fields, still agree on the fields they share.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::digest::{Digest, DIGEST_LEN};

/// Errors that can arise serializing or deserializing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("io error: {0}")]
	Io(#[from] io::Error),
	#[error("unexpected field key: expected {expected}, got {got}")]
	UnexpectedKey { expected: u8, got: u8 },
	#[error("data was not in a consumable format: {0}")]
	Corrupted(String),
}

/// Writes primitive values to an underlying sink. Implemented once for real
/// byte output (`BinWriter`) and once for a size-only dry run
/// (`SizeCounter`), so a caller can measure the exact encoded size before
/// allocating the buffer it will serialize into.
pub trait Writer {
	fn write_u8(&mut self, n: u8) -> Result<(), Error>;
	fn write_u32(&mut self, n: u32) -> Result<(), Error>;
	fn write_u64(&mut self, n: u64) -> Result<(), Error>;
	fn write_i64(&mut self, n: i64) -> Result<(), Error>;
	fn write_bool(&mut self, b: bool) -> Result<(), Error> {
		self.write_u8(if b { 1 } else { 0 })
	}
	/// Writes a variable-length byte string, length-prefixed.
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
	/// Writes exactly `DIGEST_LEN` bytes, no length prefix needed.
	fn write_digest(&mut self, digest: &Digest) -> Result<(), Error>;

	/// Writes a field tag followed by its value, via the closure.
	fn write_field(&mut self, key: u8, write_value: impl FnOnce(&mut Self) -> Result<(), Error>) -> Result<(), Error>
	where
		Self: Sized,
	{
		self.write_u8(key)?;
		write_value(self)
	}
}

/// Reads primitive values back out, the inverse of `Writer`.
pub trait Reader {
	fn read_u8(&mut self) -> Result<u8, Error>;
	fn read_u32(&mut self) -> Result<u32, Error>;
	fn read_u64(&mut self) -> Result<u64, Error>;
	fn read_i64(&mut self) -> Result<i64, Error>;
	fn read_bool(&mut self) -> Result<bool, Error> {
		Ok(self.read_u8()? != 0)
	}
	fn read_bytes(&mut self) -> Result<Vec<u8>, Error>;
	fn read_digest(&mut self) -> Result<Digest, Error>;

	/// Reads a field key and fails loudly if it doesn't match what the
	/// decoder expected at this position. Field order is part of the
	/// contract (§6): readers walk fields in ascending key order.
	fn expect_key(&mut self, expected: u8) -> Result<(), Error> {
		let got = self.read_u8()?;
		if got == expected {
			Ok(())
		} else {
			Err(Error::UnexpectedKey { expected, got })
		}
	}
}

/// Implemented by every wire type: a `Writeable`/`Readable` split (one
/// trait to serialize, one to parse back), generalized here to the
/// tagged-map encoding described in §6.
pub trait Writeable {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error>;
}

/// The deserializing counterpart of `Writeable`.
pub trait Readable: Sized {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, Error>;
}

/// Serializes a `Writeable` into an in-memory buffer, using a `SizeCounter`
/// pre-pass to allocate exactly the right capacity up front (§4.4
/// `BroadcastBlock`).
pub fn serialize(thing: &impl Writeable) -> Result<Vec<u8>, Error> {
	let mut counter = SizeCounter::default();
	thing.write(&mut counter)?;

	let mut buf = Vec::with_capacity(counter.size as usize);
	let mut writer = BinWriter { sink: &mut buf };
	thing.write(&mut writer)?;
	Ok(buf)
}

/// Deserializes a `Readable` from a byte slice.
pub fn deserialize<T: Readable>(bytes: &[u8]) -> Result<T, Error> {
	let mut reader = BinReader { source: bytes };
	T::read(&mut reader)
}

struct BinWriter<'a> {
	sink: &'a mut dyn Write,
}

impl<'a> Writer for BinWriter<'a> {
	fn write_u8(&mut self, n: u8) -> Result<(), Error> {
		self.sink.write_u8(n).map_err(Error::from)
	}
	fn write_u32(&mut self, n: u32) -> Result<(), Error> {
		self.sink.write_u32::<BigEndian>(n).map_err(Error::from)
	}
	fn write_u64(&mut self, n: u64) -> Result<(), Error> {
		self.sink.write_u64::<BigEndian>(n).map_err(Error::from)
	}
	fn write_i64(&mut self, n: i64) -> Result<(), Error> {
		self.sink.write_i64::<BigEndian>(n).map_err(Error::from)
	}
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.write_u64(bytes.len() as u64)?;
		self.sink.write_all(bytes).map_err(Error::from)
	}
	fn write_digest(&mut self, digest: &Digest) -> Result<(), Error> {
		self.sink.write_all(digest.as_bytes()).map_err(Error::from)
	}
}

/// A `Writer` that doesn't write anything, just tallies how many bytes would
/// have been written. Used to size an allocation exactly before the real
/// serialization pass (avoids reallocation on every broadcast block).
#[derive(Default)]
struct SizeCounter {
	size: u64,
}

impl Writer for SizeCounter {
	fn write_u8(&mut self, _n: u8) -> Result<(), Error> {
		self.size += 1;
		Ok(())
	}
	fn write_u32(&mut self, _n: u32) -> Result<(), Error> {
		self.size += 4;
		Ok(())
	}
	fn write_u64(&mut self, _n: u64) -> Result<(), Error> {
		self.size += 8;
		Ok(())
	}
	fn write_i64(&mut self, _n: i64) -> Result<(), Error> {
		self.size += 8;
		Ok(())
	}
	fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.size += 8 + bytes.len() as u64;
		Ok(())
	}
	fn write_digest(&mut self, _digest: &Digest) -> Result<(), Error> {
		self.size += DIGEST_LEN as u64;
		Ok(())
	}
}

struct BinReader<'a> {
	source: &'a [u8],
}

impl<'a> Reader for BinReader<'a> {
	fn read_u8(&mut self) -> Result<u8, Error> {
		self.source.read_u8().map_err(Error::from)
	}
	fn read_u32(&mut self) -> Result<u32, Error> {
		self.source.read_u32::<BigEndian>().map_err(Error::from)
	}
	fn read_u64(&mut self) -> Result<u64, Error> {
		self.source.read_u64::<BigEndian>().map_err(Error::from)
	}
	fn read_i64(&mut self) -> Result<i64, Error> {
		self.source.read_i64::<BigEndian>().map_err(Error::from)
	}
	fn read_bytes(&mut self) -> Result<Vec<u8>, Error> {
		let len = self.read_u64()? as usize;
		if len > 64_000_000 {
			return Err(Error::Corrupted(format!("byte string too large: {len}")));
		}
		let mut buf = vec![0u8; len];
		self.source.read_exact(&mut buf)?;
		Ok(buf)
	}
	fn read_digest(&mut self) -> Result<Digest, Error> {
		let mut buf = [0u8; DIGEST_LEN];
		self.source.read_exact(&mut buf)?;
		Ok(Digest::from_bytes(buf))
	}
}

impl Writeable for Digest {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error> {
		writer.write_digest(self)
	}
}

impl Readable for Digest {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, Error> {
		reader.read_digest()
	}
}

impl<T: Writeable> Writeable for Vec<T> {
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error> {
		writer.write_u64(self.len() as u64)?;
		for item in self {
			item.write(writer)?;
		}
		Ok(())
	}
}

impl<T: Readable> Readable for Vec<T> {
	fn read<R: Reader>(reader: &mut R) -> Result<Self, Error> {
		let len = reader.read_u64()? as usize;
		if len > 1_000_000 {
			return Err(Error::Corrupted(format!("sequence too long: {len}")));
		}
		let mut out = Vec::with_capacity(len.min(4096));
		for _ in 0..len {
			out.push(T::read(reader)?);
		}
		Ok(out)
	}
}
