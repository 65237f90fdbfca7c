// Copyright 2018 The Grin Developers
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

//! A minimal linear congruential generator, used only for uniform peer
//! selection. Not suitable for anything that needs cryptographic
//! unpredictability — this is explicitly not that.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Numerical Recipes' 32-bit LCG constants.
const MULTIPLIER: u64 = 1_664_525;
const INCREMENT: u64 = 1_013_904_223;

/// A process-wide, lock-free linear congruential generator.
///
/// Production code should seed this non-deterministically (the `Default`
/// impl does). Tests should use `Lcg::with_seed` so peer selection is
/// reproducible.
pub struct Lcg {
	state: AtomicU64,
}

impl Lcg {
	/// Builds a generator seeded with the given value.
	pub fn with_seed(seed: u64) -> Lcg {
		Lcg {
			state: AtomicU64::new(seed),
		}
	}

	/// Builds a generator seeded non-deterministically from the system clock.
	pub fn seeded_from_time() -> Lcg {
		let seed = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_nanos() as u64)
			.unwrap_or(0x5DEECE66D);
		Lcg::with_seed(seed)
	}

	/// Returns the next value in the sequence.
	pub fn next(&self) -> u64 {
		let previous = self
			.state
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |s| {
				Some(s.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT))
			})
			.unwrap();
		previous.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT)
	}

	/// Samples a uniform index in `0..bound`. Returns `None` if `bound == 0`.
	pub fn index(&self, bound: usize) -> Option<usize> {
		if bound == 0 {
			return None;
		}
		Some((self.next() as usize) % bound)
	}
}

impl Default for Lcg {
	fn default() -> Self {
		Lcg::seeded_from_time()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deterministic_with_fixed_seed() {
		let a = Lcg::with_seed(42);
		let b = Lcg::with_seed(42);
		for _ in 0..10 {
			assert_eq!(a.next(), b.next());
		}
	}

	#[test]
	fn index_is_always_in_bound() {
		let lcg = Lcg::with_seed(7);
		for _ in 0..1000 {
			let idx = lcg.index(5).unwrap();
			assert!(idx < 5);
		}
	}

	#[test]
	fn index_of_zero_bound_is_none() {
		let lcg = Lcg::with_seed(7);
		assert_eq!(lcg.index(0), None);
	}
}
