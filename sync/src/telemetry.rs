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

//! State-entry and block-outcome counters (§6). Exposed as plain
//! `AtomicU64`s with a `snapshot()` method instead of wiring a real metrics
//! backend -- the backend itself (Prometheus, statsd, whatever) is an
//! out-of-scope collaborator per §1, and tests want a value they can read
//! back without scraping anything.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of every counter, for assertions in tests and for whatever the
/// embedder's real metrics backend scrapes this into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
	pub recv_block_total: u64,
	pub recv_block_valid_total: u64,
	pub recv_block_loose_total: u64,
	pub recv_block_duplicate_total: u64,
	pub recv_block_invalid_total: u64,
	pub state_request_heaviest_total: u64,
	pub state_wait_heaviest_total: u64,
	pub state_synchronising_total: u64,
	pub state_wait_response_total: u64,
	pub state_synchronised_total: u64,
}

/// The counters named in §6, one `AtomicU64` each (relaxed increments
/// only, per §5 "Counters: concurrent increments only").
#[derive(Default)]
pub struct Counters {
	recv_block_total: AtomicU64,
	recv_block_valid_total: AtomicU64,
	recv_block_loose_total: AtomicU64,
	recv_block_duplicate_total: AtomicU64,
	recv_block_invalid_total: AtomicU64,
	state_request_heaviest_total: AtomicU64,
	state_wait_heaviest_total: AtomicU64,
	state_synchronising_total: AtomicU64,
	state_wait_response_total: AtomicU64,
	state_synchronised_total: AtomicU64,
}

macro_rules! counter_accessors {
	($field:ident, $incr:ident) => {
		pub fn $incr(&self) {
			self.$field.fetch_add(1, Ordering::Relaxed);
		}
	};
}

impl Counters {
	counter_accessors!(recv_block_total, incr_recv_block_total);
	counter_accessors!(recv_block_valid_total, incr_recv_block_valid_total);
	counter_accessors!(recv_block_loose_total, incr_recv_block_loose_total);
	counter_accessors!(recv_block_duplicate_total, incr_recv_block_duplicate_total);
	counter_accessors!(recv_block_invalid_total, incr_recv_block_invalid_total);
	counter_accessors!(state_request_heaviest_total, incr_state_request_heaviest_total);
	counter_accessors!(state_wait_heaviest_total, incr_state_wait_heaviest_total);
	counter_accessors!(state_synchronising_total, incr_state_synchronising_total);
	counter_accessors!(state_wait_response_total, incr_state_wait_response_total);
	counter_accessors!(state_synchronised_total, incr_state_synchronised_total);

	pub fn snapshot(&self) -> Snapshot {
		Snapshot {
			recv_block_total: self.recv_block_total.load(Ordering::Relaxed),
			recv_block_valid_total: self.recv_block_valid_total.load(Ordering::Relaxed),
			recv_block_loose_total: self.recv_block_loose_total.load(Ordering::Relaxed),
			recv_block_duplicate_total: self.recv_block_duplicate_total.load(Ordering::Relaxed),
			recv_block_invalid_total: self.recv_block_invalid_total.load(Ordering::Relaxed),
			state_request_heaviest_total: self.state_request_heaviest_total.load(Ordering::Relaxed),
			state_wait_heaviest_total: self.state_wait_heaviest_total.load(Ordering::Relaxed),
			state_synchronising_total: self.state_synchronising_total.load(Ordering::Relaxed),
			state_wait_response_total: self.state_wait_response_total.load(Ordering::Relaxed),
			state_synchronised_total: self.state_synchronised_total.load(Ordering::Relaxed),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counters_start_at_zero() {
		let counters = Counters::default();
		assert_eq!(counters.snapshot(), Snapshot::default());
	}

	#[test]
	fn increments_are_independent_per_counter() {
		let counters = Counters::default();
		counters.incr_recv_block_total();
		counters.incr_recv_block_total();
		counters.incr_recv_block_valid_total();
		let snap = counters.snapshot();
		assert_eq!(snap.recv_block_total, 2);
		assert_eq!(snap.recv_block_valid_total, 1);
		assert_eq!(snap.recv_block_loose_total, 0);
	}
}
