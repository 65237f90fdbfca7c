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

//! The eight-state pull-sync controller (§4.3): Phase A sweeps forward
//! along the genesis direction until an ambiguous fork is hit, Phase
//! B/B' walks backward from a peer's tip to glue onto our own heaviest
//! chain, and Phase C is the steady state that fills in loose subtrees
//! as they're discovered.
//!
//! Unlike the distilled design's hand-rolled promise polled every tick,
//! each state here is handled by one `async fn` that issues its
//! request and awaits the reply inline -- `tick` always runs exactly
//! one phase handler to completion before returning. The `WaitFor*`
//! states exist for logging and counters (a request is genuinely
//! in flight during them) but are never the value `self.state` holds
//! between two calls to `tick`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use mc_chain::ChainStore;
use mc_core::block::{Block, BlockVerifier};
use mc_core::digest::{Digest, GENESIS_DIGEST};
use mc_p2p::{Endpoint, PeerAddress, PeerSelector, PeerSet, Reply, RpcClient};

use crate::constants::{IDLE_DELAY, RETRY_DELAY, SYNCHRONISING_RETRY_DELAY};
use crate::ingest::ingest_batch;
use crate::mode::NetworkMode;
use crate::telemetry::Counters;

/// A consecutive-failure count reaching this threshold escalates that
/// peer's log line from `debug` to `warn` (§7: "log levels escalate to
/// warn on repeated mismatch").
const WARN_AFTER_CONSECUTIVE_FAILURES: u32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SyncState {
	RequestHeaviestChain,
	WaitForHeaviestChain,
	RequestFromTip,
	WaitFromTip,
	FurtherFromTip,
	Synchronising,
	WaitingForResponse,
	Synchronised,
}

/// Which request produced the reply a `WaitFromTip` handler is
/// currently processing -- Phase B's initial `HEAVIEST_CHAIN` or Phase
/// B''s backward `TIME_TRAVEL`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RetrievalPhase {
	RequestFromTip,
	FurtherFromTip,
}

/// The eight-state controller. Holds exactly the working-set fields
/// named in the distilled spec's glossary; `current_request` and
/// `current_peer_address` aren't kept as fields since each handler
/// awaits its own request inline rather than suspending across ticks.
pub struct SyncMachine {
	chain: Arc<ChainStore>,
	rpc: Arc<dyn RpcClient>,
	peers: Arc<dyn PeerSet>,
	verifier: Arc<dyn BlockVerifier>,
	counters: Arc<Counters>,
	selector: PeerSelector,

	state: SyncState,
	next_hash_requested: Digest,
	left_edge: Option<Block>,
	right_edge: Option<Block>,
	retrieval_phase: RetrievalPhase,
	failure_counts: HashMap<PeerAddress, u32>,
	logged_synchronised: bool,
}

impl SyncMachine {
	pub fn new(
		chain: Arc<ChainStore>,
		rpc: Arc<dyn RpcClient>,
		peers: Arc<dyn PeerSet>,
		verifier: Arc<dyn BlockVerifier>,
		counters: Arc<Counters>,
		selector: PeerSelector,
		mode: NetworkMode,
	) -> SyncMachine {
		let state = if mode == NetworkMode::Standalone {
			SyncState::Synchronised
		} else {
			SyncState::RequestHeaviestChain
		};
		SyncMachine {
			chain,
			rpc,
			peers,
			verifier,
			counters,
			selector,
			state,
			next_hash_requested: *GENESIS_DIGEST,
			left_edge: None,
			right_edge: None,
			retrieval_phase: RetrievalPhase::RequestFromTip,
			failure_counts: HashMap::new(),
			logged_synchronised: mode == NetworkMode::Standalone,
		}
	}

	pub fn state(&self) -> SyncState {
		self.state
	}

	/// Overrides the current state directly. Exposed for embedders that
	/// persist `SyncState` across restarts and resume from it, and for
	/// this crate's own test suite to drop straight into Phase C without
	/// replaying Phase A first.
	pub fn set_state(&mut self, state: SyncState) {
		self.state = state;
	}

	/// Runs the machine forever, sleeping between ticks as each handler
	/// requests. Spawned on its own `tokio` task by the embedder.
	pub async fn run(&mut self) {
		loop {
			if let Some(delay) = self.tick().await {
				tokio::time::sleep(delay).await;
			}
		}
	}

	/// Drives exactly one phase handler to completion and returns the
	/// delay (if any) the caller should sleep before the next tick.
	pub async fn tick(&mut self) -> Option<Duration> {
		match self.state {
			SyncState::RequestHeaviestChain | SyncState::WaitForHeaviestChain => self.phase_a().await,
			SyncState::RequestFromTip | SyncState::WaitFromTip | SyncState::FurtherFromTip => {
				self.phase_b_or_further().await
			}
			SyncState::Synchronising | SyncState::WaitingForResponse => self.phase_c().await,
			SyncState::Synchronised => self.phase_synchronised().await,
		}
	}

	fn record_failure(&mut self, peer: &PeerAddress, context: &str) {
		let count = self.failure_counts.entry(peer.clone()).or_insert(0);
		*count += 1;
		if *count >= WARN_AFTER_CONSECUTIVE_FAILURES {
			warn!("sync: {context} (peer {peer}, {count} consecutive failures)");
		} else {
			debug!("sync: {context} (peer {peer}, {count} consecutive failures)");
		}
	}

	fn record_success(&mut self, peer: &PeerAddress) {
		self.failure_counts.remove(peer);
	}

	/// Phase A: forward sweep along the genesis direction (§4.3).
	async fn phase_a(&mut self) -> Option<Duration> {
		info!("sync: state -> RequestHeaviestChain (next_hash_requested={})", self.next_hash_requested);
		self.counters.incr_state_request_heaviest_total();

		let peer = match self.selector.pick_trusted(self.peers.as_ref()) {
			Some(p) => p,
			None => {
				debug!("sync: phase a: no trusted peer available");
				self.state = SyncState::RequestHeaviestChain;
				return Some(RETRY_DELAY);
			}
		};

		info!("sync: state -> WaitForHeaviestChain (peer={peer})");
		self.counters.incr_state_wait_heaviest_total();
		let reply = self
			.rpc
			.call(
				&peer,
				Endpoint::TimeTravel {
					start: self.next_hash_requested,
					limit: mc_p2p::MAX_CHAIN_REQUEST_SIZE as i64,
				},
			)
			.await;

		let travelogue = match reply {
			Ok(Reply::Travelogue(t)) => t,
			Ok(Reply::Blocks(_)) => {
				self.record_failure(&peer, "phase a: peer replied with the wrong shape for TIME_TRAVEL");
				self.state = SyncState::RequestHeaviestChain;
				return Some(RETRY_DELAY);
			}
			Err(e) => {
				self.record_failure(&peer, &format!("phase a: request failed ({e})"));
				self.state = SyncState::RequestHeaviestChain;
				return Some(RETRY_DELAY);
			}
		};
		self.record_success(&peer);

		if let Err(e) = ingest_batch(&self.chain, self.verifier.as_ref(), &self.counters, travelogue.blocks) {
			warn!("sync: phase a: batch rejected ({e})");
			self.state = SyncState::RequestHeaviestChain;
			return Some(RETRY_DELAY);
		}

		if travelogue.next_hash == *GENESIS_DIGEST {
			self.state = SyncState::Synchronising;
		} else if travelogue.next_hash.is_zero() {
			self.left_edge = Some((*self.chain.get_heaviest_block()).clone());
			self.right_edge = None;
			self.retrieval_phase = RetrievalPhase::RequestFromTip;
			self.state = SyncState::RequestFromTip;
		} else {
			self.next_hash_requested = travelogue.next_hash;
			self.state = SyncState::RequestHeaviestChain;
		}
		None
	}

	/// Phase B / B': issues whichever request `retrieval_phase` calls
	/// for, then runs the shared five-step reconciliation against the
	/// reply (§4.3).
	async fn phase_b_or_further(&mut self) -> Option<Duration> {
		match self.retrieval_phase {
			RetrievalPhase::RequestFromTip => self.issue_request_from_tip().await,
			RetrievalPhase::FurtherFromTip => self.issue_further_from_tip().await,
		}
	}

	async fn issue_request_from_tip(&mut self) -> Option<Duration> {
		info!("sync: state -> RequestFromTip");
		self.counters.incr_state_request_heaviest_total();
		self.state = SyncState::RequestFromTip;

		let peer = match self.selector.pick_connected(self.peers.as_ref()) {
			Some(p) => p,
			None => {
				debug!("sync: phase b: no connected peer available");
				return Some(RETRY_DELAY);
			}
		};

		info!("sync: state -> WaitFromTip (peer={peer}, retrieval_phase=RequestFromTip)");
		self.counters.incr_state_wait_heaviest_total();
		self.state = SyncState::WaitFromTip;
		let reply = self
			.rpc
			.call(
				&peer,
				Endpoint::HeaviestChain {
					max_count: mc_p2p::MAX_CHAIN_REQUEST_SIZE,
				},
			)
			.await;

		let batch = match reply {
			Ok(Reply::Blocks(blocks)) => blocks,
			Ok(Reply::Travelogue(_)) => {
				self.record_failure(&peer, "phase b: peer replied with the wrong shape for HEAVIEST_CHAIN");
				return self.restart_phase_b();
			}
			Err(e) => {
				self.record_failure(&peer, &format!("phase b: request failed ({e})"));
				return self.restart_phase_b();
			}
		};
		self.record_success(&peer);

		self.reconcile_tip_batch(batch)
	}

	async fn issue_further_from_tip(&mut self) -> Option<Duration> {
		let left = self.left_edge.as_ref().expect("FurtherFromTip always follows a set left_edge");
		let right = self.right_edge.as_ref().expect("FurtherFromTip always follows a set right_edge");
		let gap_width = right.block_number - left.block_number - 1;
		let limit = -(gap_width.min(mc_p2p::MAX_CHAIN_REQUEST_SIZE) as i64);

		info!("sync: state -> FurtherFromTip (gap_width={gap_width})");
		self.counters.incr_state_wait_heaviest_total();
		self.state = SyncState::FurtherFromTip;

		let peer = match self.selector.pick_connected(self.peers.as_ref()) {
			Some(p) => p,
			None => {
				debug!("sync: phase b': no connected peer available");
				return Some(RETRY_DELAY);
			}
		};

		info!("sync: state -> WaitFromTip (peer={peer}, retrieval_phase=FurtherFromTip)");
		self.state = SyncState::WaitFromTip;
		let reply = self
			.rpc
			.call(
				&peer,
				Endpoint::TimeTravel {
					start: self.next_hash_requested,
					limit,
				},
			)
			.await;

		let mut batch = match reply {
			Ok(Reply::Travelogue(t)) => t.blocks,
			Ok(Reply::Blocks(_)) => {
				self.record_failure(&peer, "phase b': peer replied with the wrong shape for TIME_TRAVEL");
				return self.restart_phase_b();
			}
			Err(e) => {
				self.record_failure(&peer, &format!("phase b': request failed ({e})"));
				return self.restart_phase_b();
			}
		};
		self.record_success(&peer);

		// A backward TIME_TRAVEL returns newest-first; the reconciliation
		// below is written in terms of the genesis-direction-first order
		// Phase B's HEAVIEST_CHAIN batch already comes in.
		batch.reverse();
		self.reconcile_tip_batch(batch)
	}

	/// Steps 1-5 of the Phase B reconciliation (§4.3), shared between
	/// the initial `HEAVIEST_CHAIN` batch and every subsequent backward
	/// `TIME_TRAVEL` batch. `batch` is genesis-direction-first.
	fn reconcile_tip_batch(&mut self, batch: Vec<Block>) -> Option<Duration> {
		// Step 1: empty batch restarts the phase.
		let (Some(earliest), Some(latest)) = (batch.first().cloned(), batch.last().cloned()) else {
			debug!("sync: phase b: empty batch, restarting");
			return self.restart_phase_b();
		};

		// Step 2: a right_edge already pinned down must glue onto this
		// batch's newest block exactly.
		if let Some(right_edge) = &self.right_edge {
			if right_edge.previous_hash != latest.hash || latest.block_number + 1 != right_edge.block_number {
				warn!("sync: phase b: peer's chain is inconsistent with what we already pulled, restarting");
				return self.restart_phase_b();
			}
		}

		// Step 3: does this batch's earliest block glue onto our own
		// heaviest tip from before Phase B started?
		let left_edge = self.left_edge.clone().expect("Phase B always has a left_edge set");
		let gap_closed = earliest.block_number == left_edge.block_number + 1;
		if gap_closed && earliest.previous_hash != left_edge.hash {
			warn!("sync: phase b: peer's chain does not glue to ours, restarting");
			return self.restart_phase_b();
		}
		// A peer whose chain doesn't even reach our left edge (e.g. its
		// heaviest chain is shorter than MAX_CHAIN_REQUEST_SIZE, so
		// `earliest` is genesis) can never close the gap -- there is
		// nothing further back worth requesting. Restart here instead of
		// falling through to FurtherFromTip, whose gap-width computation
		// would underflow against a left edge at or past `earliest`.
		if !gap_closed && earliest.block_number <= left_edge.block_number {
			warn!("sync: phase b: peer's chain does not reach our left edge, restarting");
			return self.restart_phase_b();
		}

		// Step 4: ingest regardless of whether the gap closed.
		if let Err(e) = ingest_batch(&self.chain, self.verifier.as_ref(), &self.counters, batch) {
			warn!("sync: phase b: batch rejected ({e})");
			return self.restart_phase_b();
		}

		// Step 5.
		if gap_closed {
			self.left_edge = None;
			self.right_edge = None;
			self.next_hash_requested = *GENESIS_DIGEST;
			self.retrieval_phase = RetrievalPhase::RequestFromTip;
			self.state = SyncState::Synchronising;
		} else {
			self.next_hash_requested = earliest.previous_hash;
			self.right_edge = Some(earliest);
			self.retrieval_phase = RetrievalPhase::FurtherFromTip;
			self.state = SyncState::FurtherFromTip;
		}
		None
	}

	fn restart_phase_b(&mut self) -> Option<Duration> {
		self.right_edge = None;
		self.retrieval_phase = RetrievalPhase::RequestFromTip;
		self.state = SyncState::RequestFromTip;
		Some(RETRY_DELAY)
	}

	/// Phase C: the steady state, filling in discovered loose subtrees
	/// one missing tip at a time (§4.3).
	async fn phase_c(&mut self) -> Option<Duration> {
		info!("sync: state -> Synchronising");
		self.counters.incr_state_synchronising_total();
		self.state = SyncState::Synchronising;

		let missing = self.chain.get_missing_tips();
		let Some(missing_tip) = missing.into_iter().next() else {
			self.state = SyncState::Synchronised;
			return None;
		};

		let peer = match self.selector.pick_trusted(self.peers.as_ref()) {
			Some(p) => p,
			None => {
				debug!("sync: phase c: no trusted peer available, staying in Synchronising");
				return Some(RETRY_DELAY);
			}
		};

		info!("sync: state -> WaitingForResponse (peer={peer}, missing_tip={missing_tip})");
		self.counters.incr_state_wait_response_total();
		self.state = SyncState::WaitingForResponse;
		let reply = self
			.rpc
			.call(
				&peer,
				Endpoint::CommonSubChain {
					start: missing_tip,
					last_seen: self.chain.get_heaviest_block_hash(),
					limit: mc_p2p::MAX_SUB_CHAIN_SIZE,
				},
			)
			.await;

		let blocks = match reply {
			Ok(Reply::Blocks(blocks)) => blocks,
			Ok(Reply::Travelogue(_)) => {
				self.record_failure(&peer, "phase c: peer replied with the wrong shape for COMMON_SUB_CHAIN");
				self.state = SyncState::RequestHeaviestChain;
				return Some(SYNCHRONISING_RETRY_DELAY);
			}
			Err(e) => {
				self.record_failure(&peer, &format!("phase c: request failed ({e})"));
				self.state = SyncState::RequestHeaviestChain;
				return Some(SYNCHRONISING_RETRY_DELAY);
			}
		};
		self.record_success(&peer);

		if let Err(e) = ingest_batch(&self.chain, self.verifier.as_ref(), &self.counters, blocks) {
			warn!("sync: phase c: batch rejected ({e})");
			self.state = SyncState::RequestHeaviestChain;
			return Some(SYNCHRONISING_RETRY_DELAY);
		}

		self.state = SyncState::Synchronised;
		None
	}

	async fn phase_synchronised(&mut self) -> Option<Duration> {
		if !self.logged_synchronised {
			info!("sync: Synchronised");
			self.logged_synchronised = true;
		}
		self.counters.incr_state_synchronised_total();

		if self.chain.has_missing_blocks() {
			self.logged_synchronised = false;
			self.state = SyncState::Synchronising;
			None
		} else {
			Some(IDLE_DELAY)
		}
	}
}
