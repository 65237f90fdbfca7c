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

//! The outbound side of the RPC surface: a trait the sync machine calls
//! through, and the promise type its requests resolve to.
//!
//! §9 Design Note: a hand-rolled promise polled on every tick maps cleanly
//! onto either a poll-driven loop (`Promise` below, for code that wants to
//! inspect in-flight state between ticks) or a plain `async fn` the sync
//! machine awaits once per tick; this crate offers both, `RpcClient::call`
//! being the async entry point and `Promise` describing the three
//! terminal/non-terminal states a caller that *does* want to poll will see.

use std::future::Future;
use std::pin::Pin;

use mc_core::block::Block;
use mc_core::digest::Digest;

use crate::error::ProtocolError;
use crate::proto::Travelogue;
use crate::trust::PeerAddress;

/// The three states an in-flight request can be observed in. Named to
/// match §3's "current_request (promise handle)" and §5's "Waiting |
/// Success | Failed".
#[derive(Debug)]
pub enum Promise<T> {
	Waiting,
	Success(T),
	Failed(ProtocolError),
}

/// One of the three endpoints a caller can invoke (§4.2).
pub enum Endpoint {
	HeaviestChain { max_count: u64 },
	TimeTravel { start: Digest, limit: i64 },
	CommonSubChain { start: Digest, last_seen: Digest, limit: u64 },
}

/// The reply shape matching whichever `Endpoint` was requested.
pub enum Reply {
	Blocks(Vec<Block>),
	Travelogue(Travelogue),
}

/// Abstracts the outbound call so `mc-sync` depends on this instead of a
/// concrete transport -- the messaging substrate itself (§1) is external,
/// treated as a black box providing "address-aware request/response...
/// primitives".
pub trait RpcClient: Send + Sync {
	/// Issues `endpoint` against `peer` and returns a future resolving to
	/// the reply, or a `ProtocolError` if the underlying request never
	/// completes successfully. A real implementation sits on top of the
	/// node's messaging substrate; test implementations can resolve
	/// immediately or never, to exercise the sync machine's `Waiting`
	/// handling.
	fn call(
		&self,
		peer: &PeerAddress,
		endpoint: Endpoint,
	) -> Pin<Box<dyn Future<Output = Result<Reply, ProtocolError>> + Send>>;
}
