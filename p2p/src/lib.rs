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

//! The RPC protocol surface, peer selection, and the request/response and
//! publish/subscribe seams the sync state machine is built against. The
//! actual messaging substrate (connection management, framing over a real
//! socket) is an out-of-scope collaborator per §1 -- this crate only
//! defines the traits it must satisfy plus the three endpoints and the
//! gossip payload format implemented on top of them.

#![deny(unused_mut)]

pub mod error;
pub mod msg;
pub mod peer;
pub mod proto;
pub mod rpc_client;
pub mod trust;

pub use error::ProtocolError;
pub use peer::{PeerSelector, PeerSet};
pub use proto::{
	ChainReader, MainChainProtocol, Travelogue, CHANNEL_BLOCKS, CHANNEL_RPC, ENDPOINT_COMMON_SUB_CHAIN,
	ENDPOINT_HEAVIEST_CHAIN, ENDPOINT_TIME_TRAVEL, MAX_CHAIN_REQUEST_SIZE, MAX_SUB_CHAIN_SIZE, RPC_MAIN_CHAIN,
	SERVICE_MAIN_CHAIN,
};
pub use rpc_client::{Endpoint, Promise, Reply, RpcClient};
pub use trust::{PeerAddress, TrustFeedback};
