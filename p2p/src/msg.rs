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

//! The gossip (publish/subscribe) side of the protocol surface: blocks are
//! published on `(SERVICE_MAIN_CHAIN, CHANNEL_BLOCKS)`, one serialised
//! `Block` per message. §4.4: "a size-counter pre-pass is required for
//! fixed-allocation writers" -- `mc_core::codec::serialize` already does
//! this internally, so `broadcast_block` just needs to hand the publisher
//! the resulting buffer once.

use mc_core::block::Block;
use mc_core::codec::serialize;

use crate::error::ProtocolError;
use crate::proto::{CHANNEL_BLOCKS, SERVICE_MAIN_CHAIN};

/// Abstracts the messaging substrate's publish side. An embedder wires
/// this to its real pub/sub transport (out of scope per §1); `mc-sync`'s
/// tests use an in-memory recorder.
pub trait Publisher: Send + Sync {
	fn publish(&self, service: &str, channel: &str, payload: Vec<u8>);
}

/// Serialises `block` once and publishes it on the blocks channel. Gossip
/// is one-hop: the block producer is responsible for this initial
/// broadcast; `mc-sync`'s gossip handler never calls this itself (§4.4:
/// "Never rebroadcast here").
pub fn broadcast_block(publisher: &dyn Publisher, block: &Block) -> Result<(), ProtocolError> {
	let payload = serialize(block)?;
	publisher.publish(SERVICE_MAIN_CHAIN, CHANNEL_BLOCKS, payload);
	Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::*;
	use std::sync::Mutex;

	#[derive(Default)]
	pub struct RecordingPublisher {
		pub published: Mutex<Vec<(String, String, Vec<u8>)>>,
	}

	impl Publisher for RecordingPublisher {
		fn publish(&self, service: &str, channel: &str, payload: Vec<u8>) {
			self.published
				.lock()
				.unwrap()
				.push((service.to_string(), channel.to_string(), payload));
		}
	}
}
