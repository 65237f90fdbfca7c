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

//! Errors raised at the RPC layer.

/// Failure talking to a peer over the (out-of-scope, black-box) messaging
/// substrate, or a malformed reply from one.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
	#[error("codec error decoding a peer's reply: {0}")]
	Codec(#[from] mc_core::codec::Error),
	#[error("no peer available to service the request")]
	PeerUnavailable,
	#[error("the underlying request terminated without a reply")]
	RequestFailed,
}
