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

//! Block identity, the block record itself, insertion outcomes, and the
//! tagged-field wire codec shared by every other crate in the main-chain
//! synchronisation core.

#![deny(unused_mut)]

pub mod block;
pub mod codec;
pub mod digest;
pub mod status;

pub use block::{Block, BlockVerifier};
pub use digest::{Digest, GENESIS_DIGEST};
pub use status::BlockStatus;
