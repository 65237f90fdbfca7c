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

//! Outcome of inserting a block into the chain store.

use std::fmt;

/// What happened when a block was handed to `ChainStore::add_block`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum BlockStatus {
	/// The block's parent was already known; it is now linked into the chain.
	Added,
	/// The block's parent is not yet known; it is held pending.
	Loose,
	/// A block with this hash was already present; nothing changed.
	Duplicate,
	/// The block failed a structural or proof check and was not stored.
	Invalid,
}

impl fmt::Display for BlockStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			BlockStatus::Added => "Added",
			BlockStatus::Loose => "Loose",
			BlockStatus::Duplicate => "Duplicate",
			BlockStatus::Invalid => "Invalid",
		};
		write!(f, "{s}")
	}
}
