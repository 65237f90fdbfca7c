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

//! Errors the chain store can surface. Per §7 of the design: duplicate,
//! unknown-start, and empty-range outcomes are *values*
//! (`BlockStatus::Duplicate`, `None`, an empty `Vec`), never this type.
//! `ChainError` is reserved for genuine store-internal failure -- today
//! that means the durable persister, since the in-memory index never
//! fails.

/// Failure internal to the store's own plumbing, as opposed to an
/// "expected" query outcome.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
	#[error("persistence backend error: {0}")]
	Persist(String),
	#[error("the requested start block is not known to the store")]
	UnknownStart,
}
