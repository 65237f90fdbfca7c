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

//! Delays the sync machine requests between ticks (§4.3, §6).

use std::time::Duration;

/// Phase A retry delay on promise failure or no peers available.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);
/// Phase C retry delay on `WaitingForResponse` RPC failure.
pub const SYNCHRONISING_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Idle delay once `Synchronised` with no missing blocks.
pub const IDLE_DELAY: Duration = Duration::from_millis(100);
