// Copyright 2018 The Grin Developers
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

//! Logging, locking, and other low-level utilities shared across the
//! main-chain synchronisation crates.

mod logger;
mod onetime;
mod rng;
mod rwlock;
pub mod types;

pub use logger::{init_logger, init_test_logger};
pub use onetime::OneTime;
pub use rng::Lcg;
pub use rwlock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use types::LoggingConfig;
