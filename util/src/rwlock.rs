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

//! Re-export of `parking_lot::RwLock` under our own name.
//!
//! `std::sync::RwLock` poisons on panic, which turns one panicking reader
//! into a permanently unusable chain store. `parking_lot`'s lock does not,
//! and its uncontended fast path is cheaper, which matters since every
//! chain store query takes this lock.

pub use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
