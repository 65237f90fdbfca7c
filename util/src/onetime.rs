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

use std::cell::{Ref, RefCell};

/// Encapsulation of a `RefCell<Option<T>>` for one-time initialization after
/// construction. Used for back-references that can't be supplied until after
/// the referencing struct has been built (e.g. a sync machine that needs a
/// handle to the peer set that is itself constructed after the machine).
///
/// Purposefully panics if borrowed before `init` is called.
#[derive(Clone)]
pub struct OneTime<T> {
	inner: RefCell<Option<T>>,
}

unsafe impl<T> Sync for OneTime<T> {}
unsafe impl<T> Send for OneTime<T> {}

impl<T> Default for OneTime<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> OneTime<T> {
	/// Builds a new uninitialized `OneTime`.
	pub fn new() -> OneTime<T> {
		OneTime {
			inner: RefCell::new(None),
		}
	}

	/// Initializes the `OneTime`. Should only be called once after construction.
	pub fn init(&self, value: T) {
		let mut inner_mut = self.inner.borrow_mut();
		*inner_mut = Some(value);
	}

	/// Whether the `OneTime` has been initialized.
	pub fn is_initialized(&self) -> bool {
		self.inner.borrow().is_some()
	}

	/// Borrows the `OneTime`. Should only be called after initialization.
	pub fn borrow(&self) -> Ref<T> {
		Ref::map(self.inner.borrow(), |o| o.as_ref().unwrap())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uninitialized_is_detectable() {
		let ot: OneTime<u32> = OneTime::new();
		assert!(!ot.is_initialized());
	}

	#[test]
	fn init_then_borrow_roundtrips() {
		let ot = OneTime::new();
		ot.init(42u32);
		assert!(ot.is_initialized());
		assert_eq!(*ot.borrow(), 42);
	}

	#[test]
	#[should_panic]
	fn borrow_before_init_panics() {
		let ot: OneTime<u32> = OneTime::new();
		let _ = ot.borrow();
	}
}
