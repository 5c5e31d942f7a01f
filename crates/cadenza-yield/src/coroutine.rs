// Copyright 2025 eraflo
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

//! Owned reference to a coroutine running in the native scheduler.

use cadenza_core::native::{NativeResource, OwnedHandle};

/// A script-side handle to a native coroutine.
///
/// The native coroutine object is released exactly once: by [`Coroutine::stop`]
/// or, failing that, when the handle is dropped.
#[derive(Debug)]
pub struct Coroutine {
    handle: OwnedHandle<dyn NativeResource>,
}

impl Coroutine {
    /// Wraps a native coroutine resource.
    pub fn new(resource: Box<dyn NativeResource>) -> Self {
        log::debug!("Coroutine handle created.");
        Self {
            handle: OwnedHandle::new(resource),
        }
    }

    /// Wraps a sized native coroutine resource.
    pub fn from_resource<R: NativeResource + 'static>(resource: R) -> Self {
        Self::new(Box::new(resource))
    }

    /// Returns `true` until the native coroutine has been released.
    pub fn is_alive(&self) -> bool {
        !self.handle.is_released()
    }

    /// Releases the native coroutine now.
    pub fn stop(mut self) {
        self.handle.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeCoroutine(Rc<Cell<u32>>);

    impl NativeResource for FakeCoroutine {
        fn release(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn stop_releases_once() {
        let releases = Rc::new(Cell::new(0));
        let coroutine = Coroutine::from_resource(FakeCoroutine(releases.clone()));
        assert!(coroutine.is_alive());
        coroutine.stop();
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn drop_releases_once() {
        let releases = Rc::new(Cell::new(0));
        drop(Coroutine::from_resource(FakeCoroutine(releases.clone())));
        assert_eq!(releases.get(), 1);
    }
}
