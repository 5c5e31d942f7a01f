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

//! Contracts for resources that live in the native engine.
//!
//! The script layer never frees native memory itself. It holds an opaque
//! resource and calls [`NativeResource::release`] exactly once when it is done
//! with it. [`OwnedHandle`] enforces that rule: release is explicit through
//! [`OwnedHandle::release`], and `Drop` performs it if nobody did.

/// A native resource that must be released exactly once.
pub trait NativeResource {
    /// Hands the resource back to the native engine.
    ///
    /// [`OwnedHandle`] guarantees this is called at most once per resource.
    fn release(&mut self);
}

/// A task submitted to, and driven by, the native engine.
pub trait NativeTask: NativeResource {
    /// Whether the native driver considers the task finished.
    fn is_done(&self) -> bool;

    /// Completion ratio in `[0.0, 1.0]` as reported by the driver.
    fn progress(&self) -> f32;

    /// The scheduling priority of the task.
    fn priority(&self) -> i32;

    /// Changes the scheduling priority of the task.
    fn set_priority(&mut self, priority: i32);
}

/// Exclusive ownership of a native resource with guaranteed single release.
///
/// After release the handle is empty: accessors return `None` and further
/// release attempts are no-ops.
pub struct OwnedHandle<T: ?Sized + NativeResource> {
    resource: Option<Box<T>>,
}

impl<T: ?Sized + NativeResource> OwnedHandle<T> {
    /// Takes ownership of `resource`.
    pub fn new(resource: Box<T>) -> Self {
        Self {
            resource: Some(resource),
        }
    }

    /// Returns the resource, or `None` once it has been released.
    pub fn get(&self) -> Option<&T> {
        self.resource.as_deref()
    }

    /// Returns the resource mutably, or `None` once it has been released.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.resource.as_deref_mut()
    }

    /// Returns `true` once the resource has been handed back.
    pub fn is_released(&self) -> bool {
        self.resource.is_none()
    }

    /// Releases the resource now.
    ///
    /// Returns `true` if this call performed the release, `false` if it had
    /// already happened.
    pub fn release(&mut self) -> bool {
        match self.resource.take() {
            Some(mut resource) => {
                resource.release();
                log::debug!("Native resource released.");
                true
            }
            None => false,
        }
    }
}

impl<T: NativeResource> OwnedHandle<T> {
    /// Takes ownership of a sized resource by value.
    pub fn from_resource(resource: T) -> Self {
        Self::new(Box::new(resource))
    }
}

impl<T: ?Sized + NativeResource> Drop for OwnedHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: ?Sized + NativeResource> std::fmt::Debug for OwnedHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedHandle")
            .field("released", &self.is_released())
            .finish()
    }
}
