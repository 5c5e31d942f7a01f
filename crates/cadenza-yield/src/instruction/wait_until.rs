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

use super::CustomYieldInstruction;
use std::fmt;

/// Suspends the caller until `condition` returns `true`.
///
/// The condition is re-evaluated on every poll and never cached. A panic in
/// the condition propagates to whoever polls.
pub struct WaitUntil<F: FnMut() -> bool> {
    condition: F,
}

impl<F: FnMut() -> bool> WaitUntil<F> {
    /// Wraps a condition.
    pub fn new(condition: F) -> Self {
        Self { condition }
    }
}

impl<F: FnMut() -> bool> CustomYieldInstruction for WaitUntil<F> {
    fn keep_waiting(&mut self) -> bool {
        !(self.condition)()
    }
}

impl<F: FnMut() -> bool> fmt::Debug for WaitUntil<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WaitUntil(..)")
    }
}

/// Suspends the caller while `condition` returns `true`.
pub struct WaitWhile<F: FnMut() -> bool> {
    condition: F,
}

impl<F: FnMut() -> bool> WaitWhile<F> {
    /// Wraps a condition.
    pub fn new(condition: F) -> Self {
        Self { condition }
    }
}

impl<F: FnMut() -> bool> CustomYieldInstruction for WaitWhile<F> {
    fn keep_waiting(&mut self) -> bool {
        (self.condition)()
    }
}

impl<F: FnMut() -> bool> fmt::Debug for WaitWhile<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WaitWhile(..)")
    }
}
