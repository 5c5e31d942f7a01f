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
use cadenza_core::clock::{Clock, StopwatchClock};
use std::time::Duration;

/// Suspends the caller until a clock reaches `start + seconds`.
///
/// The target is fixed at construction. A zero, negative or NaN duration
/// never waits: the first evaluation already reports `false`.
#[derive(Debug)]
pub struct WaitForSeconds<C: Clock> {
    clock: C,
    wait_time: f64,
    target: f64,
}

/// A wait measured against wall time, unaffected by time scaling or pausing.
pub type WaitForSecondsRealtime = WaitForSeconds<StopwatchClock>;

impl<C: Clock> WaitForSeconds<C> {
    /// Starts a wait of `seconds` on `clock`, measured from now.
    pub fn new(seconds: f64, clock: C) -> Self {
        let target = clock.now() + seconds;
        Self {
            clock,
            wait_time: seconds,
            target,
        }
    }

    /// Starts a wait of `duration` on `clock`.
    pub fn from_duration(duration: Duration, clock: C) -> Self {
        Self::new(duration.as_secs_f64(), clock)
    }

    /// The duration this wait was created with, in seconds.
    pub fn wait_time(&self) -> f64 {
        self.wait_time
    }

    /// The clock reading at which the wait ends.
    pub fn target_time(&self) -> f64 {
        self.target
    }

    /// Restarts the wait from the clock's current reading.
    pub fn reset(&mut self) {
        self.target = self.clock.now() + self.wait_time;
    }

    /// Replaces the duration and restarts the wait from now.
    pub fn reset_with(&mut self, seconds: f64) {
        self.wait_time = seconds;
        self.reset();
    }

    /// Returns `true` while the clock is still before the target.
    pub fn keep_waiting(&self) -> bool {
        // NaN compares false, so a NaN target ends the wait.
        self.clock.now() < self.target
    }
}

impl WaitForSecondsRealtime {
    /// Starts a wall-clock wait of `seconds`.
    pub fn realtime(seconds: f64) -> Self {
        Self::new(seconds, StopwatchClock::new())
    }
}

impl<C: Clock> CustomYieldInstruction for WaitForSeconds<C> {
    fn keep_waiting(&mut self) -> bool {
        WaitForSeconds::keep_waiting(self)
    }
}
