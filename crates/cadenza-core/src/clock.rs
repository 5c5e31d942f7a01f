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

//! Time sources consulted by timed waits.
//!
//! The external driver owns the notion of "now". A [`Clock`] is the narrow view
//! of it that this layer consumes: a reading in seconds that never runs
//! backwards, although it may stand still (pause) or advance at a scaled rate.
//!
//! Three implementations are provided:
//! - [`ManualClock`], advanced explicitly by whoever drives the frames.
//! - [`StopwatchClock`], unscaled wall time since creation.
//! - [`ScaledClock`], game time derived from another clock with a time scale
//!   and a pause switch.

use crate::config::ClockConfig;
use crate::utils::timer::Stopwatch;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

/// A source of the current time, in seconds.
pub trait Clock {
    /// Returns the current reading of this clock in seconds.
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// A clock whose reading only changes when it is told to.
///
/// This is what a frame driver uses when it computes the frame time itself,
/// and what tests use to step time deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    /// Creates a clock reading `0.0`.
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Creates a clock reading `start`.
    pub fn starting_at(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Moves the clock forward by `delta` seconds.
    ///
    /// Negative or non-finite deltas are ignored: the reading never runs backwards.
    pub fn advance(&self, delta: f64) {
        if !delta.is_finite() || delta < 0.0 {
            log::warn!("ManualClock ignored invalid advance of {delta}s");
            return;
        }
        self.now.set(self.now.get() + delta);
    }

    /// Jumps the clock forward to `now`.
    ///
    /// Readings earlier than the current one, or non-finite, are ignored.
    pub fn set(&self, now: f64) {
        if !now.is_finite() || now < self.now.get() {
            log::warn!("ManualClock ignored set to {now}s (current {}s)", self.now.get());
            return;
        }
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Unscaled wall time elapsed since the clock was created.
#[derive(Debug, Default, Clone)]
pub struct StopwatchClock {
    stopwatch: Stopwatch,
}

impl StopwatchClock {
    /// Creates a clock reading `0.0` now.
    pub fn new() -> Self {
        Self {
            stopwatch: Stopwatch::new(),
        }
    }
}

impl Clock for StopwatchClock {
    fn now(&self) -> f64 {
        self.stopwatch.elapsed_secs_f64()
    }
}

/// Game time derived from a source clock.
///
/// Changing the scale or pausing re-anchors the clock at the current reading,
/// so game time never jumps when the rate changes.
#[derive(Debug)]
pub struct ScaledClock<C: Clock> {
    source: C,
    anchor_source: Cell<f64>,
    anchor_game: Cell<f64>,
    time_scale: Cell<f64>,
    paused: Cell<bool>,
}

impl<C: Clock> ScaledClock<C> {
    /// Wraps `source` with a time scale of `1.0`, running.
    pub fn new(source: C) -> Self {
        let anchor = source.now();
        Self {
            source,
            anchor_source: Cell::new(anchor),
            anchor_game: Cell::new(0.0),
            time_scale: Cell::new(1.0),
            paused: Cell::new(false),
        }
    }

    /// Wraps `source` and applies the scale and pause state from `config`.
    pub fn from_config(source: C, config: &ClockConfig) -> Self {
        let clock = Self::new(source);
        clock.set_time_scale(config.time_scale);
        clock.set_paused(config.paused);
        clock
    }

    /// The current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale.get()
    }

    /// Sets the rate at which game time advances relative to the source.
    ///
    /// Negative or non-finite scales are clamped to `0.0`.
    pub fn set_time_scale(&self, scale: f64) {
        let scale = if scale.is_finite() && scale >= 0.0 {
            scale
        } else {
            log::warn!("ScaledClock clamped invalid time scale {scale} to 0");
            0.0
        };
        self.rebase();
        self.time_scale.set(scale);
    }

    /// Returns `true` if game time is currently frozen.
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Freezes or resumes game time.
    pub fn set_paused(&self, paused: bool) {
        if self.paused.get() == paused {
            return;
        }
        self.rebase();
        self.paused.set(paused);
        log::debug!("ScaledClock {}", if paused { "paused" } else { "resumed" });
    }

    /// Returns the wrapped source clock.
    pub fn source(&self) -> &C {
        &self.source
    }

    fn rebase(&self) {
        let game_now = self.now();
        self.anchor_source.set(self.source.now());
        self.anchor_game.set(game_now);
    }
}

impl<C: Clock> Clock for ScaledClock<C> {
    fn now(&self) -> f64 {
        if self.paused.get() {
            return self.anchor_game.get();
        }
        let span = self.source.now() - self.anchor_source.get();
        self.anchor_game.get() + span * self.time_scale.get()
    }
}
