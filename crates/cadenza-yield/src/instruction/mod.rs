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

//! Yield instructions: what a suspended script waits on.
//!
//! The driver polls each pending instruction once per tick. Evaluable waits
//! answer "keep waiting?" through [`CustomYieldInstruction`]; frame-phase
//! markers carry no state and are resumed by the driver at the phase they
//! name. [`Yield`] is the closed set the driver dispatches on.

mod frame;
mod wait_for_seconds;
mod wait_until;

pub use self::frame::{FramePhase, WaitForEndOfFrame, WaitForFixedUpdate};
pub use self::wait_for_seconds::{WaitForSeconds, WaitForSecondsRealtime};
pub use self::wait_until::{WaitUntil, WaitWhile};

use crate::async_operation::AsyncOperation;
use cadenza_core::clock::Clock;
use std::fmt;
use std::rc::Rc;

/// A wait whose completion is decided by script-side logic.
///
/// Implement this for your own predicates; the driver keeps the caller
/// suspended while `keep_waiting` returns `true`.
pub trait CustomYieldInstruction {
    /// Returns `true` while the caller should stay suspended.
    fn keep_waiting(&mut self) -> bool;
}

/// A boxed condition for the type-erased [`Yield`] variants.
pub type BoxedCondition = Box<dyn FnMut() -> bool>;

/// The outcome of polling a [`Yield`] once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldState {
    /// Poll again next tick.
    Waiting,
    /// The caller can resume now.
    Ready,
    /// The driver resumes the caller when it reaches this frame phase.
    Deferred(FramePhase),
}

/// Everything a script can yield to the driver.
pub enum Yield {
    /// Resume on the next tick.
    NextFrame,
    /// Resume once a clock reaches a target time.
    Seconds(WaitForSeconds<Rc<dyn Clock>>),
    /// Resume once a condition becomes true.
    Until(WaitUntil<BoxedCondition>),
    /// Resume once a condition becomes false.
    While(WaitWhile<BoxedCondition>),
    /// Resume after the frame has been rendered.
    EndOfFrame(WaitForEndOfFrame),
    /// Resume at the next fixed-timestep update.
    FixedUpdate(WaitForFixedUpdate),
    /// Resume once an asynchronous operation is done.
    Operation(Rc<AsyncOperation>),
    /// Resume once a user-defined instruction stops waiting.
    Custom(Box<dyn CustomYieldInstruction>),
}

impl Yield {
    /// Waits `seconds` on `clock`.
    pub fn seconds(seconds: f64, clock: Rc<dyn Clock>) -> Self {
        Yield::Seconds(WaitForSeconds::new(seconds, clock))
    }

    /// Waits until `condition` returns `true`.
    pub fn until(condition: impl FnMut() -> bool + 'static) -> Self {
        Yield::Until(WaitUntil::new(Box::new(condition)))
    }

    /// Waits while `condition` returns `true`.
    pub fn while_(condition: impl FnMut() -> bool + 'static) -> Self {
        Yield::While(WaitWhile::new(Box::new(condition)))
    }

    /// Evaluates the instruction once.
    ///
    /// Markers always report [`YieldState::Deferred`]; their timing belongs to
    /// the driver. Predicate panics propagate to the caller.
    pub fn poll(&mut self) -> YieldState {
        let waiting = match self {
            Yield::NextFrame => false,
            Yield::Seconds(wait) => wait.keep_waiting(),
            Yield::Until(wait) => wait.keep_waiting(),
            Yield::While(wait) => wait.keep_waiting(),
            Yield::EndOfFrame(marker) => return YieldState::Deferred(marker.phase()),
            Yield::FixedUpdate(marker) => return YieldState::Deferred(marker.phase()),
            Yield::Operation(operation) => !operation.is_done(),
            Yield::Custom(instruction) => instruction.keep_waiting(),
        };
        if waiting {
            YieldState::Waiting
        } else {
            YieldState::Ready
        }
    }
}

impl From<WaitForSeconds<Rc<dyn Clock>>> for Yield {
    fn from(wait: WaitForSeconds<Rc<dyn Clock>>) -> Self {
        Yield::Seconds(wait)
    }
}

impl From<WaitForEndOfFrame> for Yield {
    fn from(marker: WaitForEndOfFrame) -> Self {
        Yield::EndOfFrame(marker)
    }
}

impl From<WaitForFixedUpdate> for Yield {
    fn from(marker: WaitForFixedUpdate) -> Self {
        Yield::FixedUpdate(marker)
    }
}

impl From<Rc<AsyncOperation>> for Yield {
    fn from(operation: Rc<AsyncOperation>) -> Self {
        Yield::Operation(operation)
    }
}

impl From<Box<dyn CustomYieldInstruction>> for Yield {
    fn from(instruction: Box<dyn CustomYieldInstruction>) -> Self {
        Yield::Custom(instruction)
    }
}

impl fmt::Debug for Yield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Yield::NextFrame => f.write_str("NextFrame"),
            Yield::Seconds(wait) => f
                .debug_struct("Seconds")
                .field("wait_time", &wait.wait_time())
                .field("target_time", &wait.target_time())
                .finish(),
            Yield::Until(_) => f.write_str("Until(..)"),
            Yield::While(_) => f.write_str("While(..)"),
            Yield::EndOfFrame(marker) => fmt::Debug::fmt(marker, f),
            Yield::FixedUpdate(marker) => fmt::Debug::fmt(marker, f),
            Yield::Operation(operation) => f.debug_tuple("Operation").field(&operation.id()).finish(),
            Yield::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::clock::ManualClock;
    use std::cell::Cell;

    struct Countdown(u32);

    impl CustomYieldInstruction for Countdown {
        fn keep_waiting(&mut self) -> bool {
            if self.0 == 0 {
                return false;
            }
            self.0 -= 1;
            true
        }
    }

    #[test]
    fn next_frame_is_ready_immediately() {
        assert_eq!(Yield::NextFrame.poll(), YieldState::Ready);
    }

    #[test]
    fn markers_are_deferred_to_their_phase() {
        let mut end = Yield::from(WaitForEndOfFrame);
        let mut fixed = Yield::from(WaitForFixedUpdate);
        assert_eq!(end.poll(), YieldState::Deferred(FramePhase::EndOfFrame));
        assert_eq!(end.poll(), YieldState::Deferred(FramePhase::EndOfFrame));
        assert_eq!(fixed.poll(), YieldState::Deferred(FramePhase::FixedUpdate));
    }

    #[test]
    fn seconds_follow_the_shared_clock() {
        let clock = Rc::new(ManualClock::new());
        let mut wait = Yield::seconds(1.0, clock.clone());
        assert_eq!(wait.poll(), YieldState::Waiting);
        clock.advance(1.0);
        assert_eq!(wait.poll(), YieldState::Ready);
    }

    #[test]
    fn until_and_while_are_complementary() {
        let flag = Rc::new(Cell::new(false));
        let (a, b) = (flag.clone(), flag.clone());
        let mut until = Yield::until(move || a.get());
        let mut while_ = Yield::while_(move || !b.get());

        assert_eq!(until.poll(), YieldState::Waiting);
        assert_eq!(while_.poll(), YieldState::Waiting);
        flag.set(true);
        assert_eq!(until.poll(), YieldState::Ready);
        assert_eq!(while_.poll(), YieldState::Ready);
    }

    #[test]
    fn custom_instructions_are_polled() {
        let mut wait = Yield::from(Box::new(Countdown(2)) as Box<dyn CustomYieldInstruction>);
        assert_eq!(wait.poll(), YieldState::Waiting);
        assert_eq!(wait.poll(), YieldState::Waiting);
        assert_eq!(wait.poll(), YieldState::Ready);
    }

    #[test]
    fn debug_output_names_the_variant() {
        assert_eq!(format!("{:?}", Yield::NextFrame), "NextFrame");
        assert_eq!(format!("{:?}", Yield::until(|| true)), "Until(..)");
    }
}
