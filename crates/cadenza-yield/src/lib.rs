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

//! # Cadenza Yield
//!
//! The script-facing half of the wait model of a frame-driven engine.
//!
//! The external driver owns the tick loop. Once per tick it polls every
//! pending [`Yield`] and, when a native task finishes, calls
//! [`AsyncOperation::notify_completion`] on its handle. This crate only
//! supplies what those calls evaluate:
//!
//! - [`AsyncOperation`]: a native task handle with an at-most-once,
//!   ordered completion notification list.
//! - The wait predicates: [`WaitForSeconds`], [`WaitUntil`], [`WaitWhile`]
//!   and the frame-phase markers [`WaitForEndOfFrame`] and
//!   [`WaitForFixedUpdate`].
//! - [`Coroutine`]: an owned reference to a native coroutine.

#![warn(missing_docs)]

pub mod async_operation;
pub mod coroutine;
pub mod error;
pub mod instruction;
pub mod metrics;

pub use async_operation::AsyncOperation;
pub use coroutine::Coroutine;
pub use error::YieldError;
pub use instruction::{
    CustomYieldInstruction, FramePhase, WaitForEndOfFrame, WaitForFixedUpdate, WaitForSeconds,
    WaitForSecondsRealtime, WaitUntil, WaitWhile, Yield, YieldState,
};
pub use metrics::YieldMetrics;

/// Re-exports for script code that only consumes the wait model.
pub mod prelude {
    pub use crate::{
        AsyncOperation, Coroutine, CustomYieldInstruction, WaitForEndOfFrame, WaitForFixedUpdate,
        WaitForSeconds, WaitForSecondsRealtime, WaitUntil, WaitWhile, Yield, YieldError,
        YieldState,
    };
    pub use cadenza_core::{Clock, FaultEvent, OperationId, SubscriptionId};
}
