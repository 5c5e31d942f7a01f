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

//! # Cadenza Core
//!
//! Foundational crate containing the contracts shared by the script-facing
//! yield layer and the external frame driver: time sources, exclusively owned
//! native handles, the fault channel and the configuration types.

#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod event;
pub mod fault;
pub mod native;
pub mod telemetry;
pub mod utils;

pub use clock::{Clock, ManualClock, ScaledClock, StopwatchClock};
pub use config::{CadenzaConfig, ClockConfig, ConfigError, LoggingConfig};
pub use event::EventBus;
pub use fault::{FaultEvent, FaultKind, OperationId, SubscriptionId};
pub use native::{NativeResource, NativeTask, OwnedHandle};
pub use utils::timer::Stopwatch;
