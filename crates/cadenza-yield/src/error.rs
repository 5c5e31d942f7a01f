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

//! Errors surfaced by the yield layer.

use cadenza_core::fault::{FaultEvent, FaultKind, OperationId, SubscriptionId};
use thiserror::Error;

/// An error surfaced to the code that triggered it.
///
/// Redundant completion signals and unknown unsubscriptions are tolerated
/// silently and never produce a `YieldError`. Predicate panics are not
/// caught, so they never produce one either.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum YieldError {
    /// A completion callback returned an error or panicked.
    ///
    /// During a notification pass this is the first fault; later subscribers
    /// still ran.
    #[error("completion subscriber {subscription} of {operation} {fault}")]
    SubscriberFault {
        /// The operation whose completion was being delivered.
        operation: OperationId,
        /// The failing subscription.
        subscription: SubscriptionId,
        /// How it failed.
        fault: FaultKind,
    },
}

impl YieldError {
    /// Converts the error into the record published on the driver's fault channel.
    pub fn to_fault_event(&self) -> FaultEvent {
        match self {
            YieldError::SubscriberFault {
                operation,
                subscription,
                fault,
            } => FaultEvent {
                operation: *operation,
                subscription: *subscription,
                kind: fault.clone(),
            },
        }
    }
}

impl From<FaultEvent> for YieldError {
    fn from(event: FaultEvent) -> Self {
        YieldError::SubscriberFault {
            operation: event.operation,
            subscription: event.subscription,
            fault: event.kind,
        }
    }
}
