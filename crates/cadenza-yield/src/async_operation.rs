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

//! Handles to native tasks and their completion notification list.
//!
//! An [`AsyncOperation`] is handed out by the external driver when a task is
//! submitted. Script code subscribes to its completion; the driver calls
//! [`AsyncOperation::notify_completion`] when the task finishes.
//!
//! The notification list obeys three rules:
//! - Subscribers are invoked at most once, in subscription order.
//! - A subscriber arriving after completion is invoked synchronously inside
//!   [`subscribe`](AsyncOperation::subscribe) and never retained.
//! - A second completion signal from the driver is ignored.
//!
//! A failing subscriber (an `Err` return or a panic) does not stop the pass.
//! The first fault is returned to the driver once every subscriber has run,
//! and published on the fault channel if one is attached.

use crate::error::YieldError;
use crate::instruction::CustomYieldInstruction;
use crate::metrics::YieldMetrics;
use cadenza_core::fault::{FaultEvent, FaultKind, OperationId, SubscriptionId};
use cadenza_core::native::{NativeTask, OwnedHandle};
use cadenza_telemetry::ScopedMetricTimer;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::oneshot;

/// A completion callback. It receives the operation that completed.
pub type CompletionCallback = Box<dyn FnOnce(&AsyncOperation) -> anyhow::Result<()>>;

struct Subscriber {
    id: SubscriptionId,
    callback: CompletionCallback,
}

#[derive(Default)]
struct CompletionState {
    completed: bool,
    next_subscription: u64,
    pending: Vec<Subscriber>,
}

impl CompletionState {
    fn allocate_id(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        SubscriptionId::new(self.next_subscription)
    }
}

/// A handle to a task driven by the native engine.
///
/// The handle exclusively owns the native task and releases it exactly once,
/// either through [`dispose`](Self::dispose) or when dropped. Interaction is
/// single-threaded: share it with `Rc` when both script code and the driver
/// need it.
pub struct AsyncOperation {
    id: OperationId,
    task: RefCell<OwnedHandle<dyn NativeTask>>,
    state: RefCell<CompletionState>,
    fault_sender: Option<flume::Sender<FaultEvent>>,
    metrics: Option<YieldMetrics>,
}

impl AsyncOperation {
    /// Wraps a native task handed back by the driver.
    pub fn new(task: Box<dyn NativeTask>) -> Self {
        let id = OperationId::next();
        log::debug!("{id} created");
        Self {
            id,
            task: RefCell::new(OwnedHandle::new(task)),
            state: RefCell::new(CompletionState::default()),
            fault_sender: None,
            metrics: None,
        }
    }

    /// Wraps a concrete native task.
    pub fn from_task<T: NativeTask + 'static>(task: T) -> Self {
        Self::new(Box::new(task))
    }

    /// Publishes the first subscriber fault of each notification pass on `sender`.
    pub fn with_fault_channel(mut self, sender: flume::Sender<FaultEvent>) -> Self {
        self.fault_sender = Some(sender);
        self
    }

    /// Reports completion traffic to `metrics`.
    pub fn with_metrics(mut self, metrics: YieldMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The process-unique identifier of this operation.
    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Whether the operation has finished.
    ///
    /// Queried from the native task on every call. Once the driver has
    /// signalled completion this stays `true`.
    pub fn is_done(&self) -> bool {
        if self.state.borrow().completed {
            return true;
        }
        self.task.borrow().get().is_some_and(|task| task.is_done())
    }

    /// Completion ratio in `[0.0, 1.0]`; `1.0` once completion was signalled.
    pub fn progress(&self) -> f32 {
        if self.state.borrow().completed {
            return 1.0;
        }
        self.task
            .borrow()
            .get()
            .map_or(0.0, |task| task.progress().clamp(0.0, 1.0))
    }

    /// The scheduling priority of the native task.
    pub fn priority(&self) -> i32 {
        self.task.borrow().get().map_or(0, |task| task.priority())
    }

    /// Changes the scheduling priority of the native task.
    pub fn set_priority(&self, priority: i32) {
        if let Some(task) = self.task.borrow_mut().get_mut() {
            task.set_priority(priority);
        }
    }

    /// Number of callbacks waiting for completion.
    pub fn pending_subscribers(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Registers interest in completion.
    ///
    /// If the operation is already done, `callback` runs before this returns
    /// and is not retained; its fault, if any, is returned here. Otherwise it
    /// is queued behind every earlier subscriber.
    ///
    /// "Done" includes the native task reporting completion before the driver
    /// has called [`notify_completion`](Self::notify_completion). In that
    /// window a new subscriber runs immediately, ahead of subscribers that are
    /// still pending; those run when the driver's signal arrives. Registration
    /// order is only preserved among subscribers delivered by the same pass.
    ///
    /// The returned id can be passed to [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, callback: F) -> Result<SubscriptionId, YieldError>
    where
        F: FnOnce(&AsyncOperation) -> anyhow::Result<()> + 'static,
    {
        let subscription = self.state.borrow_mut().allocate_id();

        if self.is_done() {
            log::trace!("{} already done, invoking {subscription} immediately", self.id);
            if let Some(metrics) = &self.metrics {
                metrics.late_subscription();
            }
            return match self.invoke(subscription, Box::new(callback)) {
                Some(fault) => Err(fault.into()),
                None => Ok(subscription),
            };
        }

        self.state.borrow_mut().pending.push(Subscriber {
            id: subscription,
            callback: Box::new(callback),
        });
        if let Some(metrics) = &self.metrics {
            metrics.pending_changed(1.0);
        }
        log::trace!("{} queued {subscription}", self.id);
        Ok(subscription)
    }

    /// Removes a pending callback.
    ///
    /// Returns `false` without error when `subscription` is unknown or its
    /// callback has already run.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.pending.len();
            state.pending.retain(|subscriber| subscriber.id != subscription);
            before != state.pending.len()
        };
        if removed {
            if let Some(metrics) = &self.metrics {
                metrics.pending_changed(-1.0);
            }
            log::trace!("{} removed {subscription}", self.id);
        }
        removed
    }

    /// Delivers the completion notification. Called by the driver.
    ///
    /// The pending list is taken before the first callback runs, so callbacks
    /// may subscribe or unsubscribe freely: a subscription made during the
    /// pass sees the operation as done and runs immediately. Every subscriber
    /// runs even if an earlier one fails; the first fault is returned after
    /// the pass.
    ///
    /// A second call is a no-op that returns `Ok(())`.
    pub fn notify_completion(&self) -> Result<(), YieldError> {
        let pending = {
            let mut state = self.state.borrow_mut();
            if state.completed {
                log::warn!("{} received a redundant completion signal; ignoring it", self.id);
                if let Some(metrics) = &self.metrics {
                    metrics.redundant_completion();
                }
                return Ok(());
            }
            state.completed = true;
            std::mem::take(&mut state.pending)
        };

        log::debug!("{} completed, notifying {} subscriber(s)", self.id, pending.len());
        let _timer =
            ScopedMetricTimer::new(self.metrics.as_ref().map(|m| m.dispatch_histogram()));

        let notified = pending.len();
        let mut first_fault: Option<FaultEvent> = None;
        for subscriber in pending {
            if let Some(fault) = self.invoke(subscriber.id, subscriber.callback) {
                first_fault.get_or_insert(fault);
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.pending_changed(-(notified as f64));
            metrics.completion();
        }

        match first_fault {
            Some(fault) => {
                self.publish_fault(&fault);
                Err(fault.into())
            }
            None => Ok(()),
        }
    }

    /// Returns a receiver that resolves with this operation's id on completion.
    ///
    /// The receiver is already resolved if the operation is done. If the
    /// operation is dropped before completing, the receiver reports a
    /// `RecvError`.
    pub fn completion_signal(&self) -> oneshot::Receiver<OperationId> {
        let (sender, receiver) = oneshot::channel();
        let subscribed = self.subscribe(move |operation| {
            // The awaiting side may have lost interest.
            let _ = sender.send(operation.id());
            Ok(())
        });
        if let Err(e) = subscribed {
            log::error!("Completion signal subscriber failed: {e}");
        }
        receiver
    }

    /// Releases the native task now.
    ///
    /// Pending callbacks are dropped without being invoked.
    pub fn dispose(self) {
        if self.task.borrow_mut().release() {
            log::debug!("{} disposed", self.id);
        }
    }

    fn invoke(
        &self,
        subscription: SubscriptionId,
        callback: CompletionCallback,
    ) -> Option<FaultEvent> {
        let kind = match panic::catch_unwind(AssertUnwindSafe(|| callback(self))) {
            Ok(Ok(())) => return None,
            Ok(Err(error)) => FaultKind::Returned(format!("{error:#}")),
            Err(payload) => FaultKind::Panicked(panic_message(payload.as_ref())),
        };

        let fault = FaultEvent {
            operation: self.id,
            subscription,
            kind,
        };
        log::error!("{fault}");
        if let Some(metrics) = &self.metrics {
            metrics.subscriber_fault();
        }
        Some(fault)
    }

    fn publish_fault(&self, fault: &FaultEvent) {
        if let Some(sender) = &self.fault_sender {
            if let Err(e) = sender.send(fault.clone()) {
                log::warn!("Fault channel disconnected, dropping fault: {e}");
            }
        }
    }
}

impl CustomYieldInstruction for AsyncOperation {
    fn keep_waiting(&mut self) -> bool {
        !self.is_done()
    }
}

impl Drop for AsyncOperation {
    fn drop(&mut self) {
        let pending = self.state.get_mut().pending.len();
        if pending > 0 {
            log::debug!("{} dropped with {pending} pending subscriber(s)", self.id);
            if let Some(metrics) = &self.metrics {
                metrics.pending_changed(-(pending as f64));
            }
        }
    }
}

impl fmt::Debug for AsyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("AsyncOperation")
            .field("id", &self.id)
            .field("completed", &state.completed)
            .field("pending_subscribers", &state.pending.len())
            .field("task", &*self.task.borrow())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
