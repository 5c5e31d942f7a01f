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

use anyhow::{anyhow, Result};
use cadenza_core::event::EventBus;
use cadenza_core::native::{NativeResource, NativeTask};
use cadenza_core::telemetry::MetricValue;
use cadenza_core::{FaultEvent, FaultKind};
use cadenza_telemetry::MetricsRegistry;
use cadenza_yield::{AsyncOperation, YieldError, YieldMetrics};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// --- Test Setup: a native task the test drives by hand ---
#[derive(Default, Clone)]
struct DriverTask {
    done: Rc<Cell<bool>>,
    releases: Rc<Cell<u32>>,
}

impl NativeResource for DriverTask {
    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

impl NativeTask for DriverTask {
    fn is_done(&self) -> bool {
        self.done.get()
    }

    fn progress(&self) -> f32 {
        if self.done.get() {
            1.0
        } else {
            0.0
        }
    }

    fn priority(&self) -> i32 {
        0
    }

    fn set_priority(&mut self, _priority: i32) {}
}

fn operation() -> (AsyncOperation, DriverTask) {
    let task = DriverTask::default();
    (AsyncOperation::from_task(task.clone()), task)
}

type Calls = Rc<RefCell<Vec<&'static str>>>;

fn record(calls: &Calls, name: &'static str) -> impl FnOnce(&AsyncOperation) -> Result<()> {
    let calls = calls.clone();
    move |_: &AsyncOperation| {
        calls.borrow_mut().push(name);
        Ok(())
    }
}
// ---

#[test]
fn test_subscriber_runs_at_most_once_across_repeated_signals() -> Result<()> {
    // --- 1. Setup ---
    let (operation, _task) = operation();
    let calls = Calls::default();
    operation.subscribe(record(&calls, "only"))?;

    // --- 2. Act: the driver signals completion repeatedly ---
    for _ in 0..3 {
        operation.notify_completion()?;
    }

    // --- 3. Assert ---
    assert_eq!(*calls.borrow(), vec!["only"]);
    assert!(operation.is_done());
    Ok(())
}

#[test]
fn test_late_subscriber_runs_before_subscribe_returns() -> Result<()> {
    let (operation, _task) = operation();
    operation.notify_completion()?;

    let calls = Calls::default();
    operation.subscribe(record(&calls, "late"))?;
    assert_eq!(*calls.borrow(), vec!["late"]);
    assert_eq!(operation.pending_subscribers(), 0);

    // Nothing was retained, so a further signal runs nothing.
    operation.notify_completion()?;
    assert_eq!(calls.borrow().len(), 1);
    Ok(())
}

#[test]
fn test_subscriber_is_immediate_when_native_task_already_finished() -> Result<()> {
    let (operation, task) = operation();
    task.done.set(true);

    let calls = Calls::default();
    operation.subscribe(record(&calls, "immediate"))?;
    assert_eq!(*calls.borrow(), vec!["immediate"]);
    Ok(())
}

#[test]
fn test_failing_subscriber_does_not_starve_the_rest() {
    // --- 1. Setup: A, B (fails), C ---
    let (operation, _task) = operation();
    let calls = Calls::default();
    operation.subscribe(record(&calls, "a")).unwrap();
    let b = operation
        .subscribe(|_: &AsyncOperation| Err(anyhow!("texture decode failed")))
        .unwrap();
    operation.subscribe(record(&calls, "c")).unwrap();

    // --- 2. Act ---
    let result = operation.notify_completion();

    // --- 3. Assert: A and C ran, B's fault is surfaced afterwards ---
    assert_eq!(*calls.borrow(), vec!["a", "c"]);
    match result {
        Err(YieldError::SubscriberFault {
            operation: id,
            subscription,
            fault: FaultKind::Returned(message),
        }) => {
            assert_eq!(id, operation.id());
            assert_eq!(subscription, b);
            assert!(message.contains("texture decode failed"));
        }
        other => panic!("expected a returned fault, got {other:?}"),
    }
}

#[test]
fn test_panicking_subscriber_is_reported_once_and_isolated() {
    let (operation, _task) = operation();
    let calls = Calls::default();
    operation
        .subscribe(|_: &AsyncOperation| -> Result<()> { panic!("boom") })
        .unwrap();
    operation.subscribe(record(&calls, "after")).unwrap();
    operation
        .subscribe(|_: &AsyncOperation| Err(anyhow!("second fault")))
        .unwrap();

    let error = operation.notify_completion().unwrap_err();

    assert_eq!(*calls.borrow(), vec!["after"]);
    // Only the first fault of the pass is returned.
    let YieldError::SubscriberFault { fault, .. } = error;
    assert_eq!(fault, FaultKind::Panicked("boom".to_string()));
}

#[test]
fn test_faults_are_published_on_the_event_bus() {
    let bus: EventBus<FaultEvent> = EventBus::new();
    let task = DriverTask::default();
    let operation = AsyncOperation::from_task(task).with_fault_channel(bus.sender());
    operation
        .subscribe(|_: &AsyncOperation| Err(anyhow!("missing shader")))
        .unwrap();

    assert!(operation.notify_completion().is_err());

    let faults = bus.drain();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].operation, operation.id());
    assert!(faults[0].to_string().contains("missing shader"));
}

#[test]
fn test_unsubscribe_is_idempotent() -> Result<()> {
    let (operation, _task) = operation();
    let calls = Calls::default();
    let first = operation.subscribe(record(&calls, "removed"))?;
    operation.subscribe(record(&calls, "kept"))?;

    assert!(operation.unsubscribe(first));
    assert!(!operation.unsubscribe(first));

    operation.notify_completion()?;
    assert_eq!(*calls.borrow(), vec!["kept"]);
    Ok(())
}

#[test]
fn test_unsubscribe_after_completion_is_a_no_op() -> Result<()> {
    let (operation, _task) = operation();
    let id = operation.subscribe(|_: &AsyncOperation| Ok(()))?;
    operation.notify_completion()?;

    assert!(!operation.unsubscribe(id));
    Ok(())
}

#[test]
fn test_native_task_is_released_exactly_once() {
    let task = DriverTask::default();
    let releases = task.releases.clone();

    let disposed = AsyncOperation::from_task(task.clone());
    disposed.dispose();
    assert_eq!(releases.get(), 1);

    let dropped = AsyncOperation::from_task(task);
    drop(dropped);
    assert_eq!(releases.get(), 2);
}

#[test]
fn test_metrics_follow_completion_traffic() -> Result<()> {
    // --- 1. Setup ---
    let registry = MetricsRegistry::new();
    let metrics = YieldMetrics::register(&registry)?;
    let (first, _a) = operation();
    let first = first.with_metrics(metrics.clone());
    let (second, _b) = operation();
    let second = second.with_metrics(metrics);

    first.subscribe(|_: &AsyncOperation| Ok(()))?;
    second.subscribe(|_: &AsyncOperation| Ok(()))?;
    second.subscribe(|_: &AsyncOperation| Ok(()))?;

    // --- 2. Act ---
    first.notify_completion()?;
    first.notify_completion()?;
    first.subscribe(|_: &AsyncOperation| Ok(()))?;

    // --- 3. Assert ---
    let metrics = registry.namespace_metrics("yield");
    let value = |name: &str| {
        metrics
            .iter()
            .find(|metric| metric.id.name == name)
            .map(|metric| metric.value.clone())
    };
    assert_eq!(value("operations_completed").and_then(|v| v.as_counter()), Some(1));
    assert_eq!(value("redundant_completions").and_then(|v| v.as_counter()), Some(1));
    assert_eq!(value("late_subscriptions").and_then(|v| v.as_counter()), Some(1));
    assert_eq!(value("subscriber_faults").and_then(|v| v.as_counter()), Some(0));
    assert_eq!(value("pending_subscribers").and_then(|v| v.as_gauge()), Some(2.0));
    Ok(())
}

#[test]
fn test_dispatch_histogram_stays_bounded_over_many_completions() -> Result<()> {
    // --- 1. Setup: one shared set of metrics ---
    let registry = MetricsRegistry::new();
    let metrics = YieldMetrics::register(&registry)?;

    // --- 2. Act: many operations, each completed once ---
    for _ in 0..5_000 {
        let (operation, _task) = operation();
        let operation = operation.with_metrics(metrics.clone());
        operation.subscribe(|_: &AsyncOperation| Ok(()))?;
        operation.notify_completion()?;
    }

    // --- 3. Assert: totals advance, storage does not grow ---
    let dispatch = registry
        .namespace_metrics("yield")
        .into_iter()
        .find(|metric| metric.id.name == "dispatch_ms")
        .ok_or_else(|| anyhow!("dispatch_ms not registered"))?;
    match dispatch.value {
        MetricValue::Histogram {
            count,
            bucket_counts,
            ..
        } => {
            assert_eq!(count, 5_000);
            assert_eq!(bucket_counts.len(), 5);
        }
        other => panic!("expected a histogram, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_completion_signal_resolves_with_operation_id() -> Result<()> {
    let (operation, _task) = operation();
    let pending = operation.completion_signal();
    assert_eq!(operation.pending_subscribers(), 1);

    operation.notify_completion()?;
    assert_eq!(pending.await?, operation.id());

    // Already done: the signal is resolved on creation.
    assert_eq!(operation.completion_signal().await?, operation.id());
    Ok(())
}

#[tokio::test]
async fn test_completion_signal_errors_when_operation_is_dropped() {
    let (operation, _task) = operation();
    let pending = operation.completion_signal();
    drop(operation);
    assert!(pending.await.is_err());
}
