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

//! Counters and gauges describing completion traffic.

use cadenza_core::telemetry::MetricsResult;
use cadenza_telemetry::{CounterHandle, GaugeHandle, HistogramHandle, MetricsRegistry};

const NAMESPACE: &str = "yield";

/// Metric handles shared by every operation that reports to one registry.
///
/// Recording never fails loudly: a backend error is logged and ignored, so
/// telemetry can never change completion semantics.
#[derive(Debug, Clone)]
pub struct YieldMetrics {
    operations_completed: CounterHandle,
    redundant_completions: CounterHandle,
    subscriber_faults: CounterHandle,
    late_subscriptions: CounterHandle,
    pending_subscribers: GaugeHandle,
    dispatch_ms: HistogramHandle,
}

impl YieldMetrics {
    /// Registers the yield metrics in `registry`.
    ///
    /// Registering twice in the same registry resets the values.
    pub fn register(registry: &MetricsRegistry) -> MetricsResult<Self> {
        Ok(Self {
            operations_completed: registry.register_counter(
                NAMESPACE,
                "operations_completed",
                "Completion notifications delivered",
            )?,
            redundant_completions: registry.register_counter(
                NAMESPACE,
                "redundant_completions",
                "Completion signals ignored because the operation had already completed",
            )?,
            subscriber_faults: registry.register_counter(
                NAMESPACE,
                "subscriber_faults",
                "Completion callbacks that returned an error or panicked",
            )?,
            late_subscriptions: registry.register_counter(
                NAMESPACE,
                "late_subscriptions",
                "Subscriptions invoked immediately because the operation was already done",
            )?,
            pending_subscribers: registry.register_gauge(
                NAMESPACE,
                "pending_subscribers",
                "Callbacks waiting for a completion",
                "count",
            )?,
            dispatch_ms: registry.register_histogram(
                NAMESPACE,
                "dispatch_ms",
                "Duration of one notification pass",
                "ms",
                vec![0.01, 0.1, 1.0, 10.0, 100.0],
            )?,
        })
    }

    pub(crate) fn completion(&self) {
        record("operations_completed", self.operations_completed.increment());
    }

    pub(crate) fn redundant_completion(&self) {
        record("redundant_completions", self.redundant_completions.increment());
    }

    pub(crate) fn subscriber_fault(&self) {
        record("subscriber_faults", self.subscriber_faults.increment());
    }

    pub(crate) fn late_subscription(&self) {
        record("late_subscriptions", self.late_subscriptions.increment());
    }

    pub(crate) fn pending_changed(&self, delta: f64) {
        record("pending_subscribers", self.pending_subscribers.add(delta));
    }

    pub(crate) fn dispatch_histogram(&self) -> &HistogramHandle {
        &self.dispatch_ms
    }
}

fn record<T>(name: &str, result: MetricsResult<T>) {
    if let Err(e) = result {
        log::warn!("Failed to record yield metric '{name}': {e}");
    }
}
