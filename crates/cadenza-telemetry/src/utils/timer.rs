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

//! RAII timer that records the duration of a scope into a histogram.

use crate::metrics::registry::HistogramHandle;
use cadenza_core::utils::timer::Stopwatch;

/// Records the time between its creation and its drop, in milliseconds,
/// into a histogram. With no histogram it measures nothing.
pub struct ScopedMetricTimer<'a> {
    stopwatch: Stopwatch,
    histogram: Option<&'a HistogramHandle>,
}

impl<'a> ScopedMetricTimer<'a> {
    /// Starts timing for `histogram`.
    pub fn new(histogram: Option<&'a HistogramHandle>) -> Self {
        Self {
            stopwatch: Stopwatch::new(),
            histogram,
        }
    }
}

impl Drop for ScopedMetricTimer<'_> {
    fn drop(&mut self) {
        if let Some(histogram) = self.histogram {
            let elapsed_ms = self.stopwatch.elapsed_secs_f64() * 1000.0;
            if let Err(e) = histogram.observe(elapsed_ms) {
                log::warn!("[ScopedMetricTimer] Failed to record metric: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::registry::MetricsRegistry;
    use cadenza_core::telemetry::MetricValue;

    #[test]
    fn records_one_sample_per_scope() {
        let registry = MetricsRegistry::new();
        let histogram = registry
            .register_histogram("yield", "dispatch_ms", "", "ms", vec![1000.0])
            .unwrap();

        {
            let _timer = ScopedMetricTimer::new(Some(&histogram));
        }
        {
            let _timer = ScopedMetricTimer::new(Some(&histogram));
        }

        match histogram.get_metric().unwrap().value {
            MetricValue::Histogram { count, sum, .. } => {
                assert_eq!(count, 2);
                assert!(sum >= 0.0);
            }
            other => panic!("unexpected value {other:?}"),
        }
    }
}
