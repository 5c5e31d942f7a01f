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

//! Service owning the metrics registry of a running driver.

use crate::metrics::registry::MetricsRegistry;
use cadenza_core::telemetry::MetricValue;
use std::time::{Duration, Instant};

/// Owns a [`MetricsRegistry`] and periodically writes a summary to the log.
#[derive(Debug)]
pub struct TelemetryService {
    metrics: MetricsRegistry,
    last_report: Instant,
    report_interval: Duration,
}

impl TelemetryService {
    /// Creates a service that reports at most once per `report_interval`.
    pub fn new(report_interval: Duration) -> Self {
        Self {
            metrics: MetricsRegistry::new(),
            last_report: Instant::now(),
            report_interval,
        }
    }

    /// Should be called once per frame. Logs a summary when the interval has
    /// elapsed and returns whether it did.
    pub fn tick(&mut self) -> bool {
        if self.last_report.elapsed() >= self.report_interval {
            self.log_summary();
            self.last_report = Instant::now();
            true
        } else {
            false
        }
    }

    /// Returns the metrics registry.
    pub fn metrics_registry(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Logs every metric in `namespace` at info level.
    pub fn log_namespace(&self, namespace: &str) {
        log::info!("--- Telemetry: {namespace} ---");
        let metrics = self.metrics.namespace_metrics(namespace);
        if metrics.is_empty() {
            log::info!("  No metrics registered.");
        }
        for metric in metrics {
            match &metric.value {
                MetricValue::Counter(count) => log::info!("  {}: {count}", metric.id.name),
                MetricValue::Gauge(value) => {
                    log::info!("  {}: {value:.2} {}", metric.id.name, metric.unit)
                }
                MetricValue::Histogram { count, .. } => {
                    let mean = metric.value.histogram_mean().unwrap_or(0.0);
                    log::info!(
                        "  {}: {count} samples, mean {mean:.3} {}",
                        metric.id.name,
                        metric.unit
                    );
                }
            }
        }
    }

    fn log_summary(&self) {
        let mut namespaces: Vec<String> = self
            .metrics
            .all_metrics()
            .into_iter()
            .map(|m| m.id.namespace)
            .collect();
        namespaces.sort();
        namespaces.dedup();
        for namespace in namespaces {
            self.log_namespace(&namespace);
        }
    }
}

impl Default for TelemetryService {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_only_after_interval() {
        let mut service = TelemetryService::new(Duration::from_secs(3600));
        assert!(!service.tick());

        let mut eager = TelemetryService::new(Duration::ZERO);
        eager
            .metrics_registry()
            .register_counter("yield", "operations_completed", "")
            .unwrap();
        assert!(eager.tick());
    }
}
