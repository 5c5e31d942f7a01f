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

use cadenza_core::native::{NativeResource, NativeTask};
use cadenza_telemetry::MetricsRegistry;
use cadenza_yield::{AsyncOperation, Yield, YieldMetrics};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

struct IdleTask;

impl NativeResource for IdleTask {
    fn release(&mut self) {}
}

impl NativeTask for IdleTask {
    fn is_done(&self) -> bool {
        false
    }

    fn progress(&self) -> f32 {
        0.0
    }

    fn priority(&self) -> i32 {
        0
    }

    fn set_priority(&mut self, _priority: i32) {}
}

fn operation_with_subscribers(count: usize, hits: &Rc<Cell<u64>>) -> AsyncOperation {
    let operation = AsyncOperation::from_task(IdleTask);
    for _ in 0..count {
        let hits = hits.clone();
        operation
            .subscribe(move |_: &AsyncOperation| {
                hits.set(hits.get() + 1);
                Ok(())
            })
            .expect("pending operation accepts subscribers");
    }
    operation
}

fn bench_completion(c: &mut Criterion) {
    let hits = Rc::new(Cell::new(0u64));
    let registry = MetricsRegistry::new();
    let metrics = YieldMetrics::register(&registry).ok();

    let mut group = c.benchmark_group("Completion Dispatch");

    for count in [1usize, 16, 256] {
        group.bench_function(format!("notify {count} subscribers"), |b| {
            b.iter_batched(
                || operation_with_subscribers(count, &hits),
                |operation| black_box(operation.notify_completion()),
                BatchSize::SmallInput,
            );
        });
    }

    if let Some(metrics) = metrics {
        group.bench_function("notify 256 subscribers (with metrics)", |b| {
            b.iter_batched(
                || operation_with_subscribers(256, &hits).with_metrics(metrics.clone()),
                |operation| black_box(operation.notify_completion()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_polling(c: &mut Criterion) {
    let flag = Rc::new(Cell::new(false));

    let mut group = c.benchmark_group("Yield Polling");

    group.bench_function("poll 1000 pending conditions", |b| {
        let mut queue: Vec<Yield> = (0..1000)
            .map(|_| {
                let flag = flag.clone();
                Yield::until(move || flag.get())
            })
            .collect();
        b.iter(|| {
            for wait in queue.iter_mut() {
                black_box(wait.poll());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_completion, bench_polling);
criterion_main!(benches);
