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

// Cadenza Sandbox
// Plays the external driver for a few scripted ticks so the logs can be inspected.

use anyhow::{anyhow, Result};
use cadenza_core::{
    CadenzaConfig, Clock, EventBus, FaultEvent, ManualClock, NativeResource, NativeTask,
    ScaledClock,
};
use cadenza_telemetry::{init_logging, TelemetryService};
use cadenza_yield::{AsyncOperation, Coroutine, Yield, YieldMetrics, YieldState};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

const FRAME_TIME: f64 = 1.0 / 60.0;
const TICKS: u32 = 150;

/// A pretend asset load that finishes after a fixed number of ticks.
struct SimulatedLoad {
    name: &'static str,
    ticks_left: Rc<Cell<u32>>,
    total: u32,
    priority: i32,
}

impl NativeResource for SimulatedLoad {
    fn release(&mut self) {
        log::debug!("Native load '{}' released", self.name);
    }
}

impl NativeTask for SimulatedLoad {
    fn is_done(&self) -> bool {
        self.ticks_left.get() == 0
    }

    fn progress(&self) -> f32 {
        1.0 - self.ticks_left.get() as f32 / self.total as f32
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }
}

struct SimulatedCoroutine;

impl NativeResource for SimulatedCoroutine {
    fn release(&mut self) {
        log::debug!("Native coroutine released");
    }
}

/// A load in flight, as the driver sees it.
struct InFlight {
    operation: Rc<AsyncOperation>,
    ticks_left: Rc<Cell<u32>>,
}

fn submit(
    name: &'static str,
    ticks: u32,
    metrics: &YieldMetrics,
    bus: &EventBus<FaultEvent>,
) -> InFlight {
    let ticks_left = Rc::new(Cell::new(ticks));
    let task = SimulatedLoad {
        name,
        ticks_left: ticks_left.clone(),
        total: ticks,
        priority: 0,
    };
    let operation = AsyncOperation::from_task(task)
        .with_metrics(metrics.clone())
        .with_fault_channel(bus.sender());
    InFlight {
        operation: Rc::new(operation),
        ticks_left,
    }
}

fn load_config() -> Result<CadenzaConfig> {
    match std::env::args().nth(1) {
        Some(path) => Ok(CadenzaConfig::from_path(path)?),
        None => Ok(CadenzaConfig::default()),
    }
}

fn main() -> Result<()> {
    let config = load_config()?;
    init_logging(&config.logging);
    log::info!("Starting Cadenza sandbox...");

    let mut telemetry = TelemetryService::new(Duration::from_millis(500));
    let metrics = YieldMetrics::register(telemetry.metrics_registry())?;
    let faults: EventBus<FaultEvent> = EventBus::new();

    let realtime = Rc::new(ManualClock::new());
    let game = Rc::new(ScaledClock::from_config(realtime.clone(), &config.clock));

    // --- Script side: subscriptions and waits ---
    let texture = submit("brick.png", 30, &metrics, &faults);
    let shader = submit("lit.wgsl", 45, &metrics, &faults);
    shader.operation.set_priority(10);

    texture.operation.subscribe(|op: &AsyncOperation| {
        log::info!("Texture ready ({})", op.id());
        Ok(())
    })?;
    shader.operation.subscribe(|_: &AsyncOperation| Err(anyhow!("shader failed to compile")))?;
    shader.operation.subscribe(|op: &AsyncOperation| {
        log::info!("Shader listener still notified ({})", op.id());
        Ok(())
    })?;

    let shader_done = shader.operation.clone();
    let mut waits: Vec<(&'static str, Yield)> = vec![
        ("next frame", Yield::NextFrame),
        ("one game second", Yield::seconds(1.0, game.clone())),
        ("texture", Yield::from(texture.operation.clone())),
        ("shader", Yield::until(move || shader_done.is_done())),
        ("end of frame", Yield::from(cadenza_yield::WaitForEndOfFrame)),
    ];

    let coroutine = Coroutine::from_resource(SimulatedCoroutine);
    let in_flight = [texture, shader];

    // --- Driver side: the tick loop ---
    for tick in 0..TICKS {
        realtime.advance(FRAME_TIME);

        for load in &in_flight {
            let left = load.ticks_left.get();
            if left == 0 {
                continue;
            }
            load.ticks_left.set(left - 1);
            if left == 1 {
                if let Err(e) = load.operation.notify_completion() {
                    log::warn!("Tick {tick}: {e}");
                }
            }
        }

        waits.retain_mut(|(label, wait)| match wait.poll() {
            YieldState::Waiting => true,
            YieldState::Ready => {
                log::info!("Tick {tick}: resumed after {label} (game time {:.3}s)", game.now());
                false
            }
            YieldState::Deferred(phase) => {
                log::info!("Tick {tick}: resumed at {phase} after {label}");
                false
            }
        });

        for fault in faults.drain() {
            log::warn!("Driver observed fault: {fault}");
        }

        if tick == 60 {
            game.set_time_scale(config.clock.time_scale * 0.5);
            log::info!("Tick {tick}: game time slowed to {}", game.time_scale());
        }

        telemetry.tick();
    }

    // A redundant signal is tolerated.
    in_flight[0].operation.notify_completion()?;

    coroutine.stop();
    log::info!("{} wait(s) still pending at shutdown", waits.len());
    telemetry.log_namespace("yield");
    log::info!("Sandbox finished.");
    Ok(())
}
