//! Power state change notifications
//!
//! A background thread polls a [`PowerSource`] and forwards differences as
//! [`PowerEvent`]s. The UI thread drains them before redrawing, so observable
//! state is only ever mutated on the UI side.

use crate::{ChargeState, DeviceError, PowerSnapshot, PowerSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Power state changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerEvent {
    /// Charger plugged/unplugged or charge completed
    StateChanged(ChargeState),
    LowPowerModeChanged(bool),
    /// Whole-percent change of the battery level
    LevelChanged(Option<f32>),
}

impl PowerEvent {
    /// Apply this event to a snapshot
    pub fn apply(&self, snapshot: &mut PowerSnapshot) {
        match *self {
            PowerEvent::StateChanged(state) => snapshot.state = state,
            PowerEvent::LowPowerModeChanged(enabled) => snapshot.low_power_mode = enabled,
            PowerEvent::LevelChanged(level) => snapshot.level = level,
        }
    }
}

/// Events needed to go from `prev` to `next`
pub fn diff(prev: &PowerSnapshot, next: &PowerSnapshot) -> Vec<PowerEvent> {
    let mut events = Vec::new();

    if prev.state != next.state {
        events.push(PowerEvent::StateChanged(next.state));
    }
    if prev.low_power_mode != next.low_power_mode {
        events.push(PowerEvent::LowPowerModeChanged(next.low_power_mode));
    }
    if prev.percent() != next.percent() {
        events.push(PowerEvent::LevelChanged(next.level));
    }

    events
}

/// Watches a power source for changes
pub struct PowerWatcher {
    source: Arc<dyn PowerSource>,
    interval: Duration,
    tx: Sender<PowerEvent>,
    rx: Receiver<PowerEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PowerWatcher {
    pub fn new(source: Arc<dyn PowerSource>, interval: Duration) -> Self {
        let (tx, rx) = channel();
        Self {
            source,
            interval,
            tx,
            rx,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start watching; returns the baseline snapshot later events are relative to
    pub fn start(&mut self) -> Result<PowerSnapshot, DeviceError> {
        let baseline = self.source.snapshot()?;

        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(baseline);
        }

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let running = Arc::clone(&self.running);
        let interval = self.interval;

        self.handle = Some(thread::spawn(move || {
            tracing::info!("Power watcher started");
            let mut last = baseline;

            while running.load(Ordering::SeqCst) {
                thread::park_timeout(interval);
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let next = match source.snapshot() {
                    Ok(next) => next,
                    Err(e) => {
                        tracing::warn!("Failed to read power state: {}", e);
                        continue;
                    }
                };

                for event in diff(&last, &next) {
                    tracing::debug!("Power event: {:?}", event);
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                last = next;
            }

            tracing::info!("Power watcher stopped");
        }));

        Ok(baseline)
    }

    /// Stop the polling thread and wait for it to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the event receiver
    pub fn events(&self) -> &Receiver<PowerEvent> {
        &self.rx
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<PowerEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for an event with timeout
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PowerEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// All events queued so far
    pub fn drain(&self) -> Vec<PowerEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for PowerWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
