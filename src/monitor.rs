//! Probe monitor.
//!
//! Owns the authoritative probe state, polls the frame source on a fixed
//! period, and broadcasts state and temperature changes.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::data::{MonitorConfig, MonitorSnapshot, ProbeState};
use crate::error::Result;
use crate::hw::FrameSource;
use crate::protocol::{decode, Fault, Reading};

/// Callback handle for unregistering callbacks.
pub struct CallbackHandle {
    id: u64,
    unregister_fn: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl CallbackHandle {
    /// Create a new callback handle.
    pub(crate) fn new(id: u64, unregister_fn: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id,
            unregister_fn: Some(Box::new(unregister_fn)),
        }
    }

    /// Unregister this callback.
    pub fn unregister(mut self) {
        if let Some(f) = self.unregister_fn.take() {
            f();
        }
    }

    /// Get the callback ID.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for CallbackHandle {
    fn drop(&mut self) {
        if let Some(f) = self.unregister_fn.take() {
            f();
        }
    }
}

/// Notification emitted by the monitor.
///
/// Within one tick a `StateChanged` is always sent before a
/// `TemperatureChanged`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorEvent {
    /// The probe state differs from the previous tick.
    StateChanged(ProbeState),
    /// A frame was decoded. Carries calibrated °F, or NaN when faulted.
    TemperatureChanged(f64),
}

/// Result of a single poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// A frame was read and decoded.
    Decoded(Reading),
    /// The frame source reported the converter absent.
    SourceAbsent,
    /// The frame read failed; state was left untouched.
    ReadFailed,
    /// Another poll was still in flight.
    Skipped,
}

/// Releases the single-flight flag when dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Monitors a single thermocouple converter.
pub struct ProbeMonitor {
    /// Frame source for the converter.
    source: Arc<dyn FrameSource>,
    /// Monitor configuration.
    config: MonitorConfig,
    /// Current state.
    snapshot: Arc<RwLock<MonitorSnapshot>>,
    /// Event channel.
    event_tx: broadcast::Sender<MonitorEvent>,
    /// Set while a poll is in flight.
    in_flight: AtomicBool,
    /// Callback ID counter.
    callback_counter: AtomicU64,
}

impl ProbeMonitor {
    /// Create a new monitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(source: Arc<dyn FrameSource>, config: MonitorConfig) -> Result<Self> {
        config.validate()?;

        let (event_tx, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            source,
            config,
            snapshot: Arc::new(RwLock::new(MonitorSnapshot::new())),
            event_tx,
            in_flight: AtomicBool::new(false),
            callback_counter: AtomicU64::new(0),
        })
    }

    /// Create a monitor with the default configuration.
    pub fn with_defaults(source: Arc<dyn FrameSource>) -> Self {
        let config = MonitorConfig::default();
        let (event_tx, _) = broadcast::channel(config.event_capacity);

        Self {
            source,
            config,
            snapshot: Arc::new(RwLock::new(MonitorSnapshot::new())),
            event_tx,
            in_flight: AtomicBool::new(false),
            callback_counter: AtomicU64::new(0),
        }
    }

    // === State ===

    /// Get a copy of the current state.
    pub fn snapshot(&self) -> MonitorSnapshot {
        *self.snapshot.read()
    }

    /// Get the current probe state.
    pub fn state(&self) -> ProbeState {
        self.snapshot.read().state
    }

    /// Get the calibrated probe temperature in °F (NaN when invalid).
    pub fn fahrenheit(&self) -> f64 {
        self.snapshot.read().probe_temperature_f
    }

    /// Get the internal reference temperature in °C (NaN when invalid).
    pub fn internal_celsius(&self) -> f64 {
        self.snapshot.read().internal_reference_celsius
    }

    /// Get the fault from the last decoded frame.
    pub fn fault(&self) -> Fault {
        self.snapshot.read().fault
    }

    /// Get the monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // === Events ===

    /// Subscribe to monitor events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Register a callback for every monitor event.
    pub fn on_event<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(&MonitorEvent) + Send + Sync + 'static,
    {
        let callback_id = self.callback_counter.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.event_tx.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => callback(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Event callback lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        CallbackHandle::new(callback_id, move || {
            handle.abort();
        })
    }

    /// Register a callback for state changes.
    pub fn on_state_changed<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(ProbeState) + Send + Sync + 'static,
    {
        self.on_event(move |event| {
            if let MonitorEvent::StateChanged(state) = event {
                callback(*state);
            }
        })
    }

    /// Register a callback for temperature updates in °F.
    pub fn on_temperature_changed<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_event(move |event| {
            if let MonitorEvent::TemperatureChanged(fahrenheit) = event {
                callback(*fahrenheit);
            }
        })
    }

    // === Polling ===

    /// Run one poll cycle.
    ///
    /// Transport failures are logged and absorbed; they never reach the
    /// caller. A call made while another poll is still waiting on the frame
    /// source returns [`PollOutcome::Skipped`] without touching state.
    pub async fn poll(&self) -> PollOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Previous poll still in flight, skipping tick");
            return PollOutcome::Skipped;
        };

        if !self.source.is_present() {
            self.apply_absent();
            return PollOutcome::SourceAbsent;
        }

        let frame = match self.source.read_frame().await {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to read thermocouple frame: {}", e);
                return PollOutcome::ReadFailed;
            }
        };

        let reading = decode(frame);
        self.apply_reading(&reading);
        PollOutcome::Decoded(reading)
    }

    /// Start polling on the configured period in a background task.
    pub fn spawn_polling(self: &Arc<Self>) -> PollTask {
        let monitor = Arc::clone(self);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!(
                "Polling started (period {:?})",
                monitor.config.poll_interval
            );

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        if monitor.poll().await != PollOutcome::SourceAbsent {
                            continue;
                        }

                        tokio::select! {
                            _ = &mut shutdown_rx => break,
                            _ = tokio::time::sleep(monitor.config.absent_backoff) => {}
                        }
                        ticker.reset();
                    }
                }
            }

            debug!("Polling stopped");
        });

        PollTask {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    // === Internal ===

    fn apply_absent(&self) {
        let changed = {
            let mut snapshot = self.snapshot.write();
            let changed = snapshot.state != ProbeState::DeviceNotFound;
            snapshot.state = ProbeState::DeviceNotFound;
            changed
        };

        if changed {
            info!("Thermocouple converter not found");
            let _ = self.event_tx.send(MonitorEvent::StateChanged(ProbeState::DeviceNotFound));
        }
    }

    fn apply_reading(&self, reading: &Reading) {
        let target = ProbeState::from_reading(reading);
        let fahrenheit = reading.probe_fahrenheit(self.config.calibration_offset_f);

        let previous = {
            let mut snapshot = self.snapshot.write();
            let previous = snapshot.state;
            snapshot.state = target;
            snapshot.fault = reading.fault;
            snapshot.probe_temperature_f = fahrenheit;
            snapshot.internal_reference_celsius = reading.internal_reference_celsius;
            snapshot.updated_at = Some(chrono::Utc::now());
            previous
        };

        if previous != target {
            match target {
                ProbeState::Connected => info!("Thermocouple connected"),
                ProbeState::OpenCircuit => info!("Thermocouple open circuit"),
                ProbeState::GNDShort => info!("Thermocouple shorted to GND"),
                ProbeState::VCCShort => info!("Thermocouple shorted to VCC"),
                ProbeState::Faulted => info!("Thermocouple faulted"),
                _ => {}
            }
            debug!("Probe state changed: {} -> {}", previous, target);
            let _ = self.event_tx.send(MonitorEvent::StateChanged(target));
        }

        trace!(
            "Probe {:.2}°F, internal {:.4}°C, fault {}",
            fahrenheit,
            reading.internal_reference_celsius,
            reading.fault
        );
        let _ = self
            .event_tx
            .send(MonitorEvent::TemperatureChanged(fahrenheit));
    }
}

impl std::fmt::Debug for ProbeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("ProbeMonitor")
            .field("state", &snapshot.state)
            .field("probe_temperature_f", &snapshot.probe_temperature_f)
            .field("config", &self.config)
            .finish()
    }
}

/// Handle to a running poll loop.
///
/// Dropping the handle aborts the loop; [`PollTask::stop`] lets an
/// in-flight poll finish first.
pub struct PollTask {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl PollTask {
    /// Stop polling and wait for the loop to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Check if the poll loop is still running.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
