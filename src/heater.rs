//! Heater threshold control.
//!
//! [`HeaterController::decide`] is the pure on/off rule. [`Thermostat`]
//! applies it to a [`BinaryActuator`] as monitor events arrive.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use crate::data::ProbeState;
use crate::error::{Error, Result};
use crate::hw::{BinaryActuator, HeaterLevel};
use crate::monitor::{CallbackHandle, MonitorEvent, ProbeMonitor};

/// Default preset in °F.
pub const DEFAULT_PRESET_F: f64 = 220.0;

/// Step applied by [`Thermostat::increment_preset`] and
/// [`Thermostat::decrement_preset`], in °F.
pub const PRESET_STEP_F: f64 = 1.0;

/// Single-threshold heater rule.
///
/// There is no hysteresis band: a reading that oscillates around the preset
/// flips the decision on every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaterController;

impl HeaterController {
    /// Decide the heater level for a temperature and preset, both in °F.
    ///
    /// Returns `None` when `current_f` is NaN; the caller keeps its previous
    /// decision.
    ///
    /// # Example
    ///
    /// ```
    /// use still_monitor::{HeaterController, HeaterLevel};
    ///
    /// assert_eq!(HeaterController::decide(257.0, 220.0), Some(HeaterLevel::Off));
    /// assert_eq!(HeaterController::decide(200.0, 220.0), Some(HeaterLevel::On));
    /// assert_eq!(HeaterController::decide(f64::NAN, 220.0), None);
    /// ```
    pub fn decide(current_f: f64, preset_f: f64) -> Option<HeaterLevel> {
        if current_f.is_nan() {
            return None;
        }

        if current_f < preset_f {
            Some(HeaterLevel::On)
        } else {
            Some(HeaterLevel::Off)
        }
    }
}

struct ThermostatState {
    preset_f: f64,
    level: HeaterLevel,
    temperature_f: f64,
    probe_state: ProbeState,
}

/// Drives a heater from probe monitor events.
///
/// Every valid temperature update re-evaluates the threshold and writes the
/// actuator. Updates carrying NaN are ignored, so the heater holds its last
/// level while the reading is lost.
pub struct Thermostat {
    actuator: Arc<dyn BinaryActuator>,
    state: RwLock<ThermostatState>,
}

impl Thermostat {
    /// Create a thermostat with the default preset.
    pub fn new(actuator: Arc<dyn BinaryActuator>) -> Self {
        Self {
            actuator,
            state: RwLock::new(ThermostatState {
                preset_f: DEFAULT_PRESET_F,
                level: HeaterLevel::Off,
                temperature_f: f64::NAN,
                probe_state: ProbeState::Disconnected,
            }),
        }
    }

    /// Create a thermostat with the given preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset is not finite.
    pub fn with_preset(actuator: Arc<dyn BinaryActuator>, preset_f: f64) -> Result<Self> {
        let thermostat = Self::new(actuator);
        thermostat.set_preset(preset_f)?;
        Ok(thermostat)
    }

    // === Preset ===

    /// Get the preset in °F.
    pub fn preset(&self) -> f64 {
        self.state.read().preset_f
    }

    /// Set the preset in °F.
    ///
    /// Takes effect on the next temperature update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the preset is not finite.
    pub fn set_preset(&self, preset_f: f64) -> Result<()> {
        if !preset_f.is_finite() {
            return Err(Error::InvalidParameter {
                name: "preset".to_string(),
                value: preset_f.to_string(),
            });
        }

        self.state.write().preset_f = preset_f;
        debug!("Preset set to {:.1}°F", preset_f);
        Ok(())
    }

    /// Raise the preset by one degree. Returns the new preset.
    pub fn increment_preset(&self) -> f64 {
        let mut state = self.state.write();
        state.preset_f += PRESET_STEP_F;
        state.preset_f
    }

    /// Lower the preset by one degree. Returns the new preset.
    pub fn decrement_preset(&self) -> f64 {
        let mut state = self.state.write();
        state.preset_f -= PRESET_STEP_F;
        state.preset_f
    }

    // === Status ===

    /// Get the level last written to the actuator.
    pub fn heater_level(&self) -> HeaterLevel {
        self.state.read().level
    }

    /// Get the last valid temperature in °F, if any.
    pub fn temperature_f(&self) -> Option<f64> {
        let temperature_f = self.state.read().temperature_f;
        if temperature_f.is_nan() {
            None
        } else {
            Some(temperature_f)
        }
    }

    /// Get the probe state mirrored from the monitor.
    pub fn probe_state(&self) -> ProbeState {
        self.state.read().probe_state
    }

    // === Events ===

    /// Apply one monitor event.
    ///
    /// Returns the level written to the actuator, or `None` if the event did
    /// not drive it.
    pub fn handle_event(&self, event: &MonitorEvent) -> Option<HeaterLevel> {
        match *event {
            MonitorEvent::StateChanged(probe_state) => {
                self.state.write().probe_state = probe_state;
                None
            }
            MonitorEvent::TemperatureChanged(temperature_f) => self.apply_temperature(temperature_f),
        }
    }

    /// Follow a monitor's events in a background task.
    ///
    /// Dropping the returned handle detaches the thermostat.
    pub fn attach(self: &Arc<Self>, monitor: &ProbeMonitor) -> CallbackHandle {
        let thermostat = Arc::clone(self);
        monitor.on_event(move |event| {
            thermostat.handle_event(event);
        })
    }

    fn apply_temperature(&self, temperature_f: f64) -> Option<HeaterLevel> {
        let (level, previous) = {
            let mut state = self.state.write();
            let level = HeaterController::decide(temperature_f, state.preset_f)?;
            let previous = state.level;
            state.temperature_f = temperature_f;
            state.level = level;
            (level, previous)
        };

        self.actuator.set_level(level);

        if level != previous {
            info!("Heater {} at {:.1}°F (preset {:.1}°F)", level, temperature_f, self.preset());
        }

        Some(level)
    }
}

impl std::fmt::Debug for Thermostat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Thermostat")
            .field("preset_f", &state.preset_f)
            .field("level", &state.level)
            .field("temperature_f", &state.temperature_f)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::actuator::MockBinaryActuator;
    use crate::hw::FrameSource;
    use crate::protocol::Frame;
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::time::Duration;

    /// Actuator that records every write.
    #[derive(Default)]
    struct RecordingActuator {
        writes: Mutex<Vec<HeaterLevel>>,
    }

    impl BinaryActuator for RecordingActuator {
        fn set_level(&self, level: HeaterLevel) {
            self.writes.lock().push(level);
        }
    }

    struct FixedSource(u32);

    #[async_trait]
    impl FrameSource for FixedSource {
        fn is_present(&self) -> bool {
            true
        }

        async fn read_frame(&self) -> Result<u32> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_decide_threshold() {
        assert_eq!(HeaterController::decide(257.0, 220.0), Some(HeaterLevel::Off));
        assert_eq!(HeaterController::decide(219.9, 220.0), Some(HeaterLevel::On));
        assert_eq!(HeaterController::decide(220.0, 220.0), Some(HeaterLevel::Off));
        assert_eq!(HeaterController::decide(f64::NAN, 220.0), None);
    }

    #[test]
    fn test_no_hysteresis() {
        let levels: Vec<_> = [219.75, 220.25, 219.75, 220.25]
            .iter()
            .map(|t| HeaterController::decide(*t, 220.0))
            .collect();
        assert_eq!(
            levels,
            vec![
                Some(HeaterLevel::On),
                Some(HeaterLevel::Off),
                Some(HeaterLevel::On),
                Some(HeaterLevel::Off),
            ]
        );
    }

    #[test]
    fn test_thermostat_defaults() {
        let thermostat = Thermostat::new(Arc::new(RecordingActuator::default()));
        assert_eq!(thermostat.preset(), DEFAULT_PRESET_F);
        assert_eq!(thermostat.heater_level(), HeaterLevel::Off);
        assert_eq!(thermostat.temperature_f(), None);
        assert_eq!(thermostat.probe_state(), ProbeState::Disconnected);
    }

    #[test]
    fn test_thermostat_drives_actuator() {
        let mut actuator = MockBinaryActuator::new();
        let mut seq = Sequence::new();
        actuator
            .expect_set_level()
            .with(eq(HeaterLevel::On))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        actuator
            .expect_set_level()
            .with(eq(HeaterLevel::Off))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let thermostat = Thermostat::with_preset(Arc::new(actuator), 160.0).unwrap();

        assert_eq!(
            thermostat.handle_event(&MonitorEvent::TemperatureChanged(150.0)),
            Some(HeaterLevel::On)
        );
        assert_eq!(
            thermostat.handle_event(&MonitorEvent::TemperatureChanged(165.0)),
            Some(HeaterLevel::Off)
        );
        assert_eq!(thermostat.temperature_f(), Some(165.0));
    }

    #[test]
    fn test_nan_keeps_previous_level() {
        let mut actuator = MockBinaryActuator::new();
        actuator
            .expect_set_level()
            .with(eq(HeaterLevel::On))
            .times(1)
            .return_const(());

        let thermostat = Thermostat::new(Arc::new(actuator));
        thermostat.handle_event(&MonitorEvent::TemperatureChanged(100.0));

        assert_eq!(
            thermostat.handle_event(&MonitorEvent::TemperatureChanged(f64::NAN)),
            None
        );
        assert_eq!(thermostat.heater_level(), HeaterLevel::On);
        assert_eq!(thermostat.temperature_f(), Some(100.0));
    }

    #[test]
    fn test_state_changes_do_not_drive_actuator() {
        let mut actuator = MockBinaryActuator::new();
        actuator.expect_set_level().never();

        let thermostat = Thermostat::new(Arc::new(actuator));
        assert_eq!(
            thermostat.handle_event(&MonitorEvent::StateChanged(ProbeState::GNDShort)),
            None
        );
        assert_eq!(thermostat.probe_state(), ProbeState::GNDShort);
    }

    #[test]
    fn test_preset_adjustment() {
        let thermostat = Thermostat::new(Arc::new(RecordingActuator::default()));
        tokio_test::assert_ok!(thermostat.set_preset(160.0));
        assert_eq!(thermostat.increment_preset(), 161.0);
        assert_eq!(thermostat.increment_preset(), 162.0);
        assert_eq!(thermostat.decrement_preset(), 161.0);
        assert_eq!(thermostat.preset(), 161.0);

        tokio_test::assert_err!(thermostat.set_preset(f64::NAN));
        tokio_test::assert_err!(thermostat.set_preset(f64::INFINITY));
        assert_eq!(thermostat.preset(), 161.0);
    }

    #[test]
    fn test_preset_change_applies_on_next_update() {
        let actuator = Arc::new(RecordingActuator::default());
        let thermostat = Thermostat::with_preset(actuator.clone(), 220.0).unwrap();

        thermostat.handle_event(&MonitorEvent::TemperatureChanged(200.0));
        thermostat.set_preset(180.0).unwrap();
        assert_eq!(thermostat.heater_level(), HeaterLevel::On);

        thermostat.handle_event(&MonitorEvent::TemperatureChanged(200.0));
        assert_eq!(
            *actuator.writes.lock(),
            vec![HeaterLevel::On, HeaterLevel::Off]
        );
    }

    #[tokio::test]
    async fn test_attach_to_monitor() {
        // 125°C = 257°F, above the 220°F default preset.
        let monitor = ProbeMonitor::with_defaults(Arc::new(FixedSource(0x07D0_0000)));
        let actuator = Arc::new(RecordingActuator::default());
        let thermostat = Arc::new(Thermostat::new(actuator.clone()));
        let _handle = thermostat.attach(&monitor);

        monitor.poll().await;

        tokio::time::timeout(Duration::from_secs(1), async {
            while actuator.writes.lock().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("actuator was not written");

        assert_eq!(*actuator.writes.lock(), vec![HeaterLevel::Off]);
        assert_eq!(thermostat.probe_state(), ProbeState::Connected);
        assert_eq!(thermostat.temperature_f(), Some(257.0));
    }

    #[tokio::test]
    async fn test_fault_holds_heater_level() {
        let frame = Frame::encode(20.0, 50.0).raw();
        let source = Arc::new(FixedSource(frame));
        let monitor = ProbeMonitor::with_defaults(source);
        let actuator = Arc::new(RecordingActuator::default());
        let thermostat = Thermostat::new(actuator.clone());

        let mut rx = monitor.subscribe();
        monitor.poll().await;
        while let Ok(event) = rx.try_recv() {
            thermostat.handle_event(&event);
        }
        assert_eq!(thermostat.heater_level(), HeaterLevel::On);

        // A lost reading is delivered as NaN and must not touch the heater.
        thermostat.handle_event(&MonitorEvent::StateChanged(ProbeState::OpenCircuit));
        thermostat.handle_event(&MonitorEvent::TemperatureChanged(f64::NAN));
        assert_eq!(thermostat.heater_level(), HeaterLevel::On);
        assert_eq!(*actuator.writes.lock(), vec![HeaterLevel::On]);
    }

    proptest! {
        #[test]
        fn prop_decide_nan_never_decides(preset in -500.0f64..3000.0) {
            prop_assert_eq!(HeaterController::decide(f64::NAN, preset), None);
        }

        #[test]
        fn prop_decide_matches_threshold(current in -500.0f64..3000.0, preset in -500.0f64..3000.0) {
            let expected = if current < preset { HeaterLevel::On } else { HeaterLevel::Off };
            prop_assert_eq!(HeaterController::decide(current, preset), Some(expected));
        }
    }
}
