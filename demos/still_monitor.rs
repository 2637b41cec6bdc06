//! Simulated still with a thermocouple and heater
//!
//! Run with: cargo run --example still_monitor
//!
//! A simulated kettle warms while the heater is on and cools while it is
//! off. Partway through, the thermocouple is unplugged and then the
//! converter disappears from the bus, to show the state transitions.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use still_monitor::{
    BinaryActuator, Fault, Frame, FrameSource, HeaterLevel, MonitorConfig, MonitorEvent,
    ProbeMonitor, Result, Thermostat,
};

/// Kettle temperature model shared by the simulated bus and heater.
struct Kettle {
    celsius: Mutex<f64>,
    heating: AtomicBool,
    probe_unplugged: AtomicBool,
    converter_present: AtomicBool,
}

impl Kettle {
    fn step(&self) {
        let mut celsius = self.celsius.lock();
        if self.heating.load(Ordering::SeqCst) {
            *celsius += 4.0;
        } else {
            *celsius -= 1.5;
        }
    }
}

struct SimulatedConverter(Arc<Kettle>);

#[async_trait]
impl FrameSource for SimulatedConverter {
    fn is_present(&self) -> bool {
        self.0.converter_present.load(Ordering::SeqCst)
    }

    async fn read_frame(&self) -> Result<u32> {
        self.0.step();
        if self.0.probe_unplugged.load(Ordering::SeqCst) {
            return Ok(Frame::with_fault(Fault::OpenCircuit).raw());
        }
        Ok(Frame::encode(24.0, *self.0.celsius.lock()).raw())
    }
}

struct SimulatedHeater(Arc<Kettle>);

impl BinaryActuator for SimulatedHeater {
    fn set_level(&self, level: HeaterLevel) {
        self.0.heating.store(level.is_on(), Ordering::SeqCst);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "still_monitor=info".into()),
        )
        .init();

    println!("Still Monitor (simulated)");
    println!("=========================\n");

    let kettle = Arc::new(Kettle {
        celsius: Mutex::new(20.0),
        heating: AtomicBool::new(false),
        probe_unplugged: AtomicBool::new(false),
        converter_present: AtomicBool::new(true),
    });

    let config = MonitorConfig::new()
        .with_poll_interval(Duration::from_millis(200))
        .with_absent_backoff(Duration::from_millis(500));
    let monitor = Arc::new(ProbeMonitor::new(
        Arc::new(SimulatedConverter(kettle.clone())),
        config,
    )?);

    // 160°F is about 71°C.
    let thermostat = Arc::new(Thermostat::with_preset(
        Arc::new(SimulatedHeater(kettle.clone())),
        160.0,
    )?);
    let _attached = thermostat.attach(&monitor);

    let _printer = monitor.on_event(|event| match event {
        MonitorEvent::StateChanged(state) => println!("  state -> {}", state),
        MonitorEvent::TemperatureChanged(f) if f.is_nan() => println!("  temp  -> --"),
        MonitorEvent::TemperatureChanged(f) => println!("  temp  -> {:.0}°F", f.round()),
    });

    let polling = monitor.spawn_polling();

    tokio::time::sleep(Duration::from_secs(8)).await;
    println!("\nUnplugging thermocouple...");
    kettle.probe_unplugged.store(true, Ordering::SeqCst);

    tokio::time::sleep(Duration::from_secs(1)).await;
    println!("\nRemoving converter...");
    kettle.converter_present.store(false, Ordering::SeqCst);

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("\nRestoring converter and thermocouple...");
    kettle.probe_unplugged.store(false, Ordering::SeqCst);
    kettle.converter_present.store(true, Ordering::SeqCst);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = tokio::time::sleep(Duration::from_secs(3)) => {}
    }

    polling.stop().await;

    let snapshot = monitor.snapshot();
    println!("\nFinal state: {}", snapshot.state);
    match snapshot.temperature_f() {
        Some(f) => println!("Final temperature: {:.1}°F", f),
        None => println!("Final temperature: --"),
    }
    println!("Heater: {} (preset {:.0}°F)", thermostat.heater_level(), thermostat.preset());

    Ok(())
}
