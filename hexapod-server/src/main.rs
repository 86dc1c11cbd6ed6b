//! Hexapod host controller CLI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use hexapod_core::config::JointName;
use hexapod_core::host::Controller;
use hexapod_core::traits::ServoChannel;
use hexapod_server::cli::{Cli, Commands};
use hexapod_server::config::{init_logging, ServerConfig};
use hexapod_server::serial::{self, SerialTransport};
use hexapod_server::{emulator, selftest, session, ServerError};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        ServerConfig::load_or_default(cli.config.as_deref()).context("Failed to load config")?;
    cli.apply(&mut config);
    init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Ports => list_ports(),
        Commands::Emulate => emulate(&config),
        Commands::Selftest => run_selftest(&config),
        command => run_command(&config, command),
    }
}

fn list_ports() -> Result<()> {
    let ports = serial::list_ports().context("Failed to list ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in &ports {
        println!("{}", serial::describe(port));
    }
    Ok(())
}

fn open_port(config: &ServerConfig) -> Result<SerialTransport> {
    let path = serial::find_port(config.serial.port.as_deref())
        .context("No serial port given and none detected; pass --port")?;
    SerialTransport::open(&path, &config.serial)
        .with_context(|| format!("Failed to open serial port {path}"))
}

/// Handshake, then issue the one request named by `command`
fn run_command(config: &ServerConfig, command: Commands) -> Result<()> {
    // Fail on a bad calibration file before touching the device
    let table = if command == Commands::Calibrate {
        if config.motor_calibrations.is_empty() {
            warn!("no MotorCalibrations in config, sending factory calibrations");
        }
        Some(config.calibration_table()?)
    } else {
        None
    };

    let transport = open_port(config)?;
    let mut controller = Controller::new(transport, config.handshake);

    let device = match session::connect(&mut controller) {
        Ok(device) => device,
        Err(e @ ServerError::HandshakeFailed(_)) => {
            error!(%e, "device did not accept the handshake");
            return Err(e.into());
        }
        Err(e) => return Err(e).context("Failed to start session"),
    };

    match command {
        Commands::Handshake => {
            println!(
                "device {:#04x}, protocol version {}",
                device.device_id, device.version
            );
        }
        Commands::Calibrate => {
            if let Some(table) = table {
                controller
                    .set_angle_calibrations(&table)
                    .map_err(ServerError::from)?;
                info!("calibrations sent");
            }
        }
        Commands::Calibrations => {
            let ranges = controller
                .get_angle_calibrations()
                .map_err(ServerError::from)?;
            for (channel, range) in ServoChannel::all().zip(ranges.iter()) {
                println!(
                    "{:2} {}  {:.0} - {:.0} us",
                    channel.raw(),
                    JointName::from_channel(channel),
                    range.min_pulse,
                    range.max_pulse
                );
            }
        }
        Commands::Angle { channel, angle } => {
            controller
                .set_target_angle(channel, angle)
                .map_err(ServerError::from)?;
            info!(channel = channel.raw(), angle, "angle set");
        }
        Commands::Relay { state } => {
            controller
                .set_power_relay(state.is_on())
                .map_err(ServerError::from)?;
            info!(?state, "relay switched");
        }
        Commands::Current => {
            let amps = controller.get_current().map_err(ServerError::from)?;
            println!("{amps:.3} A");
        }
        Commands::Voltage => {
            let volts = controller.get_voltage().map_err(ServerError::from)?;
            println!("{volts:.3} V");
        }
        Commands::Sensor { channel } => {
            let volts = controller.get_sensor(channel).map_err(ServerError::from)?;
            println!("{volts:.3} V");
        }
        Commands::Heartbeat => {
            controller.heartbeat().map_err(ServerError::from)?;
            println!("device alive");
        }
        Commands::Ports | Commands::Emulate | Commands::Selftest => {}
    }

    controller.close().map_err(ServerError::from)?;
    Ok(())
}

fn emulate(config: &ServerConfig) -> Result<()> {
    let transport = open_port(config)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown signal received...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut device = emulator::build(transport, config.device.device_config());
    emulator::run(&mut device, &running)
        .map_err(|e| anyhow::anyhow!("emulated device stopped: {e:?}"))?;
    Ok(())
}

fn run_selftest(config: &ServerConfig) -> Result<()> {
    let report = selftest::run(config).context("Selftest failed")?;

    println!(
        "device {:#04x}, protocol version {}",
        report.device.device_id, report.device.version
    );
    println!(
        "calibrations read back: {}",
        if report.calibrations_match { "ok" } else { "MISMATCH" }
    );
    println!("rail: {:.2} V, {:.3} A", report.voltage, report.current);
    for (channel, volts) in report.sensors.iter().enumerate() {
        println!("sensor {channel}: {volts:.3} V");
    }
    println!(
        "device handled {} request(s), ignored {}",
        report.device_stats.handled, report.device_stats.ignored
    );

    if !report.calibrations_match {
        anyhow::bail!("calibrations read back differ from those sent");
    }
    Ok(())
}
