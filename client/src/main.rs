mod cli;

use crate::cli::{Cli, Commands, LedSetting, LevelFilter, PanDirection, TiltDirection};
use anyhow::{Context, Result};
use clap::Parser;
use orbit_usb::camera::attach;
use orbit_usb::device;
use orbit_usb::error::Error;
use orbit_usb::request::{LedMode, Request};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    CombinedLogger::init(vec![TermLogger::new(
        match args.log_level {
            LevelFilter::Off => log::LevelFilter::Off,
            LevelFilter::Error => log::LevelFilter::Error,
            LevelFilter::Warn => log::LevelFilter::Warn,
            LevelFilter::Info => log::LevelFilter::Info,
            LevelFilter::Debug => log::LevelFilter::Debug,
            LevelFilter::Trace => log::LevelFilter::Trace,
        },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("Could not configure the logger")?;

    if let Err(error) = run(&args.command) {
        match error {
            // Nothing to control is a clean condition, not a failure stack.
            Error::NotFound(condition) => eprintln!("{}", condition),
            other => eprintln!("Failure: {}", other),
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run(command: &Commands) -> Result<(), Error> {
    let request = match command {
        Commands::Scan => return scan(),
        Commands::Reset => Request::pan_tilt_reset(),
        // Deltas are in image-drag terms, see Request::pan_tilt_relative.
        Commands::Pan { direction } => match direction {
            PanDirection::Left => Request::pan_tilt_relative(1, 0),
            PanDirection::Right => Request::pan_tilt_relative(-1, 0),
        },
        Commands::Tilt { direction } => match direction {
            TiltDirection::Up => Request::pan_tilt_relative(0, 1),
            TiltDirection::Down => Request::pan_tilt_relative(0, -1),
        },
        Commands::Led { mode } => match mode {
            LedSetting::On => Request::led_control(LedMode::On, 0),
            LedSetting::Off => Request::led_control(LedMode::Off, 0),
            LedSetting::Auto => Request::led_control(LedMode::Auto, 0),
        },
    };

    let (mut camera, _records) = attach(&mut device::backend())?;
    camera.send(&request)
}

fn scan() -> Result<(), Error> {
    let (camera, records) = attach(&mut device::backend())?;

    println!("Video interface number is {}", camera.interface_number());
    for record in &records {
        println!("  {}", record);
    }

    report_unit("Motor", camera.motor_unit());
    report_unit("Hardware control", camera.hw_control_unit());
    Ok(())
}

fn report_unit(name: &str, unit: Option<u8>) {
    match unit {
        Some(id) => println!("{} unit resolved to id {}", name, id),
        None => println!("{} unit not found", name),
    }
}
