use std::fs::File;
use std::io::{Error, ErrorKind, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use log::*;

use fc_config::settings::{FeatureSet, Settings};
use fc_config::storage::image::{self, Image, IMAGE_SIZE};
use fc_config::{registry, ConfigStorage, DeviceConfig, FileStorage, SensorModel, Target};

mod app_settings;
mod host;

use app_settings::AppSettings;
use host::HostPlatform;

const DEFAULT_IMAGE_PATH: &str = "eeprom.bin";

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Settings image to operate on
    #[clap(short = 'i', long)]
    image: Option<PathBuf>,
    /// Gyro sensor the loop timing is derived from
    #[clap(short = 's', long, value_parser = parse_sensor)]
    sensor: Option<SensorModel>,
    #[clap(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum CliCommand {
    /// Check the stored image and list the repairs its settings need [default]
    Check,
    /// Load, repair and write back the stored settings
    Save,
    /// Reset all settings to their defaults
    Reset {
        #[clap(short = 'c', long, help = "Use the target's custom defaults")]
        custom: bool,
    },
    /// Switch the active PID profile
    Profile { index: u8 },
    /// Switch the active rate profile
    #[clap(name = "rate-profile")]
    RateProfile { index: u8 },
    /// Select the PID profile matching a battery's cell count
    #[clap(name = "auto-profile")]
    AutoProfile { cells: u8 },
    /// List, enable or disable features
    Features {
        #[clap(short = 'e', long, help = "Feature to enable, e.g. GPS")]
        enable: Vec<String>,
        #[clap(short = 'd', long, help = "Feature to disable")]
        disable: Vec<String>,
    },
    /// Print the active settings
    Show,
    /// Remember the image, sensor and board for later invocations
    Config {
        #[clap(short = 'b', long, help = "Board identifier of the target")]
        board: Option<String>,
    },
    /// Convert a settings image to JSON
    #[clap(name = "bin2json")]
    Bin2Json {
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    },
    /// Convert JSON settings to a settings image
    #[clap(name = "json2bin")]
    Json2Bin {
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    },
}

fn parse_sensor(s: &str) -> Result<SensorModel, String> {
    s.parse().map_err(|e: strum::ParseError| format!("{}: {}", s, e))
}

fn parse_feature(name: &str) -> Result<FeatureSet, Error> {
    FeatureSet::from_name(&name.to_uppercase())
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, format!("Unknown feature {}.", name)))
}

fn open_file_or_stdin(path: Option<PathBuf>) -> Result<Box<dyn Read>, std::io::Error> {
    Ok(match path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(std::io::stdin().lock()),
    })
}

fn create_file_or_stdout(path: Option<PathBuf>) -> Result<Box<dyn Write>, std::io::Error> {
    Ok(match path {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout().lock()),
    })
}

type Device = DeviceConfig<FileStorage, HostPlatform>;

fn open_device(image: PathBuf, target: Target, sensor: SensorModel) -> Device {
    let mut device = DeviceConfig::new(target, FileStorage::new(image), HostPlatform::new(sensor));
    if !device.load_and_activate() {
        warn!("Using default settings.");
    }
    device
}

fn status(ok: bool) -> colored::ColoredString {
    match ok {
        true => "OK".bright_green().bold(),
        false => "FAILED".bright_red().bold(),
    }
}

fn image_valid(device: &Device) -> bool {
    FileStorage::new(device.storage().path()).is_structure_valid()
}

fn check(mut device: Device) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = FileStorage::new(device.storage().path());
    let valid = storage.is_structure_valid();
    println!("Image {}: {}", storage.path().display(), status(valid));
    if !valid {
        return Ok(());
    }

    // load_and_activate already repaired the in-memory copy, so check what is stored
    let mut stored = registry::defaults(device.target());
    storage.load(&mut stored, device.target())?;
    *device.settings_mut() = stored;

    let report = device.validate_and_fix();
    if report.is_empty() {
        println!("{}", "No repairs needed.".bright_green());
    } else {
        for (name, _) in report.iter_names() {
            println!("{} {}", "Repaired".bright_yellow().bold(), name.to_lowercase().replace('_', " "));
        }
    }

    Ok(())
}

fn save(mut device: Device) -> Result<(), Box<dyn std::error::Error>> {
    device.save_and_notify();
    println!("Settings saved: {}", status(image_valid(&device)));
    Ok(())
}

fn reset(mut device: Device, custom: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !device.reset_to_defaults(custom) {
        return Err(Box::new(Error::new(ErrorKind::Unsupported, "No custom defaults for this target.")));
    }

    println!("Settings reset: {}", status(image_valid(&device)));
    Ok(())
}

fn select_profile(mut device: Device, select: impl FnOnce(&mut Device)) -> Result<(), Box<dyn std::error::Error>> {
    select(&mut device);
    device.write()?;
    println!(
        "Active PID profile {}, rate profile {}.",
        device.active_pid_profile_index().to_string().bright_blue().bold(),
        device.active_rate_profile_index().to_string().bright_blue().bold()
    );
    Ok(())
}

fn features(mut device: Device, enable: Vec<String>, disable: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    if !enable.is_empty() || !disable.is_empty() {
        let mut features = device.settings().features;
        for name in enable {
            features.insert(parse_feature(&name)?);
        }
        for name in disable {
            features.remove(parse_feature(&name)?);
        }

        device.write_with_features(features)?;
    }

    let unsupported = device.target().capabilities.unsupported_features();
    for (name, feature) in FeatureSet::all().iter_names() {
        let state = if unsupported.contains(feature) {
            "unsupported".white()
        } else if device.settings().features.contains(feature) {
            "enabled".bright_green()
        } else {
            "disabled".bright_red()
        };
        println!("{:<20} {}", name, state);
    }

    Ok(())
}

fn show(device: Device) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(std::io::stdout().lock(), device.settings())?;
    println!();
    Ok(())
}

fn bin2json(input: Option<PathBuf>, output: Option<PathBuf>, target: &Target) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = open_file_or_stdin(input)?;
    let mut output = create_file_or_stdout(output)?;

    let mut buffer = Vec::new();
    input.read_to_end(&mut buffer)?;
    let image: Image = buffer
        .try_into()
        .map_err(|b: Vec<u8>| Error::new(ErrorKind::InvalidData, format!("Expected {} bytes, found {}.", IMAGE_SIZE, b.len())))?;

    let mut settings = registry::defaults(target);
    image::decode::<Error>(&image, &mut settings, target)?;

    serde_json::to_writer_pretty(&mut output, &settings)?;
    output.write_all(b"\n")?;
    Ok(())
}

fn json2bin(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let input = open_file_or_stdin(input)?;
    let mut output = create_file_or_stdout(output)?;

    let settings: Settings = serde_json::from_reader(input)?;
    let mut image = [0; IMAGE_SIZE];
    image::encode::<Error>(&settings, &mut image)?;
    output.write_all(&image)?;

    Ok(())
}

fn config(
    mut app_settings: AppSettings,
    image: Option<PathBuf>,
    sensor: Option<SensorModel>,
    board: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    app_settings.update(image, sensor, board);
    app_settings.save()?;
    println!("{}", serde_json::to_string_pretty(&app_settings)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Cli::parse();
    let app_settings = AppSettings::load().unwrap_or_else(|e| {
        debug!("No app settings loaded ({}), using defaults.", e);
        AppSettings::default()
    });

    let target = app_settings.target();
    let sensor = args.sensor.unwrap_or(app_settings.sensor);
    let image = args
        .image
        .clone()
        .or_else(|| app_settings.image_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_PATH));

    match args.command.unwrap_or(CliCommand::Check) {
        CliCommand::Bin2Json { input, output } => bin2json(input, output, &target),
        CliCommand::Json2Bin { input, output } => json2bin(input, output),
        CliCommand::Check => check(open_device(image, target, sensor)),
        CliCommand::Save => save(open_device(image, target, sensor)),
        CliCommand::Reset { custom } => {
            let device = DeviceConfig::new(target, FileStorage::new(image), HostPlatform::new(sensor));
            reset(device, custom)
        }
        CliCommand::Profile { index } => {
            select_profile(open_device(image, target, sensor), |d| d.select_pid_profile(index))
        }
        CliCommand::RateProfile { index } => {
            select_profile(open_device(image, target, sensor), |d| d.select_rate_profile(index))
        }
        CliCommand::AutoProfile { cells } => select_profile(open_device(image, target, sensor), |d| {
            d.auto_select_pid_profile_by_cell_count(cells)
        }),
        CliCommand::Features { enable, disable } => features(open_device(image, target, sensor), enable, disable),
        CliCommand::Show => show(open_device(image, target, sensor)),
        CliCommand::Config { board } => config(app_settings, args.image, args.sensor, board),
    }
}
