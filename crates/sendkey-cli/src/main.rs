//! sendkey CLI
//!
//! Types key chords through a keyboard input device.

use std::path::Path;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use sendkey_config::Config;
use sendkey_core::device::{enumerate_devices, DeviceDescriptor};
use sendkey_core::{effective_pattern, select, Keyboard, ModifierSet, OpenError};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "sendkey")]
#[command(about = "Type key chords through a keyboard device")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/sendkey/config.kdl")]
    config: String,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Type one or more chords, e.g. `LEFTCTRL+LEFTSHIFT+T ENTER`
    Type {
        /// Chord specs, typed in order
        #[arg(required = true)]
        specs: Vec<String>,

        /// Keys already held by the user (e.g. `LEFTMETA`)
        #[arg(short, long, default_value = "")]
        keep: String,

        /// Release stray modifiers before each chord
        #[arg(long, overrides_with = "no_clear")]
        clear: bool,

        /// Don't release stray modifiers, even if the config says to
        #[arg(long, overrides_with = "clear")]
        no_clear: bool,

        /// Device name pattern (overrides config setting)
        #[arg(short, long)]
        device: Option<String>,
    },

    /// List available input devices
    Devices {
        /// Print devices as JSON
        #[arg(long)]
        json: bool,

        /// Device name pattern used to mark the selected device
        #[arg(short, long)]
        device: Option<String>,
    },

    /// Check that the target device supports every key in the given chords
    Validate {
        #[arg(required = true)]
        specs: Vec<String>,

        /// Device name pattern (overrides config setting)
        #[arg(short, long)]
        device: Option<String>,
    },

    /// Validate the configuration file
    CheckConfig,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = sendkey_config::expand_path(&cli.config);

    match cli.command {
        Commands::Type {
            specs,
            keep,
            clear,
            no_clear,
            device,
        } => cmd_type(&config_path, &specs, &keep, clear, no_clear, device),
        Commands::Devices { json, device } => cmd_devices(&config_path, json, device),
        Commands::Validate { specs, device } => cmd_validate(&config_path, &specs, device),
        Commands::CheckConfig => cmd_check_config(&config_path),
    }
}

fn load_config(config_path: &Path) -> miette::Result<Config> {
    Ok(sendkey_config::load_config(config_path)?)
}

/// Resolve and open the target device, exiting the process if none exists.
fn open_keyboard(config: &Config, device: Option<String>) -> miette::Result<Keyboard> {
    let pattern = device.or_else(|| config.keyboard.name_pattern.clone());

    let modifiers = match &config.keyboard.modifiers {
        Some(names) => ModifierSet::from_names(names),
        None => ModifierSet::standard(),
    };

    match Keyboard::open(pattern.as_deref(), modifiers) {
        Ok(keyboard) => Ok(keyboard),
        Err(OpenError::NotFound(not_found)) => {
            eprintln!("{:?}", miette::Report::new(not_found));
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_type(
    config_path: &Path,
    specs: &[String],
    keep: &str,
    clear: bool,
    no_clear: bool,
    device: Option<String>,
) -> miette::Result<()> {
    let config = load_config(config_path)?;
    let clear = clear_requested(clear, no_clear, &config);
    let mut keyboard = open_keyboard(&config, device)?;

    if specs.len() == 1 || clear || !keep.is_empty() {
        for spec in specs {
            keyboard.type_chord(spec, keep, clear)?;
        }
    } else {
        keyboard.type_all(specs)?;
    }

    Ok(())
}

/// `--clear`/`--no-clear` win over the config file's `clear-modifiers`.
fn clear_requested(clear: bool, no_clear: bool, config: &Config) -> bool {
    if clear {
        true
    } else if no_clear {
        false
    } else {
        config.keyboard.clear_modifiers
    }
}

/// JSON shape of `devices --json`.
#[derive(Debug, Serialize)]
struct DeviceListing<'a> {
    /// Path of the device the resolver would choose
    selected: Option<&'a Path>,
    devices: &'a [DeviceDescriptor],
}

fn cmd_devices(config_path: &Path, json: bool, device: Option<String>) -> miette::Result<()> {
    let config = load_config(config_path)?;
    let pattern = device.or(config.keyboard.name_pattern);
    let devices = enumerate_devices().map_err(|e| miette::miette!("{:#}", e))?;
    let selected = select(devices.clone(), effective_pattern(pattern.as_deref()));

    if json {
        let listing = DeviceListing {
            selected: selected.as_ref().map(|d| d.path.as_path()),
            devices: &devices,
        };
        let out = serde_json::to_string_pretty(&listing).into_diagnostic()?;
        println!("{}", out);
        return Ok(());
    }

    println!("Available input devices:\n");

    for dev in &devices {
        let marker = if Some(&dev.path) == selected.as_ref().map(|d: &DeviceDescriptor| &d.path) {
            " (selected)"
        } else {
            ""
        };
        let caps: Vec<&str> = dev.capabilities.iter().map(String::as_str).collect();

        println!("  {}{}", dev.name, marker);
        println!("    Path: {}", dev.path.display());
        println!("    Capabilities: {}", if caps.is_empty() { "-".to_string() } else { caps.join(", ") });
        println!();
    }

    if selected.is_none() {
        println!("No device matches '{}'", effective_pattern(pattern.as_deref()));
    }

    Ok(())
}

fn cmd_validate(config_path: &Path, specs: &[String], device: Option<String>) -> miette::Result<()> {
    let config = load_config(config_path)?;
    let keyboard = open_keyboard(&config, device)?;

    for spec in specs {
        keyboard.validate(spec)?;
        println!("{}: ok", spec);
    }

    Ok(())
}

fn cmd_check_config(config_path: &Path) -> miette::Result<()> {
    println!("Validating configuration: {}", config_path.display());

    let config = sendkey_config::parse_config(config_path)?;

    println!("Configuration is valid!");
    println!(
        "  Device pattern: {}",
        effective_pattern(config.keyboard.name_pattern.as_deref())
    );
    println!("  Clear modifiers: {}", config.keyboard.clear_modifiers);
    match &config.keyboard.modifiers {
        Some(names) => println!("  Modifiers: {}", names.join(", ")),
        None => println!("  Modifiers: standard"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_flags(args: &[&str]) -> (bool, bool) {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Type {
                clear, no_clear, ..
            } => (clear, no_clear),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn config_with_clear(clear_modifiers: bool) -> Config {
        let mut config = Config::default();
        config.keyboard.clear_modifiers = clear_modifiers;
        config
    }

    #[test]
    fn test_no_clear_overrides_config() {
        let (clear, no_clear) = type_flags(&["sendkey", "type", "--no-clear", "A"]);
        assert!(!clear_requested(clear, no_clear, &config_with_clear(true)));
    }

    #[test]
    fn test_clear_flag_and_config_default() {
        let (clear, no_clear) = type_flags(&["sendkey", "type", "--clear", "A"]);
        assert!(clear_requested(clear, no_clear, &config_with_clear(false)));

        let (clear, no_clear) = type_flags(&["sendkey", "type", "A"]);
        assert!(clear_requested(clear, no_clear, &config_with_clear(true)));
        assert!(!clear_requested(clear, no_clear, &config_with_clear(false)));
    }

    #[test]
    fn test_last_clear_flag_wins() {
        let (clear, no_clear) = type_flags(&["sendkey", "type", "--clear", "--no-clear", "A"]);
        assert!(!clear_requested(clear, no_clear, &config_with_clear(true)));

        let (clear, no_clear) = type_flags(&["sendkey", "type", "--no-clear", "--clear", "A"]);
        assert!(clear_requested(clear, no_clear, &config_with_clear(false)));
    }

    #[test]
    fn test_device_listing_json_marks_selected() {
        let devices = vec![
            DeviceDescriptor::new("/dev/input/event2", "Mouse", ["pointer"]),
            DeviceDescriptor::new("/dev/input/event5", "KEY-BOARD", ["keyboard"]),
        ];
        let selected = select(devices.clone(), effective_pattern(None));
        let listing = DeviceListing {
            selected: selected.as_ref().map(|d| d.path.as_path()),
            devices: &devices,
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["selected"], "/dev/input/event5");
        assert_eq!(json["devices"][1]["name"], "KEY-BOARD");
        assert_eq!(json["devices"][0]["capabilities"][0], "pointer");
    }

    #[test]
    fn test_device_listing_json_without_selection() {
        let devices = vec![DeviceDescriptor::new("/dev/input/event2", "Mouse", ["pointer"])];
        let listing = DeviceListing {
            selected: None,
            devices: &devices,
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert!(json["selected"].is_null());
    }
}
