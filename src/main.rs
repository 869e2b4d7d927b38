//! Stereo SLS - command line entry point
//!
//! Loads a settings file, assembles the structured light system it
//! describes and prints the system's configuration panel.
//!
//! Usage: `stereo-sls [settings.json | settings.xml]`
//!
//! Without an argument the settings are read from
//! `<config dir>/stereo-sls/settings.json`.

use std::path::PathBuf;
use std::process::ExitCode;

use stereo_sls::assembly::SystemAssembler;
use stereo_sls::calibration::FileCalibrationProvider;
use stereo_sls::camera::SettingsCameraProvider;
use stereo_sls::companion::FieldValue;
use stereo_sls::projection::SettingsPatternProjectionProvider;
use stereo_sls::telemetry::{init_logging, LogConfig};
use stereo_sls::{Settings, StereoSlsPlugin};

fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stereo-sls").join("settings.json"))
}

fn main() -> ExitCode {
    let _log_guard = match init_logging(&LogConfig::default()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let Some(path) = std::env::args().nth(1).map(PathBuf::from).or_else(default_settings_path) else {
        tracing::error!("No settings file given and no config directory available");
        return ExitCode::FAILURE;
    };

    let mut settings = match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    // Calibration files are resolved next to the settings file
    let base_dir = path.parent().map(PathBuf::from).unwrap_or_default();
    let plugin = StereoSlsPlugin::new(SystemAssembler::new(
        Box::new(FileCalibrationProvider::with_base_dir(base_dir)),
        Box::new(SettingsPatternProjectionProvider),
        Box::new(SettingsCameraProvider),
    ));
    tracing::info!("{} {}", plugin.name(), plugin.version());

    let Some(system) = plugin.get(&mut settings) else {
        tracing::error!("No structured light system could be assembled from {}", path.display());
        return ExitCode::FAILURE;
    };

    let panel = plugin.config_panel(&system);
    println!("{} [{}]", panel.title(), system.id());
    for field in panel.fields() {
        match field.value {
            FieldValue::Text(text) => println!("  {:<20} {}", field.label, text),
            FieldValue::Number(value) => println!("  {:<20} {}", field.label, value),
            FieldValue::Toggle(on) => {
                println!("  {:<20} {}", field.label, if on { "on" } else { "off" })
            }
        }
    }

    ExitCode::SUCCESS
}
