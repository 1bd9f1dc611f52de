//! Runtime configuration.
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults (9600 baud, backend `127.0.0.1:5000`, thresholds
//!    30 °C / 300 ppm / 80 dB)
//! 2. an optional TOML file
//! 3. `ENVWATCH_*` environment variables, nested with `__`
//!    (e.g. `ENVWATCH_BACKEND__HOST=10.0.0.5`)
//! 4. command-line flags, applied by the binary as overrides
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyACM0"
//! baud_rate = 9600
//!
//! [backend]
//! host = "192.168.1.20"
//! port = 5000
//!
//! [thresholds]
//! temperature = 28.0
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::data::Thresholds;
use crate::forward::{DEFAULT_HOST, DEFAULT_PORT};
use crate::source::DEFAULT_BAUD_RATE;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ENVWATCH";

/// Root configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub serial: SerialSettings,
    pub backend: BackendSettings,
    pub thresholds: ThresholdSettings,
    pub display: DisplaySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SerialSettings {
    /// Device path; picked automatically when there is exactly one port.
    pub port: Option<String>,
    pub baud_rate: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThresholdSettings {
    pub temperature: f64,
    pub air_quality: f64,
    pub sound_level: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    /// Points kept per chart; unset keeps everything.
    pub history_limit: Option<usize>,
    /// UI tick in milliseconds.
    pub refresh_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    /// Log file used while the terminal UI owns the screen.
    pub file: PathBuf,
}

/// Command-line values layered over every other source. `None` leaves
/// the lower layers untouched.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub host: Option<String>,
    pub backend_port: Option<u16>,
    /// Disable forwarding regardless of configuration.
    pub no_forward: bool,
    pub temperature: Option<f64>,
    pub air_quality: Option<f64>,
    pub sound_level: Option<f64>,
    /// Zero means unbounded.
    pub history_limit: Option<usize>,
    pub refresh_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Builder preloaded with defaults, the optional file and the
    /// environment. Callers add overrides before building.
    pub fn builder(path: Option<&Path>) -> Result<ConfigBuilder<DefaultState>> {
        let defaults = Thresholds::default();

        let mut builder = Config::builder()
            .set_default("serial.baud_rate", DEFAULT_BAUD_RATE as i64)?
            .set_default("backend.enabled", true)?
            .set_default("backend.host", DEFAULT_HOST)?
            .set_default("backend.port", DEFAULT_PORT as i64)?
            .set_default("thresholds.temperature", defaults.temperature)?
            .set_default("thresholds.air_quality", defaults.air_quality)?
            .set_default("thresholds.sound_level", defaults.sound_level)?
            .set_default("display.refresh_ms", 100i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.file", "envwatch.log")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        Ok(builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        ))
    }

    /// Load settings without command-line overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_builder(Self::builder(path)?)
    }

    /// Load settings with command-line overrides applied last.
    pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut builder = Self::builder(path)?
            .set_override_option("serial.port", overrides.port.clone())?
            .set_override_option("serial.baud_rate", overrides.baud_rate.map(i64::from))?
            .set_override_option("backend.host", overrides.host.clone())?
            .set_override_option("backend.port", overrides.backend_port.map(i64::from))?
            .set_override_option("thresholds.temperature", overrides.temperature)?
            .set_override_option("thresholds.air_quality", overrides.air_quality)?
            .set_override_option("thresholds.sound_level", overrides.sound_level)?
            .set_override_option(
                "display.history_limit",
                overrides.history_limit.map(|n| n as i64),
            )?
            .set_override_option(
                "display.refresh_ms",
                overrides.refresh_ms.map(|ms| ms as i64),
            )?
            .set_override_option(
                "logging.file",
                overrides
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?;

        if overrides.no_forward {
            builder = builder.set_override("backend.enabled", false)?;
        }

        Self::from_builder(builder)
    }

    /// Build and deserialize.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let mut settings: Self = builder.build()?.try_deserialize()?;
        if settings.display.history_limit == Some(0) {
            settings.display.history_limit = None;
        }
        Ok(settings)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            temperature: self.thresholds.temperature,
            air_quality: self.thresholds.air_quality,
            sound_level: self.thresholds.sound_level,
        }
    }
}
