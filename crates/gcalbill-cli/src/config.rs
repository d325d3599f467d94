//! Client configuration.
//!
//! Settings come from three layers, lowest first: built-in defaults, the
//! `config.toml` file (`~/.config/gcalbill/config.toml` by default) and the
//! command line. [`ReportConfig::resolve`] flattens them into the single
//! value the pipeline runs on.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gcalbill_core::{DateRange, OutputStyle, parse_day};
use gcalbill_providers::DEFAULT_HOLIDAY_TIMEOUT;

use crate::cli::Cli;
use crate::error::{ClientError, ClientResult};

/// Default overall deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Credentials file looked up when neither flag nor config names one.
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google Calendar settings.
    pub google: GoogleSettings,

    /// Report selection and rendering.
    pub report: ReportSettings,

    /// Public holiday lookup.
    pub holidays: HolidaySettings,
}

/// `[google]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// Cloud Console OAuth client JSON file.
    pub credentials_file: Option<PathBuf>,

    /// Path to token storage.
    pub token_path: Option<PathBuf>,
}

/// `[report]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Calendar (project) name, empty for the primary calendar.
    pub calendar: String,

    /// Description prefix filter, empty to bill everything.
    pub search: String,

    pub include_recurring: bool,

    /// Overall deadline in seconds.
    pub timeout_secs: u64,

    pub style: OutputStyle,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            calendar: String::new(),
            search: String::new(),
            include_recurring: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            style: OutputStyle::Tab,
        }
    }
}

/// `[holidays]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidaySettings {
    pub enabled: bool,

    /// ISO country code, geolocated when unset.
    pub country: Option<String>,

    /// Lookup budget in seconds.
    pub timeout_secs: u64,
}

impl Default for HolidaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            country: None,
            timeout_secs: DEFAULT_HOLIDAY_TIMEOUT.as_secs(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| ClientError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parses `config.toml` text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gcalbill")
    }
}

// ---------------------------------------------------------------------------
// ReportConfig (resolved)
// ---------------------------------------------------------------------------

/// Holiday lookup settings after merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayOptions {
    pub enabled: bool,
    pub country: Option<String>,
    pub timeout: Duration,
}

/// Everything one report run needs, passed explicitly to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub calendar: String,
    pub range: DateRange,
    pub search: String,
    pub include_recurring: bool,
    /// Deadline for collection plus holiday lookup. Authentication is not
    /// counted.
    pub timeout: Duration,
    pub style: OutputStyle,
    pub holidays: HolidayOptions,
    pub credentials_file: PathBuf,
    /// `None` keeps the provider default.
    pub token_path: Option<PathBuf>,
}

impl ReportConfig {
    /// Layers the command line over the config file.
    ///
    /// `today` anchors the default period (the previous calendar month).
    ///
    /// # Errors
    ///
    /// Fails on unparsable dates, an end before the start, or a zero
    /// timeout.
    pub fn resolve(cli: &Cli, file: &ClientConfig, today: NaiveDate) -> ClientResult<Self> {
        let start = cli.start.as_deref().map(parse_day).transpose()?;
        let end = cli.end.as_deref().map(parse_day).transpose()?;
        let range = DateRange::from_overrides(start, end, today)?;

        let timeout_secs = cli.timeout.unwrap_or(file.report.timeout_secs);
        if timeout_secs == 0 {
            return Err(ClientError::config("timeout must be at least one second"));
        }

        let country = cli
            .country
            .clone()
            .or_else(|| file.holidays.country.clone())
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());

        Ok(Self {
            calendar: cli
                .calendar
                .clone()
                .unwrap_or_else(|| file.report.calendar.clone()),
            range,
            search: cli
                .search
                .clone()
                .unwrap_or_else(|| file.report.search.clone()),
            include_recurring: cli.include_recurring || file.report.include_recurring,
            timeout: Duration::from_secs(timeout_secs),
            style: cli.style().unwrap_or(file.report.style),
            holidays: HolidayOptions {
                enabled: file.holidays.enabled && !cli.no_holidays,
                country,
                timeout: Duration::from_secs(
                    cli.holiday_timeout.unwrap_or(file.holidays.timeout_secs),
                ),
            },
            credentials_file: cli
                .credentials
                .clone()
                .or_else(|| file.google.credentials_file.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE)),
            token_path: cli
                .token_path
                .clone()
                .or_else(|| file.google.token_path.clone()),
        })
    }
}
