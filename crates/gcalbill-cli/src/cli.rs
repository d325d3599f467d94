//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gcalbill_core::OutputStyle;

/// gcalbill - Monthly work-hour billing report from Google Calendar
#[derive(Debug, Parser)]
#[command(name = "gcalbill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, env = "GCALBILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    // --- Report selection ---
    /// Calendar (project) name, the primary calendar when empty
    #[arg(long, short = 'c', env = "GCALBILL_CALENDAR")]
    pub calendar: Option<String>,

    /// First day of the period (YYYY-MM-DD), default first day of last month
    #[arg(long, short = 's')]
    pub start: Option<String>,

    /// Day after the last day of the period (YYYY-MM-DD), default first day
    /// of this month
    #[arg(long, short = 'e')]
    pub end: Option<String>,

    /// Only bill events whose description starts with this prefix
    #[arg(long, short = 'x')]
    pub search: Option<String>,

    /// Also bill expanded instances of recurring events
    #[arg(long)]
    pub include_recurring: bool,

    /// Overall deadline in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    // --- Output format flags ---
    /// Dash-separated output
    #[arg(long, short = 'd', group = "output_format")]
    pub dash: bool,

    /// Output in JSON format
    #[arg(long, group = "output_format")]
    pub json: bool,

    // --- Holidays ---
    /// Skip the public holiday lookup
    #[arg(long)]
    pub no_holidays: bool,

    /// ISO country code for holidays instead of IP geolocation
    #[arg(long)]
    pub country: Option<String>,

    /// Holiday lookup budget in seconds
    #[arg(long)]
    pub holiday_timeout: Option<u64>,

    // --- Google ---
    /// Google Cloud Console OAuth client JSON file
    #[arg(long, env = "GCALBILL_CREDENTIALS_FILE")]
    pub credentials: Option<PathBuf>,

    /// Where the OAuth token is stored
    #[arg(long)]
    pub token_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Output style requested on the command line, if any.
    pub fn style(&self) -> Option<OutputStyle> {
        if self.json {
            Some(OutputStyle::Json)
        } else if self.dash {
            Some(OutputStyle::Dash)
        } else {
            None
        }
    }
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate with Google Calendar and store the token
    Auth {
        /// Discard the stored token and authorize again
        #[arg(long, short)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration file contents
    Dump,

    /// Show configuration file path
    Path,
}
