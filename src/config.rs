//! Register configuration

use std::path::PathBuf;

use clap::Parser;
use decimal_percentage::Percentage;

use crate::{
    fixtures::products::parse_percentage, pricing::is_valid_tax_rate, products::LOW_STOCK_THRESHOLD,
};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Teddy Bear POS register configuration
#[derive(Debug, Parser)]
#[command(
    name = "teddy-pos",
    about = "Replay a scripted sale session through the Teddy Bear POS register",
    long_about = None
)]
pub struct PosConfig {
    /// Fixture base directory
    #[arg(short, long, env = "TEDDY_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Product and customer fixture set
    #[arg(short, long, env = "TEDDY_SET", default_value = "teddy-bears")]
    pub set: String,

    /// Session fixture to replay
    #[arg(long, env = "TEDDY_SESSION", default_value = "demo")]
    pub session: String,

    /// Sales tax rate ("8%" or "0.08")
    #[arg(short, long, env = "TEDDY_TAX_RATE", default_value = "8%", value_parser = parse_tax_rate)]
    pub tax_rate: Percentage,

    /// Stock level below which products are reported
    #[arg(long, env = "TEDDY_LOW_STOCK_THRESHOLD", default_value_t = LOW_STOCK_THRESHOLD)]
    pub low_stock_threshold: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl PosConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

fn parse_tax_rate(s: &str) -> Result<Percentage, String> {
    let rate = parse_percentage(s).map_err(|err| err.to_string())?;

    if !is_valid_tax_rate(rate) {
        return Err(format!(
            "tax rate {s} is outside 0%..=100%; write 8% as \"8%\" or \"0.08\""
        ));
    }

    Ok(rate)
}
