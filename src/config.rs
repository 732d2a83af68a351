//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "quickcheck-timing")]
#[command(about = "Per-tab elapsed time tracking for multi-tab inspection forms")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Default tab ids, in display order
    #[arg(long, value_delimiter = ',', default_value = "info,pulling,underhood,tires")]
    pub tabs: Vec<String>,

    /// Live refresh period in milliseconds
    #[arg(long, default_value = "1000")]
    pub refresh_interval_ms: u64,

    /// Close sessions idle for this many seconds (0 disables the sweep)
    #[arg(long, default_value = "3600")]
    pub session_idle_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1))
    }
}
