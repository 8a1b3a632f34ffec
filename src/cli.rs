//! Command-line interface definitions.
//!
//! Uses `clap` derive macros for declarative argument parsing. The CLI
//! layer owns all defaults; the engine receives a fully-populated
//! [`ScanConfig`].

use crate::scanner::{ScanConfig, DEFAULT_HTTP_PORTS};
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// A concurrent TCP connect scanner with banner grabbing.
#[derive(Parser, Debug)]
#[command(name = "trawl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP connect scanner", long_about = None)]
pub struct Args {
    /// Hosts to scan: IP addresses or hostnames, comma-separated
    #[arg(value_name = "TARGETS", value_delimiter = ',', required = true)]
    pub targets: Vec<String>,

    /// Ports to scan (e.g. "80", "80,443", "1-1024", "22,80,8000-8100")
    #[arg(short, long, default_value = "1-1024")]
    pub ports: String,

    /// Maximum number of concurrent connection attempts
    #[arg(short = 'c', long, default_value = "500")]
    pub concurrency: usize,

    /// Connection timeout in milliseconds
    #[arg(short = 't', long, default_value = "1000")]
    pub timeout: u64,

    /// Attempt to read a short banner from open ports
    #[arg(short = 'b', long)]
    pub banner: bool,

    /// Banner read timeout in milliseconds
    #[arg(long, default_value = "1000")]
    pub read_timeout: u64,

    /// Ports that get an HTTP probe when banner grabbing
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_HTTP_PORTS.to_vec())]
    pub http_ports: Vec<u16>,

    /// Keep closed/timed-out/errored ports in the report
    #[arg(long)]
    pub show_closed: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Verbose output (progress bar, debug logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Build the engine configuration from the parsed flags.
    pub fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig::new()
            .with_timeout(Duration::from_millis(self.timeout))
            .with_read_timeout(Duration::from_millis(self.read_timeout))
            .with_concurrency(self.concurrency)
            .with_http_ports(self.http_ports.clone());
        if self.banner {
            config = config.with_banners();
        }
        if self.show_closed {
            config = config.with_closed();
        }
        if self.verbose {
            config = config.with_verbose();
        }
        config
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable streaming lines plus a summary
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["trawl", "127.0.0.1"]).unwrap();
        assert_eq!(args.targets, vec!["127.0.0.1"]);
        assert_eq!(args.ports, "1-1024");
        assert_eq!(args.concurrency, 500);
        assert_eq!(args.timeout, 1000);
        assert!(!args.banner);
        assert_eq!(args.output, OutputFormat::Plain);
        assert_eq!(args.http_ports, DEFAULT_HTTP_PORTS.to_vec());
    }

    #[test]
    fn test_comma_separated_targets() {
        let args = Args::try_parse_from(["trawl", "example.com,192.168.1.1"]).unwrap();
        assert_eq!(args.targets, vec!["example.com", "192.168.1.1"]);
    }

    #[test]
    fn test_scan_config_mapping() {
        let args = Args::try_parse_from([
            "trawl",
            "127.0.0.1",
            "-c",
            "64",
            "-t",
            "250",
            "-b",
            "--http-ports",
            "80,3000",
            "--show-closed",
        ])
        .unwrap();

        let config = args.scan_config();
        assert_eq!(config.concurrency, 64);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert!(config.banner);
        assert!(config.show_closed);
        assert_eq!(config.http_ports, vec![80, 3000]);
    }
}
