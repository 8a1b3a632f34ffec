//! # Trawl - A Concurrent TCP Connect Scanner
//!
//! Trawl sweeps one or more hosts for open TCP ports by completing full
//! connect handshakes, with an optional best-effort banner grab on
//! every open port.
//!
//! ## Features
//!
//! - **Bounded Concurrency**: all work is scheduled up front; a permit
//!   pool caps how many connection attempts are live at once
//! - **Completion-Order Streaming**: open ports are reported the moment
//!   their attempt resolves, not after the run finishes
//! - **Banner Grabbing**: passive reads for announcing services, an
//!   active HTTP probe for a configurable set of web ports
//! - **Flexible Targeting**: IP addresses and hostnames, comma-separated
//! - **Multiple Output Formats**: plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trawl::scanner::{self, work_items, ScanConfig};
//! use trawl::types::{PortSpec, TargetSpec};
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = TargetSpec::parse("127.0.0.1").unwrap().resolve().await.unwrap();
//!     let ports = "1-1024".parse::<PortSpec>().unwrap().to_ports();
//!     let config = Arc::new(ScanConfig::new().with_banners());
//!
//!     let report = scanner::run_scan(work_items(&[target], &ports), config, |result| {
//!         println!("{}:{} is open", result.host, result.port);
//!     })
//!     .await;
//!
//!     println!("{} open ports", report.open);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated ports and resolved targets
//! - [`scanner`] - The concurrent scan engine and its configuration
//! - [`probe`] - Banner grabbing on open connections
//! - [`output`] - Streaming lines and report formatting
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Connection-level error taxonomy

pub mod cli;
pub mod error;
pub mod output;
pub mod probe;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::ScanError;
pub use scanner::{PortStatus, ScanConfig, ScanReport, ScanResult, WorkItem};
pub use types::{Port, PortSpec, ScanTarget, TargetSpec};
