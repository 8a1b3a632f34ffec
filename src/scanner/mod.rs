//! Scan engine - fans connection attempts out under a global
//! concurrency cap and surfaces results in completion order.
//!
//! All work items are scheduled up front; a semaphore is the only thing
//! bounding how many attempts are live at once. Each item runs in its
//! own task so a fault in one attempt cannot take down the run.

pub mod connect;

use crate::types::{Port, ScanTarget};
use futures::stream::{self, Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::warn;

pub use connect::ConnectScanner;

/// Ports probed with an HTTP request by default when banner grabbing.
pub const DEFAULT_HTTP_PORTS: &[u16] = &[80, 443, 8000, 8080, 8443];

/// Floor for the fan-out buffer width. The semaphore governs live
/// attempts; the buffer only needs to be wide enough not to throttle it.
const MIN_PENDING: usize = 1024;

/// Configuration for a scan run.
///
/// Passed explicitly into the orchestrator rather than read from any
/// process-wide state, so runs stay independently configurable in tests.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Per-connection handshake timeout.
    pub timeout: Duration,
    /// How long the banner prober waits for bytes.
    pub read_timeout: Duration,
    /// Maximum simultaneous connection attempts.
    pub concurrency: usize,
    /// Whether to attempt banner grabbing on open ports.
    pub banner: bool,
    /// Ports that get an active HTTP probe instead of a passive read.
    pub http_ports: Vec<u16>,
    /// Retain closed/timed-out/errored results in the report.
    pub show_closed: bool,
    /// Show a progress bar while scanning.
    pub verbose: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1000),
            read_timeout: Duration::from_millis(1000),
            concurrency: 500,
            banner: false,
            http_ports: DEFAULT_HTTP_PORTS.to_vec(),
            show_closed: false,
            verbose: false,
        }
    }
}

impl ScanConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the banner read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the concurrency cap (clamped to at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enable banner grabbing.
    pub fn with_banners(mut self) -> Self {
        self.banner = true;
        self
    }

    /// Replace the HTTP probe port list.
    pub fn with_http_ports(mut self, ports: Vec<u16>) -> Self {
        self.http_ports = ports;
        self
    }

    /// Retain non-open results in the report.
    pub fn with_closed(mut self) -> Self {
        self.show_closed = true;
        self
    }

    /// Enable the progress bar.
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Whether a port should get the active HTTP probe.
    pub fn is_http_port(&self, port: Port) -> bool {
        self.http_ports.contains(&port.as_u16())
    }
}

/// One (host, port) unit of scan work.
///
/// Duplicates are legal and scanned independently.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub target: ScanTarget,
    pub port: Port,
}

impl WorkItem {
    pub fn new(target: ScanTarget, port: Port) -> Self {
        Self { target, port }
    }
}

/// Expand hosts x ports into the ordered work-item sequence.
pub fn work_items(targets: &[ScanTarget], ports: &[Port]) -> Vec<WorkItem> {
    let mut items = Vec::with_capacity(targets.len() * ports.len());
    for target in targets {
        for &port in ports {
            items.push(WorkItem::new(target.clone(), port));
        }
    }
    items
}

/// Terminal status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// Handshake completed; a service is listening.
    Open,
    /// Connection actively refused.
    Closed,
    /// No resolution within the connection timeout.
    Timeout,
    /// Unreachable host/network or another connect-level failure.
    Error,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Timeout => write!(f, "timeout"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Result of scanning a single work item. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub host: String,
    pub ip: IpAddr,
    pub port: Port,
    pub status: PortStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ScanResult {
    /// Create a new result for a work item's target and port.
    pub fn new(target: &ScanTarget, port: Port, status: PortStatus) -> Self {
        Self {
            host: target.original.clone(),
            ip: target.ip,
            port,
            status,
            banner: None,
            response_time_ms: None,
        }
    }

    /// Attach a captured banner.
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Attach the handshake round-trip time.
    pub fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Aggregate of a finished scan run.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Distinct targets, in submission order.
    pub targets: Vec<String>,
    /// Total work items processed.
    pub ports_scanned: usize,
    pub open: usize,
    pub closed: usize,
    pub timed_out: usize,
    pub errors: usize,
    pub duration_ms: u64,
    /// Retained per-port results (open only, unless `show_closed`).
    pub results: Vec<ScanResult>,
}

/// Stream scan results in completion order.
///
/// Lazy: nothing connects until the stream is polled. The sequence is
/// finite and ends after the last work item resolves; a repeat scan
/// needs a fresh call.
pub fn scan_stream(
    items: Vec<WorkItem>,
    config: Arc<ScanConfig>,
) -> impl Stream<Item = ScanResult> {
    let concurrency = config.concurrency;
    let scanner = Arc::new(ConnectScanner::new(config));
    scan_with(items, concurrency, move |item| {
        let scanner = Arc::clone(&scanner);
        async move { scanner.scan(item).await }
    })
}

/// Generic fan-out executor with bounded concurrency.
///
/// Every item future first acquires an owned permit, then runs the
/// attempt in a spawned task. The permit is dropped when the wrapper
/// future finishes, so it is released on every exit path; a panicking
/// attempt surfaces as an `Error` result instead of aborting the run.
fn scan_with<F, Fut>(
    items: Vec<WorkItem>,
    concurrency: usize,
    attempt: F,
) -> impl Stream<Item = ScanResult>
where
    F: Fn(WorkItem) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = ScanResult> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let width = concurrency.max(MIN_PENDING);

    stream::iter(items)
        .map(move |item| {
            let semaphore = Arc::clone(&semaphore);
            let attempt = attempt.clone();
            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("scan semaphore is never closed");

                let target = item.target.clone();
                let port = item.port;
                match tokio::spawn(attempt(item)).await {
                    Ok(result) => result,
                    Err(err) => {
                        warn!(host = %target.original, port = %port, error = %err, "scan task failed");
                        ScanResult::new(&target, port, PortStatus::Error)
                    }
                }
            }
        })
        .buffer_unordered(width)
}

/// Execute a complete scan run.
///
/// Drives the stream to completion, invoking `on_result` for every
/// retained result as it arrives (this is where streaming output hooks
/// in), and returns the aggregated report.
pub async fn run_scan<F>(
    items: Vec<WorkItem>,
    config: Arc<ScanConfig>,
    mut on_result: F,
) -> ScanReport
where
    F: FnMut(&ScanResult),
{
    let started = Instant::now();
    let total = items.len();

    let mut targets: Vec<String> = Vec::new();
    for item in &items {
        if !targets.iter().any(|t| t == &item.target.original) {
            targets.push(item.target.original.clone());
        }
    }

    let progress = if config.verbose {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let (mut open, mut closed, mut timed_out, mut errors) = (0usize, 0usize, 0usize, 0usize);
    let mut results = Vec::new();

    let stream = scan_stream(items, Arc::clone(&config));
    tokio::pin!(stream);
    while let Some(result) = stream.next().await {
        match result.status {
            PortStatus::Open => open += 1,
            PortStatus::Closed => closed += 1,
            PortStatus::Timeout => timed_out += 1,
            PortStatus::Error => errors += 1,
        }

        if let Some(pb) = &progress {
            pb.inc(1);
            if result.is_open() {
                pb.set_message(format!("open: {}:{}", result.host, result.port));
            }
        }

        if result.is_open() || config.show_closed {
            on_result(&result);
            results.push(result);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("scan complete");
    }

    ScanReport {
        targets,
        ports_scanned: total,
        open,
        closed,
        timed_out,
        errors,
        duration_ms: started.elapsed().as_millis() as u64,
        results,
    }
}
