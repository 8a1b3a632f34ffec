//! Output formatting.
//!
//! Streams open-port lines to stdout as results arrive and renders the
//! end-of-run report as plain text, JSON, or CSV.

use crate::scanner::{ScanConfig, ScanReport, ScanResult};
use crate::types::ScanTarget;
use console::style;
use std::io::{self, Write};

/// Render one result in the streaming line format.
pub fn format_open_line(result: &ScanResult) -> String {
    match &result.banner {
        Some(banner) => format!("{}:{} OPEN  (banner: {})", result.host, result.port, banner),
        None => format!("{}:{} OPEN", result.host, result.port),
    }
}

/// Print one open-port line as it arrives.
pub fn print_open_line(result: &ScanResult) {
    println!("{}", format_open_line(result));
}

/// Print a header before scanning begins.
pub fn print_scan_header(targets: &[ScanTarget], ports: usize, config: &ScanConfig) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("trawl").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    for target in targets {
        println!("{} Target: {}", style("•").dim(), style(target).white().bold());
    }
    println!(
        "{} Scanning {} ports per target (concurrency {}, timeout {}ms)",
        style("•").dim(),
        style(ports).white().bold(),
        config.concurrency,
        config.timeout.as_millis()
    );
    if config.banner {
        println!("{} Banner grabbing enabled", style("•").dim());
    }
    println!();
}

/// Print the end-of-run statistics block.
pub fn print_summary(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s",
        style("Statistics:").bold(),
        report.ports_scanned,
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} open, {} closed, {} timed out, {} errors",
        style(report.open).green().bold(),
        style(report.closed).red(),
        style(report.timed_out).yellow(),
        style(report.errors).magenta()
    )?;
    writeln!(out)?;

    Ok(())
}

/// Print the full report as pretty JSON.
pub fn print_json(report: &ScanReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

/// Print retained results as CSV rows.
pub fn print_csv(report: &ScanReport) -> io::Result<()> {
    write_csv(report, io::stdout().lock())
}

fn write_csv<W: Write>(report: &ScanReport, writer: W) -> io::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["host", "ip", "port", "status", "banner", "response_time_ms"])
        .map_err(io::Error::other)?;

    for result in &report.results {
        csv.write_record(&[
            result.host.clone(),
            result.ip.to_string(),
            result.port.to_string(),
            result.status.to_string(),
            result.banner.clone().unwrap_or_default(),
            result
                .response_time_ms
                .map(|ms| ms.to_string())
                .unwrap_or_default(),
        ])
        .map_err(io::Error::other)?;
    }

    csv.flush()
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PortStatus;
    use crate::types::Port;
    use crate::types::ScanTarget;

    fn open_result(banner: Option<&str>) -> ScanResult {
        let target = ScanTarget::new("example.com", "93.184.216.34".parse().unwrap());
        ScanResult::new(&target, Port::new(80).unwrap(), PortStatus::Open)
            .with_banner(banner.map(String::from))
    }

    fn report_with(results: Vec<ScanResult>) -> ScanReport {
        ScanReport {
            targets: vec!["example.com".to_string()],
            ports_scanned: results.len(),
            open: results.iter().filter(|r| r.is_open()).count(),
            closed: 0,
            timed_out: 0,
            errors: 0,
            duration_ms: 1234,
            results,
        }
    }

    #[test]
    fn test_open_line_without_banner() {
        assert_eq!(format_open_line(&open_result(None)), "example.com:80 OPEN");
    }

    #[test]
    fn test_open_line_with_banner() {
        assert_eq!(
            format_open_line(&open_result(Some("nginx/1.24"))),
            "example.com:80 OPEN  (banner: nginx/1.24)"
        );
    }

    #[test]
    fn test_json_report_shape() {
        let report = report_with(vec![open_result(Some("nginx/1.24"))]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"open\""));
        assert!(json.contains("\"banner\":\"nginx/1.24\""));
        assert!(json.contains("\"ports_scanned\":1"));
    }

    #[test]
    fn test_csv_rows() {
        let report = report_with(vec![open_result(None)]);
        let mut buf = Vec::new();
        write_csv(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "host,ip,port,status,banner,response_time_ms"
        );
        assert_eq!(lines.next().unwrap(), "example.com,93.184.216.34,80,open,,");
    }
}
