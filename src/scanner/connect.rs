//! TCP connect attempts.
//!
//! Completes the full handshake through the operating system's socket
//! API, so no elevated privileges are required. One socket per attempt,
//! released on every path: ownership either moves into the banner
//! prober or the stream is dropped here.

use crate::error::ScanError;
use crate::probe::grab_banner;
use crate::scanner::{PortStatus, ScanConfig, ScanResult, WorkItem};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Performs single connection attempts against resolved targets.
pub struct ConnectScanner {
    config: Arc<ScanConfig>,
}

impl ConnectScanner {
    pub fn new(config: Arc<ScanConfig>) -> Self {
        Self { config }
    }

    /// Race the handshake against the configured timeout.
    ///
    /// On timeout the pending connect future is dropped, which releases
    /// the underlying socket.
    async fn attempt(&self, addr: SocketAddr) -> Result<TcpStream, ScanError> {
        match timeout(self.config.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(err)) => Err(classify(err)),
            Err(_) => Err(ScanError::Timeout),
        }
    }

    /// Scan one work item to a terminal result. Never fails: every
    /// outcome maps onto a [`PortStatus`].
    pub async fn scan(&self, item: WorkItem) -> ScanResult {
        let addr = SocketAddr::new(item.target.ip, item.port.as_u16());
        let start = Instant::now();

        match self.attempt(addr).await {
            Ok(stream) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(host = %item.target.original, port = %item.port, "port open");

                let banner = if self.config.banner {
                    grab_banner(stream, &item.target.original, item.port, &self.config).await
                } else {
                    drop(stream);
                    None
                };

                ScanResult::new(&item.target, item.port, PortStatus::Open)
                    .with_banner(banner)
                    .with_response_time(elapsed)
            }
            Err(err) => {
                trace!(host = %item.target.original, port = %item.port, error = %err, "attempt failed");
                let status = match err {
                    ScanError::Refused => PortStatus::Closed,
                    ScanError::Timeout => PortStatus::Timeout,
                    ScanError::Unreachable(_) | ScanError::Connect(_) => PortStatus::Error,
                };
                ScanResult::new(&item.target, item.port, status)
            }
        }
    }
}

/// Map an OS connect error onto the scan error taxonomy.
fn classify(err: io::Error) -> ScanError {
    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => ScanError::Refused,
        io::ErrorKind::TimedOut => ScanError::Timeout,
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
            ScanError::Unreachable(err.to_string())
        }
        _ => ScanError::Connect(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Port, ScanTarget};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn scanner(config: ScanConfig) -> ConnectScanner {
        ConnectScanner::new(Arc::new(config))
    }

    fn item(port: u16) -> WorkItem {
        WorkItem::new(
            ScanTarget::new("127.0.0.1", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            Port::new(port).unwrap(),
        )
    }

    #[test]
    fn test_classify_refused() {
        let err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(classify(err), ScanError::Refused));
    }

    #[test]
    fn test_classify_other_is_connect_error() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(classify(err), ScanError::Connect(_)));
    }

    #[tokio::test]
    async fn test_scan_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((sock, _)) = listener.accept().await {
                drop(sock);
            }
        });

        let scanner = scanner(ScanConfig::new().with_timeout(Duration::from_millis(500)));
        let result = scanner.scan(item(port)).await;

        assert_eq!(result.status, PortStatus::Open);
        assert!(result.banner.is_none());
        assert!(result.response_time_ms.is_some());
    }

    #[tokio::test]
    async fn test_scan_closed_port() {
        // Bind and drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let scanner = scanner(ScanConfig::new().with_timeout(Duration::from_millis(500)));
        let result = scanner.scan(item(port)).await;

        assert_eq!(result.status, PortStatus::Closed);
    }

    #[tokio::test]
    async fn test_scan_unroutable_address_times_out() {
        // 203.0.113.0/24 (TEST-NET-3) is reserved and should never route.
        let scanner = scanner(ScanConfig::new().with_timeout(Duration::from_millis(200)));
        let work = WorkItem::new(
            ScanTarget::new("203.0.113.1", "203.0.113.1".parse().unwrap()),
            Port::new(80).unwrap(),
        );

        let start = Instant::now();
        let result = scanner.scan(work).await;

        // Depending on the network either the timeout fires or the OS
        // reports unreachable; both are non-open terminal statuses.
        assert!(matches!(result.status, PortStatus::Timeout | PortStatus::Error));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
