//! Banner grabbing for open ports.
//!
//! Ports on the configured HTTP list get an active `GET / HTTP/1.0`
//! probe; everything else is a passive read waiting for the service to
//! announce itself (SSH, FTP and SMTP all do). A plaintext probe
//! against a TLS port (443) will not produce a meaningful banner; that
//! is a known limitation of connect-scan banner grabbing.

use crate::scanner::ScanConfig;
use crate::types::Port;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Maximum bytes read from the remote end.
const MAX_BANNER_BYTES: usize = 1024;

/// Maximum characters kept for display.
const MAX_DISPLAY_CHARS: usize = 256;

/// Try to capture a short identifying banner from an open connection.
///
/// Every failure mode (write error, read error, read timeout, nothing
/// sent) yields `None`; a missing banner never changes the port's open
/// status. The stream is consumed, so the connection is closed when
/// probing ends regardless of outcome.
pub async fn grab_banner(
    mut stream: TcpStream,
    host: &str,
    port: Port,
    config: &ScanConfig,
) -> Option<String> {
    let raw = if config.is_http_port(port) {
        http_probe(&mut stream, host, config).await
    } else {
        read_some(&mut stream, config).await
    };

    match raw {
        Some(bytes) if !bytes.is_empty() => Some(sanitize(&bytes)),
        _ => None,
    }
}

/// Send a minimal HTTP/1.0 request and read the start of the response.
async fn http_probe(stream: &mut TcpStream, host: &str, config: &ScanConfig) -> Option<Vec<u8>> {
    let request = format!("GET / HTTP/1.0\r\nHost: {}\r\nUser-Agent: trawl\r\n\r\n", host);
    if let Err(err) = stream.write_all(request.as_bytes()).await {
        trace!(error = %err, "http probe write failed");
        return None;
    }
    read_some(stream, config).await
}

/// Wait up to the read timeout for the remote to send data.
async fn read_some(stream: &mut TcpStream, config: &ScanConfig) -> Option<Vec<u8>> {
    let mut buf = vec![0u8; MAX_BANNER_BYTES];
    match timeout(config.read_timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            Some(buf)
        }
        Ok(Ok(_)) => None,
        Ok(Err(err)) => {
            trace!(error = %err, "banner read failed");
            None
        }
        // The service never spoke within the window.
        Err(_) => None,
    }
}

/// Decode permissively and squeeze into one displayable line.
///
/// Invalid UTF-8 is replaced, control characters become spaces,
/// whitespace runs collapse, and the result is bounded to
/// [`MAX_DISPLAY_CHARS`].
fn sanitize(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let mut out = String::with_capacity(MAX_DISPLAY_CHARS);
    let mut kept = 0usize;
    let mut last_was_space = true;

    for c in text.chars() {
        if kept >= MAX_DISPLAY_CHARS {
            break;
        }
        let c = if c.is_control() || c.is_whitespace() { ' ' } else { c };
        if c == ' ' {
            if !last_was_space {
                out.push(' ');
                kept += 1;
            }
            last_was_space = true;
        } else {
            out.push(c);
            kept += 1;
            last_was_space = false;
        }
    }

    out.trim_end().to_string()
}
