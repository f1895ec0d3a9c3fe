//! Banner grabbing functionality for TCP connections.
//!
//! Reads whatever a service sends unsolicited right after the handshake and
//! derives a short version string from it.

use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Maximum bytes to read for a banner.
pub const MAX_BANNER_SIZE: usize = 2048;

/// Longest version string kept, including the ellipsis.
pub const MAX_VERSION_LEN: usize = 60;

const ELLIPSIS: &str = "...";

/// A banner captured from an open port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Sanitised, trimmed banner text.
    pub text: String,
    /// First line of the banner, shortened for display.
    pub version: String,
}

impl Banner {
    /// Build a banner from raw bytes. Returns `None` when nothing printable
    /// remains after trimming.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let text = sanitize_banner(data);
        if text.is_empty() {
            return None;
        }
        let version = extract_version(&text);
        Some(Self { text, version })
    }
}

/// Perform one bounded read on an open stream.
///
/// The deadline covers the whole read; a silent service yields `None`.
pub async fn grab_banner(stream: &mut TcpStream, deadline: Duration) -> Option<Banner> {
    let mut buffer = vec![0u8; MAX_BANNER_SIZE];

    match timeout(deadline, stream.read(&mut buffer)).await {
        Ok(Ok(n)) if n > 0 => Banner::from_bytes(&buffer[..n]),
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            trace!(error = %e, "banner read failed");
            None
        }
        Err(_) => None,
    }
}

/// First non-empty line of a banner, truncated to [`MAX_VERSION_LEN`]
/// characters.
pub fn extract_version(banner: &str) -> String {
    let first_line = banner.trim().lines().next().unwrap_or_default().trim();
    truncate_chars(first_line, MAX_VERSION_LEN)
}

/// Shorten `s` to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Replace control bytes with '.', keep line structure, trim the ends.
fn sanitize_banner(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .chars()
        .map(|c| match c {
            '\n' | '\t' | ' ' => c,
            '\r' => '\n',
            c if c.is_control() => '.',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_sanitize_banner() {
        assert_eq!(sanitize_banner(b"SSH-2.0-OpenSSH_8.9\r\n"), "SSH-2.0-OpenSSH_8.9");
        assert_eq!(sanitize_banner(b"\x00\x01Hello\x02World\x03"), "..Hello.World.");
        assert_eq!(sanitize_banner(b"  \r\n\t "), "");
    }

    #[test]
    fn test_version_is_first_line() {
        let banner = Banner::from_bytes(b"220 mail.example.com ESMTP\r\n250 OK\r\n").unwrap();
        assert_eq!(banner.version, "220 mail.example.com ESMTP");
        assert!(banner.text.contains("250 OK"));
    }

    #[test]
    fn test_version_truncation() {
        let long = "x".repeat(80);
        let version = extract_version(&long);
        assert_eq!(version.len(), MAX_VERSION_LEN);
        assert!(version.ends_with("..."));
        assert_eq!(&version[..57], &long[..57]);

        let exact = "y".repeat(MAX_VERSION_LEN);
        assert_eq!(extract_version(&exact), exact);
    }

    #[test]
    fn test_truncate_multibyte() {
        let s = "é".repeat(10);
        assert_eq!(truncate_chars(&s, 5), "éé...");
    }

    #[test]
    fn test_empty_banner() {
        assert!(Banner::from_bytes(b"\r\n  ").is_none());
    }

    #[tokio::test]
    async fn test_grab_banner_from_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"SSH-2.0-OpenSSH_9.6\r\n").await.unwrap();
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let banner = grab_banner(&mut stream, Duration::from_secs(2)).await.unwrap();
        assert_eq!(banner.text, "SSH-2.0-OpenSSH_9.6");
        assert_eq!(banner.version, "SSH-2.0-OpenSSH_9.6");
    }

    #[tokio::test]
    async fn test_silent_service_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(socket);
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        assert!(grab_banner(&mut stream, Duration::from_millis(100)).await.is_none());
    }
}
