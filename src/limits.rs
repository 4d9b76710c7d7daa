//! Server configuration limits and timeouts
//!
//! # Examples
//!
//! ```no_run
//! use mini_web::{FileRouter, Server, limits::{ConnLimits, ReqLimits}};
//! use tokio::net::TcpListener;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:4221").await.unwrap())
//!         .handler(FileRouter::new("/tmp"))
//!         .connection_limits(ConnLimits {
//!             socket_read_timeout: Duration::from_secs(5),
//!             ..ConnLimits::default()
//!         })
//!         .request_limits(ReqLimits {
//!             body_size: 64 * 1024 * 1024, // Larger uploads to `/files/`
//!             ..ReqLimits::default()
//!         })
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```

use std::time::Duration;

/// Per-connection I/O limits.
///
/// A connection serves exactly one request, so the read timeout covers
/// the whole request (line, headers and body) and the write timeout the
/// whole response.
#[derive(Debug, Clone)]
pub struct ConnLimits {
    /// Maximum time to receive a complete request.
    ///
    /// Default: `10 seconds`
    pub socket_read_timeout: Duration,

    /// Maximum time to write the complete response.
    ///
    /// Default: `10 seconds`
    pub socket_write_timeout: Duration,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ConnLimits {
    #[inline(always)]
    fn default() -> Self {
        Self {
            socket_read_timeout: Duration::from_secs(10),
            socket_write_timeout: Duration::from_secs(10),

            _priv: (),
        }
    }
}

/// Limits applied while parsing a request.
#[derive(Debug, Clone)]
pub struct ReqLimits {
    /// Maximum length of the request line or of a single header line,
    /// terminator included.
    ///
    /// Default: `8 KiB`
    pub line_size: usize,

    /// Maximum number of header lines.
    ///
    /// Default: `64`
    pub header_count: usize,

    /// Maximum accepted `Content-Length`.
    ///
    /// Default: `16 MiB`
    pub body_size: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    fn default() -> Self {
        Self {
            line_size: 8 * 1024,    // Long `/echo/` paths and cookies
            header_count: 64,       // Browsers send 10-20
            body_size: 16 << 20,    // Enough for `/files/` uploads

            _priv: (),
        }
    }
}
