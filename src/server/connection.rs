use crate::{
    errors::ErrorKind,
    http::{encoding::EncoderRegistry, request::Parser},
    limits::{ConnLimits, ReqLimits},
    router::Handler,
};
use std::{io, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    time::timeout,
};
use tracing::debug;

/// Everything a connection task needs, shared read-only between tasks.
pub(crate) struct Shared<H: Handler> {
    pub(crate) handler: H,
    pub(crate) encoders: EncoderRegistry,
    pub(crate) conn_limits: ConnLimits,
    pub(crate) req_limits: ReqLimits,
}

/// One request/response cycle on one stream.
pub(crate) struct HttpConnection<H: Handler> {
    shared: Arc<Shared<H>>,
}

impl<H: Handler> HttpConnection<H> {
    #[inline]
    pub(crate) fn new(shared: Arc<Shared<H>>) -> Self {
        Self { shared }
    }

    /// Serves a single request and shuts the stream down.
    ///
    /// Protocol errors are answered with `400 Bad Request`; I/O errors are
    /// returned without writing anything.
    pub(crate) async fn run<S>(&self, stream: S) -> Result<(), io::Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = BufReader::new(stream);

        let result = match self.impl_run(&mut stream).await {
            Ok(()) => Ok(()),
            Err(ErrorKind::Io(e)) => Err(e.0),
            Err(err) => {
                debug!("rejecting request: {err}");
                match err.as_http() {
                    Some(bytes) => self.write_bytes(stream.get_mut(), bytes).await,
                    None => Ok(()),
                }
            }
        };

        let _ = stream.get_mut().shutdown().await;
        result
    }

    #[inline(always)]
    async fn impl_run<S>(&self, stream: &mut BufReader<S>) -> Result<(), ErrorKind>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let shared = &*self.shared;

        let mut parser = Parser::new(&shared.req_limits);
        let Some(request) = timeout(
            shared.conn_limits.socket_read_timeout,
            parser.parse(stream),
        )
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "read timeout"))??
        else {
            debug!("peer closed before sending a request");
            return Ok(());
        };

        debug!(
            method = ?request.method(),
            path = %String::from_utf8_lossy(request.path()),
            "request"
        );

        let mut response = shared.handler.handle(&request).await;
        shared.encoders.apply(&request, &mut response);

        debug!(status = response.status().as_u16(), "response");

        self.write_bytes(stream.get_mut(), &response.serialize())
            .await?;

        Ok(())
    }

    #[inline(always)]
    async fn write_bytes<W>(&self, stream: &mut W, bytes: &[u8]) -> Result<(), io::Error>
    where
        W: AsyncWrite + Unpin,
    {
        timeout(
            self.shared.conn_limits.socket_write_timeout,
            stream.write_all(bytes),
        )
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "write timeout"))?
    }
}

#[cfg(test)]
mod connection_tests {
    use super::*;
    use crate::{router::FileRouter, tools::*};
    use flate2::read::GzDecoder;
    use std::{io::Read, time::Duration};
    use tokio::io::{duplex, AsyncReadExt};

    fn connection(dir: &std::path::Path, encoders: EncoderRegistry) -> HttpConnection<FileRouter> {
        HttpConnection::new(Arc::new(Shared {
            handler: FileRouter::new(dir),
            encoders,
            conn_limits: ConnLimits::default(),
            req_limits: ReqLimits::default(),
        }))
    }

    // Sends `raw`, closes the write side and collects everything the
    // server wrote back.
    async fn exchange(conn: &HttpConnection<FileRouter>, raw: &[u8]) -> Vec<u8> {
        let (mut client, server) = duplex(1 << 20);
        client.write_all(raw).await.unwrap();
        client.shutdown().await.unwrap();

        let _ = conn.run(server).await;

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        out
    }

    fn split_head(bytes: &[u8]) -> (&str, &[u8]) {
        let end = memchr::memmem::find(bytes, b"\r\n\r\n").unwrap() + 4;
        (str_op(&bytes[..end]), &bytes[end..])
    }

    #[tokio::test]
    async fn full_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connection(dir.path(), EncoderRegistry::default());

        #[rustfmt::skip]
        let cases: [(&[u8], &str); 7] = [
            (
                b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n",
                "HTTP/1.1 200 OK\r\n\r\n",
            ),
            (
                b"GET /echo/hello HTTP/1.1\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello",
            ),
            (
                b"GET /echo/hello HTTP/1.1\r\nAccept-Encoding: br, deflate\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello",
            ),
            (
                b"GET /user-agent HTTP/1.1\r\nuser-agent: X\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 1\r\n\r\nX",
            ),
            (
                b"GET /user-agent HTTP/1.1\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n",
            ),
            (
                b"GET /files/missing.txt HTTP/1.1\r\n\r\n",
                "HTTP/1.1 404 Not Found\r\n\r\n",
            ),
            (
                b"DELETE /nowhere HTTP/1.1\r\n\r\n",
                "HTTP/1.1 404 Not Found\r\n\r\n",
            ),
        ];

        for (raw, expected) in cases {
            assert_eq!(str_op(&exchange(&conn, raw).await), expected);
        }
    }

    #[tokio::test]
    async fn post_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connection(dir.path(), EncoderRegistry::default());

        let out = exchange(
            &conn,
            b"POST /files/foo.txt HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc",
        )
        .await;
        assert_eq!(str_op(&out), "HTTP/1.1 201 Created\r\n\r\n");

        let out = exchange(&conn, b"GET /files/foo.txt HTTP/1.1\r\n\r\n").await;
        assert_eq!(
            str_op(&out),
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/octet-stream\r\n\
             Content-Length: 3\r\n\
             \r\n\
             abc"
        );
    }

    #[tokio::test]
    async fn gzip_echo() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connection(dir.path(), EncoderRegistry::default());

        let out = exchange(
            &conn,
            b"GET /echo/hello HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n",
        )
        .await;
        let (head, body) = split_head(&out);

        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("Content-Type: text/plain\r\n"));
        assert!(head.contains("Content-Encoding: gzip\r\n"));
        assert!(head.contains(&format!("Content-Length: {}\r\n", body.len())));
        assert_ne!(body.len(), 5);

        let mut decoded = Vec::new();
        GzDecoder::new(body).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[tokio::test]
    async fn gzip_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connection(dir.path(), EncoderRegistry::empty());

        let out = exchange(
            &conn,
            b"GET /echo/hello HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n",
        )
        .await;
        assert_eq!(
            str_op(&out),
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[tokio::test]
    async fn malformed_requests_get_400() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connection(dir.path(), EncoderRegistry::default());

        #[rustfmt::skip]
        let cases: [&[u8]; 4] = [
            b"NONSENSE\r\n\r\n",
            b"GET / HTTP/1.1\r\nbroken header\r\n\r\n",
            b"GET / HTTP/1.1\r\n: no name\r\n\r\n",
            b"\r\n",
        ];

        for raw in cases {
            assert_eq!(
                str_op(&exchange(&conn, raw).await),
                "HTTP/1.1 400 Bad Request\r\nconnection: close\r\ncontent-length: 0\r\n\r\n"
            );
        }
    }

    #[tokio::test]
    async fn non_ascii_bytes_are_served() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connection(dir.path(), EncoderRegistry::default());

        #[rustfmt::skip]
        let cases: [(&[u8], &[u8]); 3] = [
            (b"GET / HTTP/1.1\r\nX-Ignored: \xff\r\n\r\n",
             b"HTTP/1.1 200 OK\r\n\r\n"),
            (b"GET /echo/caf\xe9 HTTP/1.1\r\n\r\n",
             b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 4\r\n\r\ncaf\xe9"),
            (b"GET /user-agent HTTP/1.1\r\nUser-Agent: caf\xe9\r\n\r\n",
             b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 4\r\n\r\ncaf\xe9"),
        ];

        for (raw, expected) in cases {
            assert_eq!(exchange(&conn, raw).await, expected);
        }
    }

    #[tokio::test]
    async fn closed_without_response() {
        let dir = tempfile::tempdir().unwrap();
        let conn = connection(dir.path(), EncoderRegistry::default());

        #[rustfmt::skip]
        let cases: [&[u8]; 4] = [
            b"",
            b"GET / HTTP/1.1",
            b"GET / HTTP/1.1\r\nHost: x\r\n",
            b"POST /files/x HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc",
        ];

        for raw in cases {
            assert_eq!(exchange(&conn, raw).await, b"");
        }
        assert!(!dir.path().join("x").exists());
    }

    #[tokio::test]
    async fn read_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let conn = HttpConnection::new(Arc::new(Shared {
            handler: FileRouter::new(dir.path()),
            encoders: EncoderRegistry::default(),
            conn_limits: ConnLimits {
                socket_read_timeout: Duration::from_millis(50),
                ..ConnLimits::default()
            },
            req_limits: ReqLimits::default(),
        }));

        // The client never finishes the request line and never closes
        let (mut client, server) = duplex(1024);
        client.write_all(b"GET / HT").await.unwrap();

        let err = conn.run(server).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        assert!(out.is_empty());
    }
}
