use crate::{
    errors::ErrorKind,
    http::types::{self, HeaderMap, Method},
    limits::ReqLimits,
};
use memchr::{memchr, memmem};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// A parsed HTTP request.
///
/// Built once per connection by the parser and never modified afterwards.
///
/// # Accepted format
///
/// - `SP`: ASCII space (0x20)
/// - Lines end with `LF`; a single `CR` right before it is stripped.
///
/// ## Request line
///
/// ```text
/// [METHOD] SP [PATH] SP [VERSION] CRLF
/// ```
///
/// The method is one of `GET`, `POST`, or anything else (kept as
/// [`Method::Unknown`]). The path is stored as raw bytes, without
/// percent-decoding or any UTF-8 requirement.
/// The version token is read and discarded; it may even be missing.
/// A line without a space, or with an empty path, is rejected.
///
/// ## Headers
///
/// ```text
/// [NAME] ": " [VALUE] CRLF
/// ```
///
/// The line is split on the first `": "`. Names and values are kept as
/// raw bytes. A repeated name keeps its first value but still counts
/// towards [`ReqLimits::header_count`]. The block ends at the first empty
/// line.
///
/// ## Body
///
/// Read only when `Content-Length` parses as a non-negative integer, in
/// which case exactly that many bytes are read, uninterpreted. Anything
/// else (chunked encoding, read-until-close) is not supported.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    path: Vec<u8>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

// Public API
impl Request {
    #[inline(always)]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Raw request target, e.g. `/echo/abc%20def`.
    #[inline(always)]
    pub fn path(&self) -> &[u8] {
        &self.path
    }

    #[inline(always)]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the header value with case-insensitive name matching.
    #[inline(always)]
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers.get(name)
    }

    /// Value of `User-Agent`, or `""` when the client did not send one.
    #[inline]
    pub fn user_agent(&self) -> &[u8] {
        self.header("User-Agent").unwrap_or_default()
    }

    /// Returns the request body if `Content-Length` was present and valid.
    #[inline(always)]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

//

/// Line-oriented request reader.
///
/// The line buffer is reused for every line of the request.
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    limits: &'a ReqLimits,
    line: Vec<u8>,
}

impl<'a> Parser<'a> {
    #[inline]
    pub(crate) fn new(limits: &'a ReqLimits) -> Self {
        Self {
            limits,
            line: Vec::with_capacity(256),
        }
    }

    /// Reads one request from `reader`.
    ///
    /// Returns `Ok(None)` when the stream ends before a complete request
    /// line arrived; the caller closes the connection without answering.
    pub(crate) async fn parse<R>(&mut self, reader: &mut R) -> Result<Option<Request>, ErrorKind>
    where
        R: AsyncBufRead + Unpin,
    {
        if !self.read_line(reader).await? {
            return Ok(None);
        }
        let (method, path) = self.parse_request_line()?;

        let mut headers = HeaderMap::new();
        let mut lines = 0;
        loop {
            if !self.read_line(reader).await? {
                return Err(ErrorKind::unexpected_eof());
            }
            if self.line.is_empty() {
                break;
            }
            lines += 1;
            if lines > self.limits.header_count {
                return Err(ErrorKind::TooManyHeaders);
            }

            let (name, value) = self.parse_header()?;
            headers.set(name, value);
        }

        let body = match headers
            .get("Content-Length")
            .and_then(|value| types::slice_to_usize(types::trim_ows(value)))
        {
            Some(len) => Some(self.read_body(reader, len).await?),
            None => None,
        };

        Ok(Some(Request {
            method,
            path,
            headers,
            body,
        }))
    }

    // Reads up to and including `\n`, then drops the terminator and one
    // trailing `\r`. Returns `false` on end of stream before a full line.
    async fn read_line<R>(&mut self, reader: &mut R) -> Result<bool, ErrorKind>
    where
        R: AsyncBufRead + Unpin,
    {
        self.line.clear();

        let limit = self.limits.line_size as u64;
        let n = (&mut *reader)
            .take(limit)
            .read_until(b'\n', &mut self.line)
            .await?;

        match self.line.last() {
            Some(b'\n') => {
                self.line.pop();
                if self.line.last() == Some(&b'\r') {
                    self.line.pop();
                }
                Ok(true)
            }
            _ if n as u64 == limit => Err(ErrorKind::LineTooLong),
            _ => Ok(false),
        }
    }

    #[inline]
    fn parse_request_line(&self) -> Result<(Method, Vec<u8>), ErrorKind> {
        let line = self.line.as_slice();

        let method_end = memchr(b' ', line).ok_or(ErrorKind::InvalidRequestLine)?;
        let rest = &line[method_end + 1..];
        let path_end = memchr(b' ', rest).unwrap_or(rest.len());

        let path = &rest[..path_end];
        if path.is_empty() {
            return Err(ErrorKind::InvalidRequestLine);
        }

        Ok((Method::from_bytes(&line[..method_end]), path.to_vec()))
    }

    #[inline]
    fn parse_header(&self) -> Result<(&[u8], &[u8]), ErrorKind> {
        let line = self.line.as_slice();

        let colon = memmem::find(line, b": ")
            .filter(|&i| i > 0)
            .ok_or(ErrorKind::InvalidHeader)?;

        Ok((&line[..colon], &line[colon + 2..]))
    }

    async fn read_body<R>(&mut self, reader: &mut R, len: usize) -> Result<Vec<u8>, ErrorKind>
    where
        R: AsyncBufRead + Unpin,
    {
        if len > self.limits.body_size {
            return Err(ErrorKind::BodyTooLarge(len));
        }

        let mut body = vec![0; len];
        reader.read_exact(&mut body).await?;
        Ok(body)
    }
}
