//! HTTP response builder and wire serializer.

use crate::http::types::{HeaderMap, StatusCode};

/// An HTTP response under construction.
///
/// Created by a [`Handler`](crate::Handler), optionally rewritten by the
/// content-encoding step, then consumed by [`serialize`](Self::serialize).
///
/// # Examples
///
/// ```
/// use mini_web::{Response, StatusCode};
///
/// let mut resp = Response::new(StatusCode::Ok);
/// resp.header("Content-Type", "text/plain").body("hello");
///
/// assert_eq!(
///     resp.serialize(),
///     b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl Response {
    #[inline]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Adds a header. A name that is already present keeps its first value.
    #[inline]
    pub fn header<N: Into<Vec<u8>>, V: Into<Vec<u8>>>(&mut self, name: N, value: V) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the body. An empty body is still a body: it is serialized with
    /// `Content-Length: 0`.
    #[inline]
    pub fn body<B: Into<Vec<u8>>>(&mut self, body: B) -> &mut Self {
        self.body = Some(body.into());
        self
    }
}

// Accessors
impl Response {
    #[inline(always)]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[inline(always)]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline(always)]
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    #[inline(always)]
    pub(crate) fn body_mut(&mut self) -> Option<&mut Vec<u8>> {
        self.body.as_mut()
    }

    #[inline(always)]
    pub(crate) fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

// Serialization
impl Response {
    /// Renders the response into its exact wire form.
    ///
    /// `Content-Length` is computed here, after any encoding, and only when
    /// a body is present.
    pub fn serialize(mut self) -> Vec<u8> {
        if let Some(body) = &self.body {
            let len = body.len().to_string();
            self.headers.insert("Content-Length", len);
        }

        let mut buffer = Vec::with_capacity(self.estimated_len());
        self.write_to(&mut buffer);
        buffer
    }

    #[inline]
    fn write_to(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(self.status.to_first_line());

        for (name, value) in self.headers.iter() {
            buffer.extend_from_slice(name);
            buffer.extend_from_slice(b": ");
            buffer.extend_from_slice(value);
            buffer.extend_from_slice(b"\r\n");
        }
        buffer.extend_from_slice(b"\r\n");

        if let Some(body) = &self.body {
            buffer.extend_from_slice(body);
        }
    }

    #[inline(always)]
    fn estimated_len(&self) -> usize {
        let headers: usize = self.headers.iter().map(|(n, v)| n.len() + v.len() + 4).sum();
        32 + headers + self.body.as_ref().map_or(0, Vec::len)
    }
}
