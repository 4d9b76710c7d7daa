//! Content-encoding negotiation.
//!
//! The server compresses a response body when the request's
//! `Accept-Encoding` names an encoding the registry knows. The list is
//! scanned left to right and the first known token wins; quality values
//! are not interpreted, so `gzip;q=0` is simply an unknown token.

use crate::http::{request::Request, response::Response};
use flate2::{write::GzEncoder, Compression};
use memchr::memmem;
use std::io::{self, Write};
use tracing::warn;

/// A supported content encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// gzip-framed DEFLATE, 32 KiB window, default level and strategy.
    Gzip,
}

impl Encoding {
    /// The token used in `Accept-Encoding` and `Content-Encoding`.
    #[inline]
    pub const fn token(self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
        }
    }

    /// Encodes the whole buffer in one pass.
    pub fn encode(self, input: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Encoding::Gzip => {
                let mut encoder = GzEncoder::new(
                    Vec::with_capacity(input.len() / 2 + 32),
                    Compression::default(),
                );
                encoder.write_all(input)?;
                encoder.finish()
            }
        }
    }
}

/// The set of encodings the server may apply.
///
/// Built once at startup and shared read-only by every connection.
///
/// # Examples
///
/// ```
/// use mini_web::{EncoderRegistry, Encoding};
///
/// let registry = EncoderRegistry::default();
///
/// assert_eq!(registry.negotiate("br, gzip, deflate"), Some(Encoding::Gzip));
/// assert_eq!(registry.negotiate("br, deflate"), None);
/// assert_eq!(EncoderRegistry::empty().negotiate("gzip"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderRegistry {
    encodings: Vec<Encoding>,
}

impl Default for EncoderRegistry {
    /// A registry with every built-in encoding.
    fn default() -> Self {
        Self::empty().with(Encoding::Gzip)
    }
}

impl EncoderRegistry {
    /// A registry that never encodes.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            encodings: Vec::new(),
        }
    }

    /// Registers `encoding`; registering twice has no effect.
    #[inline]
    pub fn with(mut self, encoding: Encoding) -> Self {
        if !self.encodings.contains(&encoding) {
            self.encodings.push(encoding);
        }
        self
    }

    #[inline]
    pub fn get<T: AsRef<[u8]>>(&self, token: T) -> Option<Encoding> {
        let token = token.as_ref();
        self.encodings
            .iter()
            .copied()
            .find(|encoding| encoding.token().as_bytes() == token)
    }

    /// Picks the first token of a `", "`-separated preference list that
    /// names a registered encoding.
    pub fn negotiate<V: AsRef<[u8]>>(&self, accept_encoding: V) -> Option<Encoding> {
        let value = accept_encoding.as_ref();

        let mut start = 0;
        for end in memmem::find_iter(value, b", ").chain([value.len()]) {
            if let Some(encoding) = self.get(&value[start..end]) {
                return Some(encoding);
            }
            start = end + 2;
        }
        None
    }

    /// Compresses the response body according to the request's
    /// `Accept-Encoding`.
    ///
    /// Responses without a body are left alone. If the encoder fails, the
    /// body is served as is and no `Content-Encoding` is added.
    pub fn apply(&self, request: &Request, response: &mut Response) {
        let Some(accept) = request.header("Accept-Encoding") else {
            return;
        };
        let Some(encoding) = self.negotiate(accept) else {
            return;
        };
        let Some(body) = response.body_mut() else {
            return;
        };

        match encoding.encode(body) {
            Ok(encoded) => {
                *body = encoded;
                response
                    .headers_mut()
                    .insert("Content-Encoding", encoding.token());
            }
            Err(err) => warn!(encoding = encoding.token(), "encoding failed: {err}"),
        }
    }
}
