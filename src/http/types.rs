//! Core HTTP protocol types and utilities

#[inline(always)]
pub(crate) fn slice_to_usize(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }

    let mut result: usize = 0;

    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return None;
        }

        result = result
            .checked_mul(10)?
            .checked_add((byte - b'0') as usize)?;
    }

    Some(result)
}

/// Strips leading and trailing spaces and tabs.
#[inline]
pub(crate) fn trim_ows(mut bytes: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = bytes {
        bytes = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = bytes {
        bytes = rest;
    }
    bytes
}

// METHOD

/// HTTP request methods understood by the router.
///
/// Any other token is kept as [`Method::Unknown`] rather than rejected;
/// routing decides what to do with it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method - transfer a current representation of the target resource
    /// [[RFC7231, Section 4.3.1](https://tools.ietf.org/html/rfc7231#section-4.3.1)]
    Get,
    /// POST method - perform resource-specific processing on the request payload
    /// [[RFC7231, Section 4.3.3](https://tools.ietf.org/html/rfc7231#section-4.3.3)]
    Post,
    /// Anything else (`PUT`, `get`, `BREW`, ...)
    Unknown,
}

impl Method {
    #[inline(always)]
    pub(crate) fn from_bytes(src: &[u8]) -> Self {
        match src {
            b"GET" => Method::Get,
            b"POST" => Method::Post,
            _ => Method::Unknown,
        }
    }
}

// STATUS_CODE

macro_rules! set_status_codes {
    ($(
        $(#[$docs:meta])+
        $name:ident = ($num:expr, $str:expr);
    )+) => {
        /// HTTP status codes produced by the server
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusCode { $(
            #[doc = concat!(stringify!($num), " ", $str)]
            $(#[$docs])+
            $name = $num,
        )+ }

        impl StatusCode {
            /// Returns the HTTP status line as bytes (e.g., `b"HTTP/1.1 200 OK\r\n"`).
            #[inline]
            pub(crate) const fn to_first_line(self) -> &'static [u8] {
                match self { $(
                    StatusCode::$name => concat!("HTTP/1.1 ", $num, " ", $str, "\r\n").as_bytes(),
                )+ }
            }

            /// Returns the reason phrase (e.g., `"Not Found"`).
            #[inline]
            pub const fn reason(self) -> &'static str {
                match self { $(
                    StatusCode::$name => $str,
                )+ }
            }

            #[inline]
            pub const fn as_u16(self) -> u16 {
                self as u16
            }
        }
    }
}

set_status_codes! {
    /// [[RFC9110, Section 15.3.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.1)]
    Ok = (200, "OK");
    /// [[RFC9110, Section 15.3.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.2)]
    Created = (201, "Created");
    /// [[RFC9110, Section 15.5.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.1)]
    BadRequest = (400, "Bad Request");
    /// [[RFC9110, Section 15.5.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.5)]
    NotFound = (404, "Not Found");
}

// HEADER MAP

/// Ordered header container with ASCII case-insensitive names.
///
/// Names and values are raw bytes: a request header carrying non-ASCII
/// octets (`obs-text`) is kept and echoed exactly as received.
///
/// Entries keep the casing of the first insertion and serialize in
/// insertion order. [`set`](Self::set) never replaces an existing value:
/// the first write wins, so duplicate request headers keep their first
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderMap {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl HeaderMap {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the header unless a header with the same name is already
    /// present. Returns `true` if the entry was added.
    pub fn set<N: Into<Vec<u8>>, V: Into<Vec<u8>>>(&mut self, name: N, value: V) -> bool {
        let name = name.into();
        if self.position(&name).is_some() {
            return false;
        }

        self.entries.push((name, value.into()));
        true
    }

    /// Inserts the header, replacing the value of an existing entry in place.
    pub(crate) fn insert<N: Into<Vec<u8>>, V: Into<Vec<u8>>>(&mut self, name: N, value: V) {
        let name = name.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1 = value.into(),
            None => self.entries.push((name, value.into())),
        }
    }

    /// Returns the value of the header, matching the name case-insensitively
    /// (per [RFC 7230](https://tools.ietf.org/html/rfc7230#section-3.2)).
    #[inline]
    pub fn get<N: AsRef<[u8]>>(&self, name: N) -> Option<&[u8]> {
        self.position(name.as_ref())
            .map(|i| self.entries[i].1.as_slice())
    }

    #[inline]
    pub fn contains<N: AsRef<[u8]>>(&self, name: N) -> bool {
        self.position(name.as_ref()).is_some()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries
            .iter()
            .map(|(n, v)| (n.as_slice(), v.as_slice()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    fn position(&self, name: &[u8]) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}
