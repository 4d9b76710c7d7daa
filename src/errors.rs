use std::io;

/// Failures that end a single connection.
///
/// Everything except [`ErrorKind::Io`] is answered with a canned
/// `400 Bad Request` before the connection is closed. I/O failures
/// (peer hang-up, short body, timeouts) close the connection silently.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("malformed request line")]
    InvalidRequestLine,
    #[error("malformed header line")]
    InvalidHeader,

    #[error("line exceeds the configured limit")]
    LineTooLong,
    #[error("too many headers")]
    TooManyHeaders,
    #[error("declared body of {0} bytes exceeds the configured limit")]
    BodyTooLarge(usize),

    #[error("i/o: {0}")]
    Io(IoError),
}

macro_rules! http_errors {
    ($($name:ident: $status_code:literal;)*) => {
        /// Canned response bytes for a protocol error, or `None` when
        /// the connection should be dropped without answering.
        pub(crate) const fn as_http(&self) -> Option<&'static [u8]> {
            match self {
                $(
                    Self::$name { .. } => Some(concat!(
                        "HTTP/1.1 ", $status_code, "\r\n",
                        "connection: close\r\n",
                        "content-length: 0\r\n\r\n",
                    ).as_bytes()),
                )*
                Self::Io(_) => None,
            }
        }
    };
}

impl ErrorKind {
    http_errors! {
        InvalidRequestLine: "400 Bad Request";
        InvalidHeader: "400 Bad Request";
        LineTooLong: "400 Bad Request";
        TooManyHeaders: "400 Bad Request";
        BodyTooLarge: "400 Bad Request";
    }

    #[inline]
    pub(crate) fn unexpected_eof() -> Self {
        ErrorKind::Io(IoError(io::ErrorKind::UnexpectedEof.into()))
    }
}

impl From<io::Error> for ErrorKind {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io(IoError(err))
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct IoError(pub(crate) io::Error);

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_responses() {
        #[rustfmt::skip]
        let cases = [
            (ErrorKind::InvalidRequestLine, true),
            (ErrorKind::InvalidHeader,      true),
            (ErrorKind::LineTooLong,        true),
            (ErrorKind::TooManyHeaders,     true),
            (ErrorKind::BodyTooLarge(9),    true),
            (ErrorKind::unexpected_eof(),   false),
        ];

        for (error, answered) in cases {
            match error.as_http() {
                Some(bytes) => {
                    assert!(answered, "{error:?} must not be answered");
                    assert_eq!(
                        bytes,
                        b"HTTP/1.1 400 Bad Request\r\nconnection: close\r\ncontent-length: 0\r\n\r\n"
                    );
                }
                None => assert!(!answered, "{error:?} must be answered"),
            }
        }
    }

    #[test]
    fn io_errors_compare_by_kind() {
        let a = ErrorKind::from(io::Error::new(io::ErrorKind::UnexpectedEof, "a"));
        let b = ErrorKind::unexpected_eof();
        assert_eq!(a, b);
        assert_ne!(a, ErrorKind::from(io::Error::from(io::ErrorKind::TimedOut)));
    }
}
