//! mini_web - a small HTTP/1.1 server with a hand-written parser
//!
//! Reads one request per connection straight off the socket, routes it,
//! optionally gzips the body and writes the response back before closing.
//!
//! # Routes
//!
//! - `/` - empty `200 OK`
//! - `/echo/{text}` - echoes `{text}` as `text/plain`
//! - `/user-agent` - echoes the `User-Agent` header
//! - `/files/{name}` - `GET` reads and `POST` writes a file in the serving directory
//!
//! See [`FileRouter`] for the details.
//!
//! # Protocol Support
//!
//! Only the subset of HTTP/1.1 the routes need: `Content-Length` bodies,
//! no chunked encoding, no keep-alive. Responses to clients that send
//! `Accept-Encoding: gzip` are compressed (see [`EncoderRegistry`]).
//!
//! # Examples
//!
//! ```no_run
//! use mini_web::{FileRouter, Server};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:4221").await.unwrap())
//!         .handler(FileRouter::new("/tmp/data"))
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```

pub(crate) mod http {
    pub(crate) mod encoding;
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod server_impl;
}
pub(crate) mod errors;
pub mod limits;
pub(crate) mod router;

pub use crate::{
    http::{
        encoding::{EncoderRegistry, Encoding},
        request::Request,
        response::Response,
        types::{HeaderMap, Method, StatusCode},
    },
    router::{FileRouter, Handler},
    server::server_impl::{Server, ServerBuilder},
};

#[cfg(test)]
pub mod tools {
    use crate::{http::request::Parser, limits::ReqLimits, Request};
    use std::str::from_utf8;

    #[inline]
    pub fn str_op(value: &[u8]) -> &str {
        from_utf8(value).unwrap()
    }

    /// Parses a complete, well-formed request.
    pub async fn request<V: AsRef<[u8]>>(raw: V) -> Request {
        let mut raw = raw.as_ref();
        Parser::new(&ReqLimits::default())
            .parse(&mut raw)
            .await
            .unwrap()
            .unwrap()
    }
}
