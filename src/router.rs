use crate::http::{
    request::Request,
    response::Response,
    types::{Method, StatusCode},
};
use std::{future::Future, path::PathBuf};
use tracing::debug;

/// A trait for turning a parsed request into a response.
///
/// One handler instance is shared by every connection, so `&self` must
/// only hold read-only data (configuration, lookup tables).
///
/// # Examples
///
/// ```
/// use mini_web::{Handler, Request, Response, StatusCode};
///
/// struct Hello;
///
/// impl Handler for Hello {
///     async fn handle(&self, req: &Request) -> Response {
///         let mut resp = Response::new(StatusCode::Ok);
///         if req.path() == b"/hello" {
///             resp.header("Content-Type", "text/plain").body("Hello!");
///         }
///         resp
///     }
/// }
/// ```
pub trait Handler
where
    Self: Sync + Send + 'static,
{
    /// Produces the response for `request`.
    ///
    /// Failures are expressed as status codes; there is no error path.
    fn handle(&self, request: &Request) -> impl Future<Output = Response> + Send;
}

/// The server's routes.
///
/// Evaluated in order, first match wins:
///
/// | Route           | Method     | Response                                         |
/// |-----------------|------------|--------------------------------------------------|
/// | `/`             | any        | `200`, no body                                   |
/// | `/echo/{text}`  | any        | `200`, `text/plain`, body `{text}` (raw bytes)   |
/// | `/user-agent`   | any        | `200`, `text/plain`, body of `User-Agent`        |
/// | `/files/{name}` | `POST`     | writes the body to `{name}`, `201` or `404`      |
/// | `/files/{name}` | other      | `200` `application/octet-stream` or `404`        |
/// | anything else   | any        | `404`, no body                                   |
///
/// File names are joined to the serving directory as given; a name that
/// is not valid UTF-8 is answered with `404`. They are **not** sanitized: `..` segments and absolute names escape the
/// directory. Do not expose this router to untrusted networks.
#[derive(Debug, Clone)]
pub struct FileRouter {
    directory: PathBuf,
}

impl FileRouter {
    const ECHO: &'static [u8] = b"/echo/";
    const FILES: &'static [u8] = b"/files/";

    /// Creates a router serving `/files/` out of `directory`.
    #[inline]
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The serving directory.
    #[inline]
    pub fn directory(&self) -> &std::path::Path {
        &self.directory
    }

    async fn write_file(&self, name: &str, body: &[u8]) -> Response {
        let path = self.directory.join(name);

        match tokio::fs::write(&path, body).await {
            Ok(()) => {
                debug!(path = %path.display(), bytes = body.len(), "file written");
                Response::new(StatusCode::Created)
            }
            Err(err) => {
                debug!(path = %path.display(), "cannot write file: {err}");
                Response::new(StatusCode::NotFound)
            }
        }
    }

    async fn read_file(&self, name: &str) -> Response {
        let path = self.directory.join(name);

        match tokio::fs::read(&path).await {
            Ok(content) => {
                let mut resp = Response::new(StatusCode::Ok);
                resp.header("Content-Type", "application/octet-stream")
                    .body(content);
                resp
            }
            Err(err) => {
                debug!(path = %path.display(), "cannot read file: {err}");
                Response::new(StatusCode::NotFound)
            }
        }
    }

    #[inline]
    fn file_name(name: &[u8]) -> Option<&str> {
        simdutf8::basic::from_utf8(name).ok()
    }

    #[inline]
    fn text(body: &[u8]) -> Response {
        let mut resp = Response::new(StatusCode::Ok);
        resp.header("Content-Type", "text/plain").body(body);
        resp
    }
}

impl Handler for FileRouter {
    async fn handle(&self, req: &Request) -> Response {
        let path = req.path();

        if path == b"/" {
            debug!("route: root");
            return Response::new(StatusCode::Ok);
        }

        if let Some(text) = path.strip_prefix(Self::ECHO) {
            debug!(bytes = text.len(), "route: echo");
            return Self::text(text);
        }

        if path == b"/user-agent" {
            debug!("route: user-agent");
            return Self::text(req.user_agent());
        }

        if let Some(name) = path.strip_prefix(Self::FILES) {
            let Some(name) = Self::file_name(name) else {
                debug!("route: files, name is not valid UTF-8");
                return Response::new(StatusCode::NotFound);
            };

            debug!(method = ?req.method(), name, "route: files");
            return match req.method() {
                Method::Post => self.write_file(name, req.body().unwrap_or_default()).await,
                Method::Get | Method::Unknown => self.read_file(name).await,
            };
        }

        debug!("route: not found");
        Response::new(StatusCode::NotFound)
    }
}
