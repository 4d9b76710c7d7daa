use crate::{
    http::encoding::EncoderRegistry,
    limits::{ConnLimits, ReqLimits},
    router::Handler,
    server::connection::{HttpConnection, Shared},
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// An HTTP server that serves one request per accepted connection.
///
/// Every connection runs in its own task; a slow or failing client never
/// holds up the accept loop or other connections.
///
/// # Examples
///
/// ```no_run
/// use mini_web::{FileRouter, Server};
/// use tokio::net::TcpListener;
///
/// #[tokio::main]
/// async fn main() {
///     Server::builder()
///         .listener(TcpListener::bind("127.0.0.1:4221").await.unwrap())
///         .handler(FileRouter::new("/tmp"))
///         .build()
///         .launch()
///         .await
/// }
/// ```
pub struct Server<H: Handler> {
    listener: TcpListener,
    shared: Arc<Shared<H>>,
}

impl<H: Handler> Server<H> {
    /// Creates a new builder for configuring the server instance.
    #[inline]
    pub fn builder() -> ServerBuilder<H> {
        ServerBuilder {
            listener: None,
            handler: None,
            encoders: None,
            connection_limits: None,
            request_limits: None,
        }
    }

    /// Address the listener is bound to.
    #[inline]
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts accepting connections. Never returns.
    pub async fn launch(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "listening");
        }

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(value) => value,
                Err(err) => {
                    warn!("accept failed: {err}");
                    continue;
                }
            };

            debug!(%peer, "client connected");
            let conn = HttpConnection::new(Arc::clone(&self.shared));

            tokio::spawn(async move {
                if let Err(err) = conn.run(stream).await {
                    debug!(%peer, "connection closed with error: {err}");
                }
            });
        }
    }
}

//

/// Builder for configuring and creating [`Server`] instances.
pub struct ServerBuilder<H: Handler> {
    listener: Option<TcpListener>,
    handler: Option<H>,
    encoders: Option<EncoderRegistry>,
    connection_limits: Option<ConnLimits>,
    request_limits: Option<ReqLimits>,
}

impl<H: Handler> ServerBuilder<H> {
    /// Sets the TCP listener that the server will use to accept connections.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Sets the request handler, usually a [`FileRouter`](crate::FileRouter).
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the content encodings the server may apply.
    ///
    /// Default: [`EncoderRegistry::default()`] (gzip).
    #[inline(always)]
    pub fn encoders(mut self, encoders: EncoderRegistry) -> Self {
        self.encoders = Some(encoders);
        self
    }

    /// Configures per-connection timeouts.
    #[inline(always)]
    pub fn connection_limits(mut self, limits: ConnLimits) -> Self {
        self.connection_limits = Some(limits);
        self
    }

    /// Configures request parsing limits.
    #[inline(always)]
    pub fn request_limits(mut self, limits: ReqLimits) -> Self {
        self.request_limits = Some(limits);
        self
    }

    /// Finalizes the builder and constructs a [`Server`] instance.
    ///
    /// # Panics
    ///
    /// Panics when `listener` or `handler` was not called.
    #[inline]
    #[track_caller]
    pub fn build(self) -> Server<H> {
        Server {
            listener: self
                .listener
                .expect("The `listener` method must be called to create"),
            shared: Arc::new(Shared {
                handler: self
                    .handler
                    .expect("The `handler` method must be called to create"),
                encoders: self.encoders.unwrap_or_default(),
                conn_limits: self.connection_limits.unwrap_or_default(),
                req_limits: self.request_limits.unwrap_or_default(),
            }),
        }
    }
}
