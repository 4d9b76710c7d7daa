use clap::Parser;
use mini_web::{FileRouter, Server};
use socket2::{Domain, Socket, Type};
use std::{
    error::Error,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Serves `/`, `/echo/`, `/user-agent` and `/files/` over HTTP/1.1.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory that `/files/{name}` reads from and writes to
    #[arg(long, default_value = ".")]
    directory: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = 4221)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "mini_web=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if !args.directory.is_dir() {
        return Err(format!("{} is not a directory", args.directory.display()).into());
    }

    let listener = bind(SocketAddr::new(args.host, args.port))?;
    let router = FileRouter::new(args.directory);
    tracing::info!(directory = %router.directory().display(), "serving files");

    Server::builder()
        .listener(listener)
        .handler(router)
        .build()
        .launch()
        .await;

    Ok(())
}

// Listening socket with `SO_REUSEADDR`, handed over to tokio.
fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;

    TcpListener::from_std(socket.into())
}
