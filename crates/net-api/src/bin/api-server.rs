//! Network service daemon
//!
//! Serves the HTTP/JSON network API on a unix socket (default) or TCP.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use log::{info, warn};
use tokio::net::{TcpListener, UnixListener};

use edge_network_api::{context::AppContext, NetworkAPI};
use edge_network_config::{ListenAddress, ServiceConfig};

const SOCKET_MODE: u32 = 0o660;

#[derive(Parser)]
#[command(name = "api-server")]
#[command(about = "Edge device ethernet settings service")]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address override (`unix:///path` or `tcp://host:port`)
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let listen = config.listen_address()?;
    let context = AppContext::bootstrap(config.clone()).await?;
    let app = NetworkAPI::router().with_state(context);

    match listen {
        ListenAddress::Unix(path) => serve_unix(app, &path, config.socket_group).await,
        ListenAddress::Tcp(addr) => {
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to listen on {}", addr))?;
            info!("Started listening on tcp - {}", addr);
            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}

async fn serve_unix(app: Router, path: &Path, group: Option<u32>) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => warn!("Removed stale socket {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Socket {} could not be removed", path.display()))
        }
    }

    let listener = UnixListener::bind(path)
        .with_context(|| format!("Failed to listen on {}", path.display()))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(SOCKET_MODE))
        .context("File permissions failed")?;
    if let Some(gid) = group {
        std::os::unix::fs::chown(path, Some(0), Some(gid)).context("File permissions failed")?;
        info!("Socket owner set to 0:{}", gid);
    }

    info!("Started listening on unix - {}", path.display());
    axum::serve(listener, app).await?;
    Ok(())
}
