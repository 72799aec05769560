use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use mos_ui_core::{show_ui, WebviewRuntime};

use crate::web::{self, AssetSource};

/// Where `serve` listens unless told otherwise.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:1992";

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "mos-ui", version, subcommand_required = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: UiCommand,
}

#[derive(Subcommand, Debug)]
pub enum UiCommand {
    /// Open a UI window on the given URL
    Open {
        /// Root URL the window loads
        url: String,
    },
    /// Serve the web UI locally and open a window on it
    Serve {
        /// Address the UI server listens on
        #[arg(long, default_value = DEFAULT_HTTP_ADDR)]
        http_addr: SocketAddr,
        /// Serve the UI from this directory instead of the built-in assets
        #[arg(long)]
        web_root: Option<PathBuf>,
        /// Only serve; do not open a window
        #[arg(long)]
        headless: bool,
    },
}

pub async fn run_cli(args: Args) -> anyhow::Result<()> {
    match args.command {
        UiCommand::Open { url } => open_window(url).await,
        UiCommand::Serve {
            http_addr,
            web_root,
            headless,
        } => {
            let source = match web_root {
                Some(dir) => AssetSource::Directory(dir),
                None => AssetSource::Embedded,
            };
            serve(http_addr, source, headless).await
        }
    }
}

/// Runs the blocking launcher off the async workers so the UI server keeps serving.
async fn open_window(url: String) -> anyhow::Result<()> {
    info!("Opening UI window on {}", url);
    tokio::task::spawn_blocking(move || show_ui(&WebviewRuntime::new(), &url))
        .await
        .context("UI launcher task failed")?;
    Ok(())
}

async fn serve(http_addr: SocketAddr, source: AssetSource, headless: bool) -> anyhow::Result<()> {
    let server = web::serve(http_addr, source)
        .await
        .with_context(|| format!("Failed to start the UI server on {}", http_addr))?;
    let url = server.root_url();

    if headless {
        info!("Serving web UI at {}. Press Ctrl+C to stop.", url);
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
    } else {
        open_window(url).await?;
    }

    server.shutdown().await;
    Ok(())
}
