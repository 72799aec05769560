//! Local HTTP server for the web UI the launcher window loads.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use log::{error, info};
use rust_embed::RustEmbed;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(RustEmbed)]
#[folder = "web/"]
struct WebAssets;

/// Where the UI's files come from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// The assets compiled into the binary.
    Embedded,
    /// A directory on disk, e.g. a development checkout of the UI.
    Directory(PathBuf),
}

/// A running UI server. Dropping it leaves the server running until the runtime stops.
pub struct UiServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl UiServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The URL a window should load to show the UI.
    pub fn root_url(&self) -> String {
        format!("http://{}/", self.addr())
    }

    /// Stops accepting connections and waits for in-flight requests to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.task.await;
    }
}

/// Binds `addr` (port 0 picks a free port) and starts serving in the background.
pub async fn serve(addr: SocketAddr, source: AssetSource) -> io::Result<UiServer> {
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let app = router(source);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let shutdown = async {
            let _ = shutdown_rx.await;
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!("UI server on {} failed: {}", addr, e);
        }
        info!("UI server on {} stopped.", addr);
    });

    info!("UI server listening on {}", addr);
    Ok(UiServer {
        addr,
        shutdown_tx,
        task,
    })
}

fn router(source: AssetSource) -> Router {
    let router = match source {
        AssetSource::Embedded => Router::new().fallback(embedded_asset),
        AssetSource::Directory(dir) => {
            info!("Serving UI from {:?}", dir);
            Router::new().fallback_service(ServeDir::new(dir))
        }
    };
    router.layer(TraceLayer::new_for_http())
}

async fn embedded_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() || path.ends_with('/') {
        format!("{path}index.html")
    } else {
        path.to_owned()
    };

    match WebAssets::get(&path) {
        Some(file) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref().to_owned())], file.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("{path} not found")).into_response(),
    }
}
