use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use anyhow::Context;
use lib_feedview::MemorySurface;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub fn router(surface: MemorySurface) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/health", get(health_handler))
        .with_state(surface)
}

/// Binds the viewer port. Done before any task is spawned so a taken port fails startup.
pub async fn bind(port: u16) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind viewer on {}", addr))?;
    Ok(listener)
}

/// Serves the rendered table until `shutdown` is cancelled.
pub async fn run(listener: TcpListener, surface: MemorySurface, shutdown: CancellationToken) -> anyhow::Result<()> {
    log::info!("Viewer listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(surface))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("Viewer shutting down.");
        })
        .await?;
    Ok(())
}

async fn page_handler(State(surface): State<MemorySurface>) -> impl IntoResponse {
    let page = surface.current().await;
    if page.is_empty() {
        // Nothing rendered yet: the feed has not been subscribed.
        return (StatusCode::SERVICE_UNAVAILABLE, Html("<p>Waiting for the feed subscription...</p>".to_string()));
    }
    (StatusCode::OK, Html(page))
}

async fn health_handler(State(surface): State<MemorySurface>) -> impl IntoResponse {
    (StatusCode::OK, format!("OK renders={}", surface.render_count()))
}
