mod error;
mod routes;

use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::infrastructure::shutdown::ShutdownListener;

pub use routes::AppState;
use routes::{
    annotate_handler, classify_comment_handler, classify_immediate_handler,
    forget_comment_handler, health_handler, submit_comment_handler,
};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/classify/comment", post(classify_comment_handler))
        .route("/api/classify/immediate", post(classify_immediate_handler))
        .route(
            "/api/comments/{id}/classification",
            post(submit_comment_handler).delete(forget_comment_handler),
        )
        .route("/api/comments/annotate", post(annotate_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(
    listener: TcpListener,
    state: AppState,
    mut shutdown: ShutdownListener,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(target: "http", %addr, "classification server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await
        .context("http server failed")?;
    tracing::info!(target: "http", "classification server stopped");
    Ok(())
}
