use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    classifier::{CacheStats, ClassificationService, LexicalMatcher},
    domain::{Comment, SortOrder, ToxicitySummary, Verdict},
    model::{ClassificationBridge, protocol::ClassifyRequest},
};

use super::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassificationService>,
    pub bridge: Arc<ClassificationBridge>,
    pub matcher: Arc<LexicalMatcher>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub comment_id: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub comment_id: String,
    pub cancelled: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnnotateRequest {
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub sort_by: SortOrder,
}

#[derive(Debug, Serialize)]
pub struct AnnotateResponse {
    pub comments: Vec<Comment>,
    pub summary: ToxicitySummary,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: &'static str,
    pub authority: &'static str,
    pub lexicon_entries: usize,
    pub pending: usize,
    pub cache: CacheStats,
}

fn required_content(request: ClassifyRequest) -> Result<String, AppError> {
    request
        .content
        .filter(|content| !content.is_empty())
        .ok_or(AppError::MissingContent)
}

/// Authoritative endpoint served by the bridge.
pub async fn classify_comment_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<Verdict>, AppError> {
    let content = required_content(request)?;
    let bridge = state.bridge.clone();
    let verdict = tokio::spawn(async move { bridge.classify(&content).await })
        .await
        .map_err(|err| {
            tracing::error!(target: "http", error = %err, "classification task failed");
            AppError::Internal(err.to_string())
        })?;
    Ok(Json(verdict))
}

pub async fn classify_immediate_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Json<Verdict> {
    let content = request.content.unwrap_or_default();
    Json(state.service.classify_immediate(&content))
}

pub async fn submit_comment_handler(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let content = required_content(request)?;
    let (verdict, _pending) = state.service.submit(&comment_id, content);
    tracing::debug!(
        target: "http",
        comment_id = %comment_id,
        is_toxic = verdict.is_toxic(),
        "comment submitted"
    );
    Ok(Json(SubmitResponse {
        comment_id,
        verdict,
    }))
}

pub async fn forget_comment_handler(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Json<CancelResponse> {
    let cancelled = state.service.forget(&comment_id);
    Json(CancelResponse {
        comment_id,
        cancelled,
    })
}

pub async fn annotate_handler(
    State(state): State<AppState>,
    Json(request): Json<AnnotateRequest>,
) -> Json<AnnotateResponse> {
    let (comments, summary) = state.service.annotate(request.comments, request.sort_by);
    Json(AnnotateResponse { comments, summary })
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.bridge.backend().kind(),
        authority: state.service.authority_name(),
        lexicon_entries: state.matcher.lexicon().len(),
        pending: state.service.pending().len(),
        cache: state.service.cache().stats(),
    })
}
