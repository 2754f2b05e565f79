//! HTTP API server.
//!
//! Exposes the load / summary / ask actions over REST. Every client gets an
//! independent session with its own state; actions within one session are
//! serialized by a per-session lock, so a reload never races a question.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::{Result, SvarError};
use crate::session::Session;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    settings: Settings,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> Result<()> {
    let state = Arc::new(AppState {
        settings,
        sessions: RwLock::new(HashMap::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/load", post(load_video))
        .route("/sessions/{id}/summary", get(get_summary))
        .route("/sessions/{id}/ask", post(ask))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("New session (loads a video)", "POST   /sessions");
    Output::kv("Load another video", "POST   /sessions/:id/load");
    Output::kv("Summary", "GET    /sessions/:id/summary");
    Output::kv("Ask", "POST   /sessions/:id/ask");
    Output::kv("Drop session", "DELETE /sessions/:id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct LoadRequest {
    /// YouTube URL or 11-character video ID
    input: String,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: Uuid,
    video_id: String,
    title: String,
    chunks_indexed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

#[derive(Serialize)]
struct LoadResponse {
    video_id: String,
    title: String,
    chunks_indexed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

#[derive(Serialize)]
struct SummaryResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    timestamp: String,
    start_seconds: f64,
    score: f32,
    content: String,
    url: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map pipeline errors to HTTP statuses.
fn error_status(e: &SvarError) -> StatusCode {
    match e {
        SvarError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SvarError::TranscriptUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_json(e: &SvarError) -> (StatusCode, Json<ErrorResponse>) {
    (
        error_status(e),
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

async fn lookup_session(
    state: &AppState,
    id: Uuid,
) -> Option<Arc<Mutex<Session>>> {
    state.sessions.read().await.get(&id).cloned()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoadRequest>,
) -> impl IntoResponse {
    let mut session = match Session::new(state.settings.clone()) {
        Ok(session) => session,
        Err(e) => return error_json(&e).into_response(),
    };

    let result = match session.load_video(&req.input).await {
        Ok(result) => result,
        Err(e) => return error_json(&e).into_response(),
    };

    let summary = session.summary().map(|s| s.to_string());

    let session_id = Uuid::new_v4();
    state
        .sessions
        .write()
        .await
        .insert(session_id, Arc::new(Mutex::new(session)));

    Json(SessionResponse {
        session_id,
        video_id: result.video_id,
        title: result.title,
        chunks_indexed: result.chunks_indexed,
        summary,
    })
    .into_response()
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if state.sessions.write().await.remove(&id).is_some() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found(id).into_response()
    }
}

async fn load_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<LoadRequest>,
) -> impl IntoResponse {
    let Some(session) = lookup_session(&state, id).await else {
        return session_not_found(id).into_response();
    };

    let mut session = session.lock().await;

    match session.load_video(&req.input).await {
        Ok(result) => Json(LoadResponse {
            video_id: result.video_id,
            title: result.title,
            chunks_indexed: result.chunks_indexed,
            summary: session.summary().map(|s| s.to_string()),
        })
        .into_response(),
        Err(e) => error_json(&e).into_response(),
    }
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(session) = lookup_session(&state, id).await else {
        return session_not_found(id).into_response();
    };

    let session = session.lock().await;

    match session.summary() {
        Some(summary) => Json(SummaryResponse {
            status: "ok",
            summary: Some(summary.to_string()),
        })
        .into_response(),
        None => Json(SummaryResponse {
            status: "no_content",
            summary: None,
        })
        .into_response(),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let Some(session) = lookup_session(&state, id).await else {
        return session_not_found(id).into_response();
    };

    let session = session.lock().await;

    match session.ask(&req.question).await {
        Ok(response) => Json(AskResponse {
            status: "ok",
            answer: Some(response.answer),
            sources: response
                .sources
                .into_iter()
                .map(|s| SourceInfo {
                    timestamp: s.timestamp,
                    start_seconds: s.start_seconds,
                    score: s.score,
                    content: s.content,
                    url: s.url,
                })
                .collect(),
        })
        .into_response(),
        Err(SvarError::EmptyContent) => Json(AskResponse {
            status: "no_content",
            answer: None,
            sources: Vec::new(),
        })
        .into_response(),
        Err(e) => error_json(&e).into_response(),
    }
}

fn session_not_found(id: Uuid) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Unknown session: {}", id),
        }),
    )
}
