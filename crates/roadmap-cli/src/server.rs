//! Editor server
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | editor page |
//! | `GET /roadmap?start=&material=&view=` | roadmap page rendered from the current file |
//! | `GET /api/data` | the document as JSON |
//! | `POST /api/data` | validate and replace the document |
//! | `GET /api/products/:id/timeline?start=&material=` | computed timeline layout |
//!
//! Saves are serialized by a lock so concurrent posts never interleave their
//! writes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use roadmap_core::{Document, DocumentError, EntityStore, FileStore};
use roadmap_layout::{resolve_start_date, LayoutConfig, TimelineLayoutEngine};
use roadmap_render::{editor_page, HtmlPageRenderer, ViewId};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Largest accepted `POST /api/data` body
pub const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    store: FileStore,
    layout: Arc<LayoutConfig>,
    title: Arc<str>,
    write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: FileStore, layout: LayoutConfig) -> Self {
        Self {
            store,
            layout: Arc::new(layout),
            title: Arc::from("Manufacturing Roadmap"),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Arc::from(title);
        self
    }

    async fn load(&self) -> Result<Document, DocumentError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| DocumentError::Io(std::io::Error::other(e)))?
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(editor))
        .route("/roadmap", get(roadmap_page))
        .route(
            "/api/data",
            get(get_data)
                .post(post_data)
                .layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
        .route("/api/products/:id/timeline", get(product_timeline))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, data = %state.store.path().display(), "editor server listening");
    axum::serve(listener, router(state)).await
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub start: Option<String>,
    pub material: Option<String>,
}

/// Page state carried across a start-date reload
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub start: Option<String>,
    pub material: Option<String>,
    pub view: Option<String>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn editor() -> Html<String> {
    Html(editor_page())
}

async fn roadmap_page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let doc = match state.load().await {
        Ok(doc) => doc,
        Err(err) => {
            error!(error = %err, "failed to read data file");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read data file");
        }
    };
    let start = resolve_start_date(query.start.as_deref(), today());
    let mut renderer = HtmlPageRenderer::new(start)
        .title(state.title.as_ref())
        .layout(state.layout.as_ref().clone())
        .live();
    if let Some(material) = query.material.filter(|m| !m.is_empty()) {
        renderer = renderer.material(material);
    }
    if let Some(view) = query.view.as_deref() {
        match view.parse::<ViewId>() {
            Ok(view) => renderer = renderer.initial_view(view),
            Err(err) => warn!(error = %err, "ignoring view parameter"),
        }
    }
    match renderer.render(&doc) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(error = %err, "failed to render roadmap page");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render roadmap")
        }
    }
}

async fn get_data(State(state): State<AppState>) -> Response {
    match state.load().await {
        Ok(doc) => Json(doc).into_response(),
        Err(err) => {
            error!(error = %err, "failed to read data file");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read data file")
        }
    }
}

async fn post_data(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let _guard = state.write_lock.lock().await;
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || store.save_value(body)).await;

    match result {
        Ok(Ok(warnings)) => Json(json!({
            "success": true,
            "message": "Data saved successfully",
            "warnings": warnings,
        }))
        .into_response(),
        Ok(Err(DocumentError::Invalid(diagnostics))) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid roadmap data",
                "diagnostics": diagnostics,
            })),
        )
            .into_response(),
        Ok(Err(DocumentError::Parse(err))) => {
            warn!(error = %err, "rejecting malformed roadmap data");
            error_response(StatusCode::BAD_REQUEST, &format!("Invalid roadmap data: {}", err))
        }
        Ok(Err(DocumentError::Io(err))) => {
            error!(error = %err, "failed to write data file");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to write data file")
        }
        Err(err) => {
            error!(error = %err, "save task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to write data file")
        }
    }
}

async fn product_timeline(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Response {
    let doc = match state.load().await {
        Ok(doc) => doc,
        Err(err) => {
            error!(error = %err, "failed to read data file");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read data file");
        }
    };
    let Some(product) = doc.find_product(&id) else {
        return error_response(StatusCode::NOT_FOUND, &format!("Unknown product {}", id));
    };
    let start = resolve_start_date(query.start.as_deref(), today());
    let engine = TimelineLayoutEngine::new(state.layout.as_ref().clone());
    let layout = engine.layout(&doc, product, start, query.material.as_deref());
    Json(layout).into_response()
}
