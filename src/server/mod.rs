//! Blog server: index with "load more", post pages, and the load-more API

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::BlogError;
use crate::feed::{PaginationFetcher, SessionRegistry};
use crate::pages::{self, PostView, SummaryView};
use crate::source::ContentSource;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Server state
pub struct ServerState {
    blog: Blog,
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
    sessions: SessionRegistry,
}

impl ServerState {
    pub fn new(blog: Blog, source: Arc<dyn ContentSource>) -> crate::error::Result<Self> {
        let sessions = SessionRegistry::new(blog.config.max_sessions);
        Ok(Self {
            blog,
            source,
            renderer: TemplateRenderer::new()?,
            sessions,
        })
    }
}

/// Build the router over a prepared state
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/sessions/:id/more", post(load_more_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let source = blog.source()?;
    let state = Arc::new(ServerState::new(blog.clone(), source)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Maps library errors onto HTTP responses
#[derive(Debug)]
struct AppError(BlogError);

impl From<BlogError> for AppError {
    fn from(err: BlogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BlogError::NotResolved { .. } | BlogError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            BlogError::LoadInProgress => StatusCode::CONFLICT,
            BlogError::NoMorePages => StatusCode::GONE,
            BlogError::Fetch(_) | BlogError::Parse(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, self.0.to_string()).into_response()
    }
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Result<Html<String>, AppError> {
    let config = &state.blog.config;
    let list = pages::load_index(state.source.as_ref(), config).await?;
    let has_more = list.has_more();
    let posts = SummaryView::list(&list.items, config, state.blog.date_settings);
    let session_id = state.sessions.create(list);

    let html = state
        .renderer
        .render_index(config, &posts, session_id, has_more)?;
    Ok(Html(html))
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let config = &state.blog.config;
    match pages::resolve_post(state.source.as_ref(), &config.document_type, &slug).await {
        Ok(resolved) => {
            let view = PostView::build(&resolved, config, state.blog.date_settings);
            let html = state.renderer.render_post(config, &view)?;
            Ok(Html(html).into_response())
        }
        Err(BlogError::NotResolved { slug }) => {
            tracing::warn!("Post not resolved: {}", slug);
            let html = state.renderer.render_loading(config)?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Serialize)]
struct LoadMoreResponse {
    html: String,
    appended: usize,
    has_more: bool,
}

async fn load_more_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadMoreResponse>, AppError> {
    let cursor = state.sessions.begin_load(id)?;

    // The fetch runs in its own task so a dropped request still clears the
    // session's in-flight flag
    let task_state = state.clone();
    let outcome = tokio::spawn(async move {
        let fetcher = PaginationFetcher::new(
            task_state.source.as_ref(),
            &task_state.blog.config.feed_date_format,
            task_state.blog.date_settings,
        );
        let result = fetcher.fetch_page(Some(&cursor)).await;
        task_state.sessions.finish_load(id, result)
    })
    .await
    .map_err(|e| BlogError::Fetch(format!("load task failed: {}", e)))??;

    let config = &state.blog.config;
    let posts = SummaryView::list(&outcome.appended, config, state.blog.date_settings);
    let html = state.renderer.render_summaries(config, &posts)?;

    Ok(Json(LoadMoreResponse {
        html,
        appended: outcome.appended.len(),
        has_more: outcome.has_more,
    }))
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
