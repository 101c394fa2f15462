//! Preview server implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use swatch_normalize::{
    EntryKind, NormalizationWarning, PatternNormalizer, SourceError, SourceNormalizer, SourceText,
};
use swatch_preview::{render_frame, FrameSizing, PreviewBuilder, PreviewConfig, TemplateEngine};

use crate::error::{ApiError, ServerError};
use crate::playground::{PlaygroundPage, FRAME_ID, PLACEHOLDER_SNIPPET};
use crate::reload::{reload_client_script, ReloadHub, ReloadMessage};
use crate::watcher::{FileWatcher, WatchEvent};

/// WebSocket endpoint for playground reloads.
pub const RELOAD_PATH: &str = "/__reload";

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Open the playground in a browser on start
    pub open: bool,

    /// Snippet file shown in the playground and reloaded on change
    pub watch: Option<PathBuf>,

    /// Preview document settings
    pub preview: PreviewConfig,

    /// Frame sizing applied by host pages
    pub sizing: FrameSizing,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            open: true,
            watch: None,
            preview: PreviewConfig::default(),
            sizing: FrameSizing::default(),
        }
    }
}

/// Shared server state.
///
/// Everything here is immutable after startup, so requests never contend.
pub struct AppState {
    normalizer: Box<dyn SourceNormalizer>,
    builder: PreviewBuilder,
    templates: TemplateEngine,
    sizing: FrameSizing,
    reload: ReloadHub,
    watched: Option<PathBuf>,
}

impl AppState {
    /// Create state with the pattern normalizer.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_normalizer(config, Box::new(PatternNormalizer::new()))
    }

    /// Create state around a specific normalizer.
    pub fn with_normalizer(config: &ServerConfig, normalizer: Box<dyn SourceNormalizer>) -> Self {
        Self {
            normalizer,
            builder: PreviewBuilder::new(config.preview.clone()),
            templates: TemplateEngine::new(),
            sizing: config.sizing,
            reload: ReloadHub::new(),
            watched: config.watch.clone(),
        }
    }

    pub fn reload(&self) -> &ReloadHub {
        &self.reload
    }
}

/// Build the router for the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/render", post(render_handler))
        .route("/api/normalize", post(normalize_handler))
        .route("/playground", get(playground_handler))
        .route(RELOAD_PATH, get(ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Preview server.
pub struct PreviewServer {
    config: ServerConfig,
}

impl PreviewServer {
    /// Create a new preview server.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Start the server and run until shutdown.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let state = Arc::new(AppState::new(&self.config));

        if let Some(path) = &self.config.watch {
            let (watcher, mut rx) =
                FileWatcher::new(path).map_err(|e| ServerError::WatchError(e.to_string()))?;
            tracing::info!("Watching {}", path.display());

            let hub = state.reload().clone();
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    handle_watch_event(&hub, event);
                }
                // Keep watcher alive
                drop(watcher);
            });
        }

        let app = router(state);

        tracing::info!("Starting preview server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}/playground", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Handle file watch events.
fn handle_watch_event(hub: &ReloadHub, event: WatchEvent) {
    match event {
        WatchEvent::Changed(path) => {
            tracing::info!("Snippet changed: {}", path.display());
            hub.send(ReloadMessage::Reload);
        }
        WatchEvent::Removed(path) => {
            tracing::warn!("Snippet removed: {}", path.display());
            hub.send(ReloadMessage::Failed {
                message: format!("{} was removed", display_name(&path)),
            });
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, starting shutdown");
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct RenderResponse {
    html: String,
}

#[derive(Debug, Serialize)]
struct NormalizeResponse {
    code: String,
    entry: EntryKind,
    original_name: Option<String>,
    warnings: Vec<NormalizationWarning>,
}

/// GET /health
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Pull the snippet out of a `{ "code": "..." }` body.
fn snippet_source(body: &Value) -> Result<SourceText, SourceError> {
    let code = body
        .get("code")
        .and_then(Value::as_str)
        .ok_or(SourceError::MissingField("code"))?;
    SourceText::new(code)
}

/// POST /api/render
async fn render_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RenderResponse>, ApiError> {
    let Json(body) = payload?;
    let source = snippet_source(&body)?;

    let normalized = state.normalizer.normalize(source.as_str());
    for warning in &normalized.warnings {
        tracing::debug!("Normalizer: {}", warning);
    }

    let document = state.builder.build(&normalized.unit)?;

    Ok(Json(RenderResponse {
        html: document.into_html(),
    }))
}

/// POST /api/normalize
async fn normalize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let Json(body) = payload?;
    let source = snippet_source(&body)?;

    let normalized = state.normalizer.normalize(source.as_str());

    Ok(Json(NormalizeResponse {
        code: normalized.unit.into_source(),
        entry: normalized.entry,
        original_name: normalized.original_name,
        warnings: normalized.warnings,
    }))
}

/// GET /playground
async fn playground_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    let (source, watching) = match &state.watched {
        Some(path) => {
            let source = match tokio::fs::read_to_string(path).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    String::new()
                }
            };
            (source, Some(display_name(path)))
        }
        None => (PLACEHOLDER_SNIPPET.to_string(), None),
    };

    let shown = SourceText::new(source.as_str())
        .map(|text| text.as_str().to_string())
        .unwrap_or_else(|_| PLACEHOLDER_SNIPPET.to_string());
    let normalized = state.normalizer.normalize(&shown);

    let document = state.builder.build(&normalized.unit)?;
    let frame = render_frame(
        &state.templates,
        FRAME_ID,
        &state.builder.config().title,
        &document,
        state.sizing,
    )?;

    let warnings: Vec<String> = normalized.warnings.iter().map(ToString::to_string).collect();
    let reload_script = state
        .watched
        .as_ref()
        .map(|_| reload_client_script(RELOAD_PATH));

    let page = PlaygroundPage {
        frame: &frame,
        source: &source,
        watching: watching.as_deref(),
        warnings: &warnings,
        reload_script: reload_script.as_deref(),
    };

    Ok(Html(page.render()))
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward reload messages to one client.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut rx = state.reload.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn creates_server_with_default_config() {
        let server = PreviewServer::new(ServerConfig::default());
        assert_eq!(server.config.port, 7777);
        assert_eq!(server.config.sizing, FrameSizing::default());
    }

    #[test]
    fn extracts_snippet_source() {
        let source = snippet_source(&json!({ "code": "<p>Hi</p>" })).unwrap();
        assert_eq!(source.as_str(), "<p>Hi</p>");

        assert_eq!(
            snippet_source(&json!({ "code": 42 })),
            Err(SourceError::MissingField("code"))
        );
        assert_eq!(
            snippet_source(&json!({})),
            Err(SourceError::MissingField("code"))
        );
        assert_eq!(snippet_source(&json!({ "code": "  " })), Err(SourceError::Empty));
    }

    #[test]
    fn watch_events_become_reload_messages() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();

        handle_watch_event(&hub, WatchEvent::Changed(PathBuf::from("/x/card.tsx")));
        handle_watch_event(&hub, WatchEvent::Removed(PathBuf::from("/x/card.tsx")));

        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
        assert_eq!(
            rx.try_recv().unwrap(),
            ReloadMessage::Failed {
                message: "card.tsx was removed".to_string()
            }
        );
    }
}
