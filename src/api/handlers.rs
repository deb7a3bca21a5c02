//! REST API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};

use super::types::{
    ErrorResponse, HealthResponse, InputRequest, OutputQuery, OutputResponse, RawQuery,
    RawResponse, ResizeRequest, StatusResponse, SuccessResponse,
};
use crate::error::ShellMirrorError;
use crate::host::{checked_size, InputForwarder, ShellWindow};
use crate::terminal::{SnapshotRequest, TerminalHandle, DEFAULT_SNAPSHOT_LINES};

/// Error half of every handler's result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared application state.
#[derive(Clone, Default)]
pub struct AppState {
    pub terminal: TerminalHandle,
    pub input: InputForwarder,
    pub window: ShellWindow,
}

impl AppState {
    pub fn new(terminal: TerminalHandle, input: InputForwarder) -> Self {
        Self {
            terminal,
            input,
            window: ShellWindow::default(),
        }
    }

    pub fn with_window(mut self, window: ShellWindow) -> Self {
        self.window = window;
        self
    }
}

fn api_error(err: ShellMirrorError) -> ApiError {
    match err {
        ShellMirrorError::ShellUnavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::shell_unavailable()),
        ),
        ShellMirrorError::InvalidControl(value) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::invalid_control(&value)),
        ),
        ShellMirrorError::InvalidSize(details) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::invalid_size(details)),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error(other.to_string())),
        ),
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Snapshot of the reconstructed screen.
pub async fn get_output(
    State(state): State<AppState>,
    Query(query): Query<OutputQuery>,
) -> Result<Json<OutputResponse>, ApiError> {
    let request = query.to_request();
    let (lines, cursor) = state
        .terminal
        .snapshot_with_cursor(&request)
        .map_err(api_error)?;
    Ok(Json(OutputResponse::new(lines, cursor)))
}

/// Most recent raw chunks, escape sequences intact.
pub async fn get_raw(
    State(state): State<AppState>,
    Query(query): Query<RawQuery>,
) -> Result<Json<RawResponse>, ApiError> {
    // same defaulting rules as the screen snapshot
    let count = query
        .lines
        .as_deref()
        .map(|lines| SnapshotRequest::from_query(Some(lines), None, None).count)
        .unwrap_or(DEFAULT_SNAPSHOT_LINES);
    let chunks = state.terminal.raw_tail(count).map_err(api_error)?;
    Ok(Json(RawResponse {
        count: chunks.len(),
        chunks,
    }))
}

/// Forward text and/or a control key to the shell.
pub async fn post_input(
    State(state): State<AppState>,
    Json(req): Json<InputRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.input.is_attached() {
        return Err(api_error(ShellMirrorError::ShellUnavailable));
    }

    if let Some(text) = req.text.as_deref().filter(|t| !t.is_empty()) {
        state.input.send_text(text).await.map_err(api_error)?;
    }
    if let Some(control) = req.control.as_deref() {
        state.input.send_control(control).await.map_err(api_error)?;
        debug!(%control, "sent control key");
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Change the shell's window size.
pub async fn post_resize(
    State(state): State<AppState>,
    Json(req): Json<ResizeRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.window.is_attached() {
        return Err(api_error(ShellMirrorError::ShellUnavailable));
    }

    let size = checked_size(req.cols, req.rows).map_err(api_error)?;
    state.window.resize(size).map_err(api_error)?;
    info!(cols = size.cols, rows = size.rows, "shell resized via API");
    Ok(Json(SuccessResponse::ok()))
}

/// Clear the screen and raw log.
pub async fn post_reset(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.terminal.reset().map_err(api_error)?;
    info!("terminal reset via API");
    Ok(Json(SuccessResponse::ok()))
}

/// Buffer sizes, cursor and shell availability.
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.terminal.status().map_err(api_error)?;
    Ok(Json(StatusResponse::new(status, state.input.is_attached())))
}
