//! HTTP API for the mirrored terminal.
//!
//! ## Endpoints
//!
//! - `GET /health`, `GET /api/health` - Health check
//! - `GET /api/output?lines=&strip=&plain=` - Screen snapshot
//! - `GET /api/raw?lines=` - Recent raw chunks
//! - `POST /api/input` - Send `{ "text": ..., "control": ... }` to the shell
//! - `POST /api/resize` - Set the shell's window size from `{ "cols": ..., "rows": ... }`
//! - `POST /api/reset` - Clear screen and raw log
//! - `GET /api/status` - Buffer sizes, cursor, title, shell availability
//!
//! ## Example
//!
//! ```no_run
//! use shell_mirror::api::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> shell_mirror::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 3000);
//!     serve(config).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::{ApiError, AppState};
pub use router::{create_router, create_router_with_state, serve, serve_with_state, ServerConfig};
pub use types::{
    CursorPosition, ErrorResponse, HealthResponse, InputRequest, OutputQuery, OutputResponse,
    RawQuery, RawResponse, ResizeRequest, StatusResponse, SuccessResponse,
};
