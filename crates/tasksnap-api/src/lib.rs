//! tasksnap HTTP API
//!
//! Two routes over the snapshot store:
//! - `POST /save` appends the submitted snapshot as a new revision
//! - `GET /load` returns the latest revision
//!
//! Both are also mounted under `/api`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

pub use config::{CorsPolicy, SaveResponseMode, ServerConfig};
pub use error::ApiError;
pub use server::{router, serve, AppState};
