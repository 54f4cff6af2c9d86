//! HTTP API module: static routes, diagnostics, and the W&B proxy.

pub mod docs;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
