//! OpenAPI document served at `/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use super::handlers::{self, MessageResponse};
use crate::diagnostics::DiagnosticsReport;
use crate::error::ErrorBody;
use crate::wandb::{RunDetailResponse, RunSummary, RunsResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "wandb_proxy",
        description = "Proxies the W&B GraphQL API while keeping the API key on the server"
    ),
    paths(
        handlers::root,
        handlers::hello,
        handlers::diagnostics,
        handlers::list_runs,
        handlers::get_run,
    ),
    components(schemas(
        MessageResponse,
        DiagnosticsReport,
        RunsResponse,
        RunSummary,
        RunDetailResponse,
        ErrorBody,
    )),
    tags((name = "wandb", description = "W&B run listing and details"))
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
