//! HTTP API handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::config::EnvSource;
use crate::diagnostics::{run_diagnostics, DatabaseHandle, DiagnosticsReport};
use crate::error::{ApiError, ErrorBody};
use crate::wandb::{shape_run_detail, shape_runs, RunDetailResponse, RunsResponse, WandbClient};

/// Default number of runs listed.
pub const DEFAULT_RUN_LIMIT: i64 = 25;
/// Smallest accepted `limit`.
pub const MIN_RUN_LIMIT: i64 = 1;
/// Largest accepted `limit`.
pub const MAX_RUN_LIMIT: i64 = 200;

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upstream GraphQL client.
    pub client: WandbClient,
    /// Source of request-time secrets.
    pub env: EnvSource,
    /// Optional database module.
    pub database: DatabaseHandle,
}

impl AppState {
    /// Create new app state reading the process environment, without a database.
    pub fn new(client: WandbClient) -> Self {
        Self {
            client,
            env: EnvSource::Process,
            database: DatabaseHandle::Missing,
        }
    }

    /// Replace the request-time environment source.
    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Attach the database module.
    pub fn with_database(mut self, database: DatabaseHandle) -> Self {
        self.database = database;
        self
    }
}

/// Static message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Query parameters of `GET /api/wandb/runs`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RunsQuery {
    /// W&B entity/org/user.
    pub entity: String,
    /// W&B project name.
    pub project: String,
    /// Max runs to return.
    #[param(minimum = 1, maximum = 200, default = 25)]
    pub limit: Option<i64>,
}

impl RunsQuery {
    /// The requested limit, defaulted and range checked.
    pub fn limit(&self) -> Result<u32, ApiError> {
        let limit = self.limit.unwrap_or(DEFAULT_RUN_LIMIT);
        if !(MIN_RUN_LIMIT..=MAX_RUN_LIMIT).contains(&limit) {
            return Err(ApiError::Validation(format!(
                "limit must be between {} and {}, got {}",
                MIN_RUN_LIMIT, MAX_RUN_LIMIT, limit
            )));
        }
        u32::try_from(limit).map_err(|e| ApiError::Validation(e.to_string()))
    }
}

/// Query parameters of `GET /api/wandb/run`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RunQuery {
    /// W&B entity/org/user.
    pub entity: String,
    /// W&B project name.
    pub project: String,
    /// Run name/ID.
    pub run: String,
}

fn invalid_query(rejection: QueryRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

/// Liveness message.
#[utoipa::path(get, path = "/", responses((status = 200, body = MessageResponse)))]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello from the Backend!".to_string(),
    })
}

/// Static API greeting.
#[utoipa::path(get, path = "/api/hello", responses((status = 200, body = MessageResponse)))]
pub async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello from the backend API!".to_string(),
    })
}

/// Backend and database diagnostics. Always 200.
#[utoipa::path(get, path = "/test", responses((status = 200, body = DiagnosticsReport)))]
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    let env = state.env.read();
    Json(run_diagnostics(&state.database, &env).await)
}

/// Recent runs for an entity/project with key summary metrics.
///
/// Proxies W&B GraphQL so the API key stays on the server.
#[utoipa::path(
    get,
    path = "/api/wandb/runs",
    tag = "wandb",
    params(RunsQuery),
    responses(
        (status = 200, body = RunsResponse),
        (status = 400, description = "Invalid parameters, missing API key, or GraphQL error", body = ErrorBody),
        (status = 404, description = "Project not found or access denied", body = ErrorBody),
        (status = 500, description = "Upstream unreachable or malformed", body = ErrorBody),
    )
)]
pub async fn list_runs(
    State(state): State<AppState>,
    query: Result<Query<RunsQuery>, QueryRejection>,
) -> Result<Json<RunsResponse>, ApiError> {
    let Query(params) = query.map_err(invalid_query)?;
    let limit = params.limit()?;

    let env = state.env.read();
    let api_key = env.api_key()?;

    let project = state
        .client
        .project_runs(api_key, &params.entity, &params.project, limit)
        .await?;
    let response = shape_runs(project);

    info!(
        entity = %params.entity,
        project = %params.project,
        count = response.count,
        "Listed runs"
    );

    Ok(Json(response))
}

/// Details for a single run, including decoded summary metrics.
///
/// Full history series are not fetched; clients should link to W&B for those.
#[utoipa::path(
    get,
    path = "/api/wandb/run",
    tag = "wandb",
    params(RunQuery),
    responses(
        (status = 200, body = RunDetailResponse),
        (status = 400, description = "Invalid parameters, missing API key, or GraphQL error", body = ErrorBody),
        (status = 404, description = "Run not found", body = ErrorBody),
        (status = 500, description = "Upstream unreachable or malformed", body = ErrorBody),
    )
)]
pub async fn get_run(
    State(state): State<AppState>,
    query: Result<Query<RunQuery>, QueryRejection>,
) -> Result<Json<RunDetailResponse>, ApiError> {
    let Query(params) = query.map_err(invalid_query)?;

    let env = state.env.read();
    let api_key = env.api_key()?;

    let run = state
        .client
        .run(api_key, &params.entity, &params.project, &params.run)
        .await?;

    Ok(Json(shape_run_detail(run)))
}
