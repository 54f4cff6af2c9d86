//! W&B GraphQL API client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::metrics;

use super::query::{self, GraphQlRequest};
use super::types::{is_present, GraphQlResponse, ProjectNode};

/// Client for the W&B GraphQL endpoint.
///
/// One POST per call, no retries. The API key is supplied per call so it can
/// be read fresh from the environment on every request.
#[derive(Debug, Clone)]
pub struct WandbClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// GraphQL endpoint URL.
    graphql_url: String,
}

impl WandbClient {
    /// Create a new client from config.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.wandb_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            graphql_url: config.wandb_graphql_url.clone(),
        })
    }

    /// Get the GraphQL endpoint URL.
    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Fetch the `project` node with its most recently updated runs.
    #[instrument(skip(self, api_key))]
    pub async fn project_runs(
        &self,
        api_key: &str,
        entity: &str,
        project: &str,
        limit: u32,
    ) -> Result<ProjectNode, ApiError> {
        let payload = query::project_runs(entity, project, limit);
        let response = self.execute("project_runs", api_key, &payload).await?;

        let node = response.into_project().ok_or(ApiError::ProjectNotFound)?;
        let project: ProjectNode = serde_json::from_value(node)?;

        debug!(
            runs = project
                .runs
                .as_ref()
                .and_then(|r| r.edges.as_ref())
                .map_or(0, Vec::len),
            "Fetched project runs"
        );

        Ok(project)
    }

    /// Fetch a single raw run node.
    #[instrument(skip(self, api_key))]
    pub async fn run(
        &self,
        api_key: &str,
        entity: &str,
        project: &str,
        run: &str,
    ) -> Result<Value, ApiError> {
        let payload = query::run(entity, project, run);
        let response = self.execute("run", api_key, &payload).await?;

        let mut project = response.into_project().ok_or(ApiError::RunNotFound)?;
        let node = project
            .get_mut("run")
            .map(Value::take)
            .filter(is_present)
            .ok_or(ApiError::RunNotFound)?;

        Ok(node)
    }

    /// POST a GraphQL document and check the HTTP and GraphQL error layers.
    async fn execute<V: Serialize>(
        &self,
        operation: &'static str,
        api_key: &str,
        payload: &GraphQlRequest<V>,
    ) -> Result<GraphQlResponse, ApiError> {
        metrics::inc_upstream_requests(operation);
        let _timer = metrics::timer_upstream(operation);

        let result = self.send(api_key, payload).await;
        if let Err(e) = &result {
            metrics::inc_upstream_errors(operation, e.kind());
            warn!(operation, error = %e, "W&B request failed");
        }
        result
    }

    async fn send<V: Serialize>(
        &self,
        api_key: &str,
        payload: &GraphQlRequest<V>,
    ) -> Result<GraphQlResponse, ApiError> {
        let response = self
            .http
            .post(&self.graphql_url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        // Non-standard codes above 599 are errors too.
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::upstream(status, &body));
        }

        let body = response.text().await?;
        let parsed: GraphQlResponse = serde_json::from_str(&body)?;

        if let Some(message) = parsed.error_message() {
            return Err(ApiError::GraphQl(message));
        }

        Ok(parsed)
    }
}
