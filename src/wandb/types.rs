//! Upstream GraphQL payloads and the shapes returned to clients.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Message used for GraphQL errors without a `message` field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Standard GraphQL response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlResponse {
    /// Query result.
    #[serde(default)]
    pub data: Option<Value>,
    /// Errors reported by the GraphQL layer.
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

impl GraphQlResponse {
    /// Joined error messages, or `None` when no errors were reported.
    pub fn error_message(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        let messages: Vec<&str> = errors
            .iter()
            .map(|e| e.get("message").and_then(Value::as_str).unwrap_or(UNKNOWN_ERROR))
            .collect();
        Some(messages.join("; "))
    }

    /// The `data.project` node when present and non-empty.
    pub fn into_project(self) -> Option<Value> {
        self.data
            .and_then(|mut data| data.get_mut("project").map(Value::take))
            .filter(is_present)
    }
}

/// False for `null`, `false`, zero, and empty strings, arrays, or objects.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// `project` node of the runs listing query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectNode {
    /// Project name.
    pub name: Option<String>,
    /// Owning entity.
    pub entity: Option<NamedRef>,
    /// Runs connection.
    pub runs: Option<RunConnection>,
}

/// Any upstream object that only carries a name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    /// Name, if reported.
    pub name: Option<String>,
}

/// Relay-style runs connection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConnection {
    /// Edges in upstream order.
    pub edges: Option<Vec<RunEdge>>,
}

/// One edge of [`RunConnection`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunEdge {
    /// Run node.
    pub node: Option<RunNode>,
}

/// Run node as selected by the listing query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunNode {
    pub id: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub state: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub user: Option<NamedRef>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    /// JSON-encoded string or an already decoded object, depending on API version.
    pub summary_metrics: Option<Value>,
}

/// A run as listed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Falls back to `name` when the upstream has no display name.
    pub display_name: Option<String>,
    /// Lifecycle state label (e.g. `running`, `finished`).
    pub state: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Owning user name.
    pub user: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    /// At most 12 numeric summary metrics, in upstream order.
    #[schema(value_type = Object)]
    pub metrics: Map<String, Value>,
}

/// Response of `GET /api/wandb/runs`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RunsResponse {
    /// Project name as reported by the upstream.
    pub project: Option<String>,
    /// Entity name as reported by the upstream.
    pub entity: Option<String>,
    /// Number of runs returned.
    pub count: usize,
    pub runs: Vec<RunSummary>,
}

/// Response of `GET /api/wandb/run`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RunDetailResponse {
    /// Raw upstream run node.
    #[schema(value_type = Object)]
    pub run: Value,
    /// Decoded summary metrics, unfiltered.
    #[schema(value_type = Option<Object>)]
    pub summary: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_message_joins_messages() {
        let response: GraphQlResponse = serde_json::from_value(json!({
            "errors": [{ "message": "first" }, { "path": ["x"] }, { "message": "third" }]
        }))
        .unwrap();
        assert_eq!(
            response.error_message().as_deref(),
            Some("first; Unknown error; third")
        );
    }

    #[test]
    fn empty_or_null_errors_are_ignored() {
        let response: GraphQlResponse =
            serde_json::from_value(json!({ "data": {}, "errors": [] })).unwrap();
        assert_eq!(response.error_message(), None);

        let response: GraphQlResponse =
            serde_json::from_value(json!({ "data": {}, "errors": null })).unwrap();
        assert_eq!(response.error_message(), None);
    }

    #[test]
    fn into_project_treats_empty_as_missing() {
        let response: GraphQlResponse =
            serde_json::from_value(json!({ "data": { "project": {} } })).unwrap();
        assert!(response.into_project().is_none());

        let response: GraphQlResponse =
            serde_json::from_value(json!({ "data": null })).unwrap();
        assert!(response.into_project().is_none());

        let response: GraphQlResponse =
            serde_json::from_value(json!({ "data": { "project": { "name": "demo" } } })).unwrap();
        assert_eq!(response.into_project(), Some(json!({ "name": "demo" })));
    }

    #[test]
    fn run_node_reads_camel_case_fields() {
        let node: RunNode = serde_json::from_value(json!({
            "id": "UnVuOjE=",
            "displayName": "brisk-sun-3",
            "createdAt": "2024-01-01T00:00:00",
            "user": { "name": "ada" },
            "summaryMetrics": "{\"loss\": 0.1}"
        }))
        .unwrap();
        assert_eq!(node.display_name.as_deref(), Some("brisk-sun-3"));
        assert_eq!(node.user.and_then(|u| u.name).as_deref(), Some("ada"));
        assert!(node.summary_metrics.unwrap().is_string());
        assert!(node.tags.is_none());
    }
}
