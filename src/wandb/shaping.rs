//! Reshaping upstream run payloads into client responses.

use serde_json::{Map, Value};

use super::types::{ProjectNode, RunDetailResponse, RunNode, RunSummary, RunsResponse};

/// Maximum number of numeric metrics kept per listed run.
pub const MAX_LISTED_METRICS: usize = 12;

/// Decode a `summaryMetrics` field.
///
/// Strings are parsed as JSON; a string that is not valid JSON yields `None`.
/// `null` yields `None`. Any other value is returned unchanged.
pub fn decode_summary_metrics(raw: Option<Value>) -> Option<Value> {
    match raw? {
        Value::Null => None,
        Value::String(encoded) => serde_json::from_str(&encoded).ok(),
        other => Some(other),
    }
}

/// Numeric entries of a decoded summary, first [`MAX_LISTED_METRICS`] in order.
///
/// Non-object summaries produce an empty map.
pub fn numeric_metrics(summary: Option<&Value>) -> Map<String, Value> {
    let Some(Value::Object(entries)) = summary else {
        return Map::new();
    };

    entries
        .iter()
        .filter(|(_, value)| value.is_number())
        .take(MAX_LISTED_METRICS)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Shape one listed run node.
pub fn shape_run_summary(node: RunNode) -> RunSummary {
    let summary = decode_summary_metrics(node.summary_metrics);
    let display_name = node
        .display_name
        .filter(|d| !d.is_empty())
        .or_else(|| node.name.clone());

    RunSummary {
        id: node.id,
        name: node.name,
        display_name,
        state: node.state,
        created_at: node.created_at,
        updated_at: node.updated_at,
        user: node.user.and_then(|u| u.name),
        notes: node.notes,
        tags: node.tags.unwrap_or_default(),
        metrics: numeric_metrics(summary.as_ref()),
    }
}

/// Shape the `project` node of the runs listing query.
pub fn shape_runs(project: ProjectNode) -> RunsResponse {
    let runs: Vec<RunSummary> = project
        .runs
        .and_then(|conn| conn.edges)
        .unwrap_or_default()
        .into_iter()
        .map(|edge| shape_run_summary(edge.node.unwrap_or_default()))
        .collect();

    RunsResponse {
        project: project.name,
        entity: project.entity.and_then(|e| e.name),
        count: runs.len(),
        runs,
    }
}

/// Shape a single run node, keeping it raw and adding the decoded summary.
pub fn shape_run_detail(run: Value) -> RunDetailResponse {
    let summary = decode_summary_metrics(run.get("summaryMetrics").cloned());
    RunDetailResponse { run, summary }
}
