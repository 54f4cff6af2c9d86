//! GraphQL documents and request payloads sent to W&B.

use serde::Serialize;

/// Recent runs of a project, newest first, with summary metrics.
pub const PROJECT_RUNS_QUERY: &str = r#"
query ProjectRuns($entity: String!, $project: String!, $first: Int!) {
  project(name: $project, entityName: $entity) {
    id
    name
    entity { name }
    runs(first: $first, order: {by: UPDATED_AT, direction: DESC}) {
      edges {
        node {
          id
          name
          displayName
          state
          createdAt
          updatedAt
          user { name }
          notes
          tags
          summaryMetrics
        }
      }
    }
  }
}
"#;

/// A single run with summary metrics and history keys.
pub const RUN_QUERY: &str = r#"
query Run($entity: String!, $project: String!, $run: String!) {
  project(name: $project, entityName: $entity) {
    run(name: $run) {
      id
      name
      displayName
      state
      createdAt
      updatedAt
      notes
      tags
      summaryMetrics
      historyKeys
    }
  }
}
"#;

/// Body of a GraphQL POST.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<V> {
    /// Query document.
    pub query: &'static str,
    /// Query variables.
    pub variables: V,
}

/// Variables for [`PROJECT_RUNS_QUERY`].
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRunsVariables<'a> {
    pub entity: &'a str,
    pub project: &'a str,
    pub first: u32,
}

/// Variables for [`RUN_QUERY`].
#[derive(Debug, Clone, Serialize)]
pub struct RunVariables<'a> {
    pub entity: &'a str,
    pub project: &'a str,
    pub run: &'a str,
}

/// Build the runs listing request.
pub fn project_runs<'a>(
    entity: &'a str,
    project: &'a str,
    first: u32,
) -> GraphQlRequest<ProjectRunsVariables<'a>> {
    GraphQlRequest {
        query: PROJECT_RUNS_QUERY,
        variables: ProjectRunsVariables {
            entity,
            project,
            first,
        },
    }
}

/// Build the single run request.
pub fn run<'a>(
    entity: &'a str,
    project: &'a str,
    run: &'a str,
) -> GraphQlRequest<RunVariables<'a>> {
    GraphQlRequest {
        query: RUN_QUERY,
        variables: RunVariables { entity, project, run },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn project_runs_payload_shape() {
        let body = serde_json::to_value(project_runs("acme", "demo", 25)).unwrap();
        assert_eq!(
            body["variables"],
            json!({ "entity": "acme", "project": "demo", "first": 25 })
        );
        assert!(body["query"].as_str().unwrap().contains("query ProjectRuns"));
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[test]
    fn run_payload_shape() {
        let body = serde_json::to_value(run("acme", "demo", "abc123")).unwrap();
        assert_eq!(
            body["variables"],
            json!({ "entity": "acme", "project": "demo", "run": "abc123" })
        );
        assert!(body["query"].as_str().unwrap().contains("historyKeys"));
    }
}
