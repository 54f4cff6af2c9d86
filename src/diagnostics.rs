//! Backend and database diagnostics for `GET /test`.
//!
//! The database is an optional collaborator injected at startup as a
//! [`DatabaseHandle`]. Building the report never fails: every problem is
//! folded into the report's text fields instead.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use strum::{Display, IntoStaticStr};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::config::RuntimeEnv;
use crate::metrics;
use crate::utils::truncate_chars;

/// Maximum characters of a database error shown in the report.
pub const MAX_DIAGNOSTIC_ERROR_CHARS: usize = 50;

/// Maximum collection names listed in the report.
pub const MAX_LISTED_COLLECTIONS: usize = 10;

/// Boxed error returned by database collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Database capability the diagnostics endpoint can probe.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Database name, if the store knows it.
    fn name(&self) -> Option<String> {
        None
    }

    /// Names of the collections (or tables) in the database.
    async fn list_collection_names(&self) -> Result<Vec<String>, BoxError>;
}

/// State of the optional database module, decided once at startup.
#[derive(Clone, Default)]
pub enum DatabaseHandle {
    /// No database module is linked into this build.
    #[default]
    Missing,
    /// The module exists but never produced a handle.
    Uninitialized,
    /// Loading the module failed.
    Failed(String),
    /// A usable handle.
    Ready(Arc<dyn CollectionStore>),
}

impl DatabaseHandle {
    /// Wrap a store as a ready handle.
    pub fn ready(store: impl CollectionStore + 'static) -> Self {
        DatabaseHandle::Ready(Arc::new(store))
    }
}

impl fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseHandle::Missing => f.write_str("Missing"),
            DatabaseHandle::Uninitialized => f.write_str("Uninitialized"),
            DatabaseHandle::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
            DatabaseHandle::Ready(_) => f.write_str("Ready(..)"),
        }
    }
}

/// Connection state label in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum ConnectionStatus {
    #[strum(serialize = "Connected")]
    Connected,
    #[strum(serialize = "Not Connected")]
    NotConnected,
}

impl Serialize for ConnectionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let label: &'static str = self.into();
        serializer.serialize_str(label)
    }
}

/// Response of `GET /test`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DiagnosticsReport {
    /// Backend liveness.
    pub backend: String,
    /// Database availability.
    pub database: String,
    /// Whether `DATABASE_URL` is set.
    pub database_url: String,
    /// Whether `DATABASE_NAME` is set.
    pub database_name: String,
    /// `Connected` or `Not Connected`.
    #[schema(value_type = String)]
    pub connection_status: ConnectionStatus,
    /// Up to 10 collection names.
    pub collections: Vec<String>,
}

fn presence(set: bool) -> String {
    let label = if set { "✅ Set" } else { "❌ Not Set" };
    label.to_string()
}

/// Build the diagnostics report.
pub async fn run_diagnostics(handle: &DatabaseHandle, env: &RuntimeEnv) -> DiagnosticsReport {
    metrics::inc_diagnostics_checks();

    let mut report = DiagnosticsReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: presence(env.database_url_set()),
        database_name: presence(env.database_name_set()),
        connection_status: ConnectionStatus::NotConnected,
        collections: Vec::new(),
    };

    match handle {
        DatabaseHandle::Missing => {
            report.database =
                "❌ Database module not found (run enable-database first)".to_string();
        }
        DatabaseHandle::Uninitialized => {
            report.database = "⚠️  Available but not initialized".to_string();
        }
        DatabaseHandle::Failed(reason) => {
            report.database = format!(
                "❌ Error: {}",
                truncate_chars(reason, MAX_DIAGNOSTIC_ERROR_CHARS)
            );
        }
        DatabaseHandle::Ready(store) => {
            report.database = "✅ Available".to_string();
            report.connection_status = ConnectionStatus::Connected;

            if let Ok(Some(name)) = std::panic::catch_unwind(AssertUnwindSafe(|| store.name())) {
                debug!(database = %name, "Probing database");
            }

            match probe_collections(store.as_ref()).await {
                Ok(mut names) => {
                    names.truncate(MAX_LISTED_COLLECTIONS);
                    report.collections = names;
                    report.database = "✅ Connected & Working".to_string();
                }
                Err(reason) => {
                    warn!(error = %reason, "Database collection listing failed");
                    report.database = format!(
                        "⚠️  Connected but Error: {}",
                        truncate_chars(&reason, MAX_DIAGNOSTIC_ERROR_CHARS)
                    );
                }
            }
        }
    }

    report
}

/// List collections, turning both errors and panics into a message.
async fn probe_collections(store: &dyn CollectionStore) -> Result<Vec<String>, String> {
    match AssertUnwindSafe(store.list_collection_names())
        .catch_unwind()
        .await
    {
        Ok(Ok(names)) => Ok(names),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => Err(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "database module panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvSource;

    struct FixedStore(Vec<String>);

    #[async_trait]
    impl CollectionStore for FixedStore {
        fn name(&self) -> Option<String> {
            Some("appdb".to_string())
        }

        async fn list_collection_names(&self) -> Result<Vec<String>, BoxError> {
            Ok(self.0.clone())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl CollectionStore for FailingStore {
        async fn list_collection_names(&self) -> Result<Vec<String>, BoxError> {
            Err(format!("authentication failed: {}", "x".repeat(100)).into())
        }
    }

    struct PanickingStore;

    #[async_trait]
    impl CollectionStore for PanickingStore {
        async fn list_collection_names(&self) -> Result<Vec<String>, BoxError> {
            panic!("driver exploded")
        }
    }

    fn empty_env() -> RuntimeEnv {
        EnvSource::fixed(Vec::<(String, String)>::new()).read()
    }

    #[tokio::test]
    async fn missing_module_reports_guidance() {
        let report = run_diagnostics(&DatabaseHandle::Missing, &empty_env()).await;
        assert_eq!(report.backend, "✅ Running");
        assert!(report.database.contains("module not found"));
        assert_eq!(report.connection_status, ConnectionStatus::NotConnected);
        assert_eq!(report.database_url, "❌ Not Set");
        assert_eq!(report.database_name, "❌ Not Set");
        assert!(report.collections.is_empty());
    }

    #[tokio::test]
    async fn uninitialized_module() {
        let report = run_diagnostics(&DatabaseHandle::Uninitialized, &empty_env()).await;
        assert_eq!(report.database, "⚠️  Available but not initialized");
        assert_eq!(report.connection_status, ConnectionStatus::NotConnected);
    }

    #[tokio::test]
    async fn failed_module_truncates_reason() {
        let handle = DatabaseHandle::Failed("e".repeat(80));
        let report = run_diagnostics(&handle, &empty_env()).await;
        assert_eq!(report.database, format!("❌ Error: {}", "e".repeat(50)));
    }

    #[tokio::test]
    async fn ready_store_lists_first_ten_collections() {
        let names: Vec<String> = (0..14).map(|i| format!("c{i}")).collect();
        let handle = DatabaseHandle::ready(FixedStore(names));
        let env = EnvSource::fixed([("DATABASE_URL", "mongodb://db"), ("DATABASE_NAME", "app")])
            .read();

        let report = run_diagnostics(&handle, &env).await;
        assert_eq!(report.database, "✅ Connected & Working");
        assert_eq!(report.connection_status, ConnectionStatus::Connected);
        assert_eq!(report.collections.len(), MAX_LISTED_COLLECTIONS);
        assert_eq!(report.collections[0], "c0");
        assert_eq!(report.database_url, "✅ Set");
        assert_eq!(report.database_name, "✅ Set");
    }

    #[tokio::test]
    async fn listing_error_is_truncated() {
        let handle = DatabaseHandle::ready(FailingStore);
        let report = run_diagnostics(&handle, &empty_env()).await;
        let prefix = "⚠️  Connected but Error: ";
        assert!(report.database.starts_with(prefix));
        assert_eq!(
            report.database[prefix.len()..].chars().count(),
            MAX_DIAGNOSTIC_ERROR_CHARS
        );
        assert_eq!(report.connection_status, ConnectionStatus::Connected);
        assert!(report.collections.is_empty());
    }

    #[tokio::test]
    async fn listing_panic_is_contained() {
        let handle = DatabaseHandle::ready(PanickingStore);
        let report = run_diagnostics(&handle, &empty_env()).await;
        assert_eq!(report.database, "⚠️  Connected but Error: driver exploded");
    }

    #[test]
    fn connection_status_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(ConnectionStatus::NotConnected).unwrap(),
            serde_json::json!("Not Connected")
        );
        assert_eq!(ConnectionStatus::Connected.to_string(), "Connected");
    }
}
