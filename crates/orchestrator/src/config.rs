//! Configuration layer (C12): env/dotenvy-driven `GraphConfig`/`IngestConfig`,
//! generalized from the original Python `MetaZenseConfig.from_environment()`.

use etlgraph_typemap::TargetPlatform;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// C12's own default, distinct from [`TargetPlatform::defaults`]'s broader
/// enrichment-default list used by the type-mapping engine itself.
fn default_target_platforms() -> Vec<TargetPlatform> {
    vec![TargetPlatform::SqlServer, TargetPlatform::Postgresql]
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend {0:?}: expected \"memory\" or \"remote\"")]
    InvalidBackend(String),
    #[error("remote backend requires ETLGRAPH_URI")]
    MissingUri,
    #[error("unknown target platform {0:?}")]
    UnknownPlatform(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphBackend {
    Memory,
    Remote { uri: String, user: Option<String>, password: Option<String>, database: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub backend: GraphBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub target_platforms: Vec<TargetPlatform>,
    pub enable_type_mapping: bool,
    pub enable_schema_introspection: bool,
}

impl GraphConfig {
    /// Reads `ETLGRAPH_BACKEND`/`ETLGRAPH_URI`/`ETLGRAPH_USER`/
    /// `ETLGRAPH_PASSWORD`/`ETLGRAPH_DATABASE`. `dotenvy::dotenv().ok()` is
    /// expected to have already run in the binary entry point, matching the
    /// teacher's pattern of loading `.env` once at startup.
    pub fn from_environment() -> Result<Self, ConfigError> {
        let backend_name = std::env::var("ETLGRAPH_BACKEND").unwrap_or_else(|_| "memory".to_string());
        let backend = match backend_name.to_lowercase().as_str() {
            "memory" => GraphBackend::Memory,
            "remote" => {
                let uri = std::env::var("ETLGRAPH_URI").map_err(|_| ConfigError::MissingUri)?;
                GraphBackend::Remote {
                    uri,
                    user: std::env::var("ETLGRAPH_USER").ok(),
                    password: std::env::var("ETLGRAPH_PASSWORD").ok(),
                    database: std::env::var("ETLGRAPH_DATABASE").unwrap_or_else(|_| "neo4j".to_string()),
                }
            }
            other => return Err(ConfigError::InvalidBackend(other.to_string())),
        };
        Ok(GraphConfig { backend })
    }
}

impl IngestConfig {
    pub fn from_environment() -> Result<Self, ConfigError> {
        let target_platforms = match std::env::var("ETLGRAPH_TARGET_PLATFORMS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| TargetPlatform::from_str(s).ok_or_else(|| ConfigError::UnknownPlatform(s.to_string())))
                .collect::<Result<Vec<_>, _>>()?,
            Err(_) => default_target_platforms(),
        };

        Ok(IngestConfig {
            target_platforms,
            enable_type_mapping: bool_env("ETLGRAPH_ENABLE_TYPE_MAPPING", true),
            enable_schema_introspection: bool_env("ETLGRAPH_ENABLE_SCHEMA_INTROSPECTION", true),
        })
    }
}

fn bool_env(key: &str, default: bool) -> bool {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_to_memory_backend() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("ETLGRAPH_BACKEND");
        let config = GraphConfig::from_environment().unwrap();
        assert!(matches!(config.backend, GraphBackend::Memory));
    }

    #[test]
    fn remote_backend_requires_uri() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("ETLGRAPH_BACKEND", "remote");
        std::env::remove_var("ETLGRAPH_URI");
        let err = GraphConfig::from_environment().unwrap_err();
        assert!(matches!(err, ConfigError::MissingUri));
        std::env::remove_var("ETLGRAPH_BACKEND");
    }

    #[test]
    fn unknown_backend_name_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("ETLGRAPH_BACKEND", "sqlite");
        let err = GraphConfig::from_environment().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBackend(_)));
        std::env::remove_var("ETLGRAPH_BACKEND");
    }

    #[test]
    fn ingest_config_defaults_match_spec() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("ETLGRAPH_TARGET_PLATFORMS");
        let config = IngestConfig::from_environment().unwrap();
        assert!(config.enable_type_mapping);
        assert!(config.enable_schema_introspection);
        assert_eq!(config.target_platforms, vec![TargetPlatform::SqlServer, TargetPlatform::Postgresql]);
    }
}
