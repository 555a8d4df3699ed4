use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use form_engine::{
    CatalogSchemaProvider, DEFAULT_FEEDBACK_TTL, DEFAULT_LATENCY, EngineConfig, FormTypeOption,
    MockSchemaProvider, SchemaProvider, default_form_types,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings read from `dynamic-form.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub feedback_ttl_ms: u64,
    /// JSON catalog of form schemas; replaces the built-in forms when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    pub provider: ProviderConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_types: Option<Vec<FormTypeOption>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Simulated round-trip of the built-in provider.
    pub latency_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feedback_ttl_ms: DEFAULT_FEEDBACK_TTL.as_millis() as u64,
            catalog: None,
            provider: ProviderConfig::default(),
            form_types: None,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            latency_ms: DEFAULT_LATENCY.as_millis() as u64,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid configuration")
    }

    /// Reads `path` when given; otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn feedback_ttl(&self) -> Duration {
        Duration::from_millis(self.feedback_ttl_ms)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.provider.latency_ms)
    }

    /// Configured form types, or the catalog's ids, or the built-in three.
    pub fn resolved_form_types(&self) -> Result<Vec<FormTypeOption>> {
        if let Some(form_types) = &self.form_types {
            return Ok(form_types.clone());
        }
        match &self.catalog {
            Some(path) => {
                let provider = CatalogSchemaProvider::from_path(path)?;
                Ok(provider
                    .catalog()
                    .form_types()
                    .map(|id| FormTypeOption::new(id, id))
                    .collect())
            }
            None => Ok(default_form_types()),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            feedback_ttl: self.feedback_ttl(),
            form_types: self.resolved_form_types()?,
        })
    }

    pub fn schema_provider(&self) -> Result<Arc<dyn SchemaProvider>> {
        match &self.catalog {
            Some(path) => {
                let provider = CatalogSchemaProvider::from_path(path)
                    .with_context(|| format!("failed to load catalog {}", path.display()))?;
                Ok(Arc::new(provider))
            }
            None => Ok(Arc::new(
                MockSchemaProvider::default().with_latency(self.latency()),
            )),
        }
    }
}
