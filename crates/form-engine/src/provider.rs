use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use form_spec::{FormSchema, SchemaError};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const BUILTIN_FORMS: &str = include_str!("../fixtures/builtin_forms.json");

/// Simulated round trip of the built-in mock source.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Failures reported by schema sources.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("form type '{0}' is not available")]
    UnknownFormType(String),
    #[error("schema source unavailable for '{form_type}': {reason}")]
    Unavailable { form_type: String, reason: String },
    #[error("malformed schema for '{form_type}': {source}")]
    Malformed {
        form_type: String,
        #[source]
        source: SchemaError,
    },
    #[error("failed to read schema catalog {}: {source}", .path.display())]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema catalog: {0}")]
    CatalogParse(#[source] serde_json::Error),
}

/// Source of field schemas, keyed by form-type identifier.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn fetch_schema(&self, form_type: &str) -> Result<FormSchema, ProviderError>;
}

/// Raw schema documents keyed by form type. Entries are checked when they are
/// resolved, so one malformed form does not poison the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    forms: BTreeMap<String, Value>,
}

impl SchemaCatalog {
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_FORMS).expect("parse embedded fixtures/builtin_forms.json")
    }

    pub fn from_json(raw: &str) -> Result<Self, ProviderError> {
        let forms: BTreeMap<String, Value> =
            serde_json::from_str(raw).map_err(ProviderError::CatalogParse)?;
        Ok(Self { forms })
    }

    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let raw = fs::read_to_string(path).map_err(|source| ProviderError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn insert(&mut self, form_type: impl Into<String>, document: Value) {
        self.forms.insert(form_type.into(), document);
    }

    pub fn form_types(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    pub fn resolve(&self, form_type: &str) -> Result<FormSchema, ProviderError> {
        let document = self
            .forms
            .get(form_type)
            .ok_or_else(|| ProviderError::UnknownFormType(form_type.to_string()))?;
        FormSchema::from_value(document.clone()).map_err(|source| ProviderError::Malformed {
            form_type: form_type.to_string(),
            source,
        })
    }
}

/// Serves schemas straight from a catalog without delay.
#[derive(Debug, Clone)]
pub struct CatalogSchemaProvider {
    catalog: SchemaCatalog,
}

impl CatalogSchemaProvider {
    pub fn new(catalog: SchemaCatalog) -> Self {
        Self { catalog }
    }

    pub fn from_path(path: &Path) -> Result<Self, ProviderError> {
        SchemaCatalog::load(path).map(Self::new)
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }
}

#[async_trait]
impl SchemaProvider for CatalogSchemaProvider {
    async fn fetch_schema(&self, form_type: &str) -> Result<FormSchema, ProviderError> {
        self.catalog.resolve(form_type)
    }
}

/// Stand-in for a remote schema service: built-in forms, artificial latency and
/// optional forced failures.
#[derive(Debug, Clone)]
pub struct MockSchemaProvider {
    catalog: SchemaCatalog,
    latency: Duration,
    latency_overrides: BTreeMap<String, Duration>,
    failing: BTreeSet<String>,
}

impl Default for MockSchemaProvider {
    fn default() -> Self {
        Self::new(SchemaCatalog::builtin())
    }
}

impl MockSchemaProvider {
    pub fn new(catalog: SchemaCatalog) -> Self {
        Self {
            catalog,
            latency: DEFAULT_LATENCY,
            latency_overrides: BTreeMap::new(),
            failing: BTreeSet::new(),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_latency_for(mut self, form_type: impl Into<String>, latency: Duration) -> Self {
        self.latency_overrides.insert(form_type.into(), latency);
        self
    }

    /// Makes every fetch of `form_type` fail as if the service were down.
    pub fn with_failure(mut self, form_type: impl Into<String>) -> Self {
        self.failing.insert(form_type.into());
        self
    }

    fn latency_for(&self, form_type: &str) -> Duration {
        self.latency_overrides
            .get(form_type)
            .copied()
            .unwrap_or(self.latency)
    }
}

#[async_trait]
impl SchemaProvider for MockSchemaProvider {
    async fn fetch_schema(&self, form_type: &str) -> Result<FormSchema, ProviderError> {
        let latency = self.latency_for(form_type);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.failing.contains(form_type) {
            debug!(form_type, "mock provider failing on request");
            return Err(ProviderError::Unavailable {
                form_type: form_type.to_string(),
                reason: "simulated outage".into(),
            });
        }
        self.catalog.resolve(form_type)
    }
}
