use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::spec::field::{FieldKind, FieldSchema};

/// Wire shape returned by schema sources: `{"fields": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSchemaDocument {
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// Ordered field list whose names are unique and whose dropdowns carry options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FormSchemaDocument")]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
}

/// Schema invariant violations.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field name must not be empty")]
    EmptyName,
    #[error("duplicate field name '{0}'")]
    DuplicateField(String),
    #[error("dropdown field '{0}' has no options")]
    MissingOptions(String),
    #[error("field '{name}' of type {kind} must not declare options")]
    UnexpectedOptions { name: String, kind: &'static str },
    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSchema>) -> Result<Self, SchemaError> {
        let mut seen = BTreeSet::new();
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            match field.kind {
                FieldKind::Dropdown if field.options.is_empty() => {
                    return Err(SchemaError::MissingOptions(field.name.clone()));
                }
                FieldKind::Dropdown => {}
                kind if !field.options.is_empty() => {
                    return Err(SchemaError::UnexpectedOptions {
                        name: field.name.clone(),
                        kind: kind.as_str(),
                    });
                }
                _ => {}
            }
        }
        Ok(Self { fields })
    }

    /// Schema with no fields; what the engine holds while nothing is loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, SchemaError> {
        let document: FormSchemaDocument = serde_json::from_str(raw)?;
        Self::try_from(document)
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let document: FormSchemaDocument = serde_json::from_value(value)?;
        Self::try_from(document)
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|field| field.required)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn to_document(&self) -> FormSchemaDocument {
        FormSchemaDocument {
            fields: self.fields.clone(),
        }
    }
}

impl TryFrom<FormSchemaDocument> for FormSchema {
    type Error = SchemaError;

    fn try_from(document: FormSchemaDocument) -> Result<Self, Self::Error> {
        Self::new(document.fields)
    }
}
