use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use form_spec::{FieldValues, ValidationErrors, validate};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::AppConfig;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Form type whose schema the values are checked against
    #[arg(long = "form-type", value_name = "ID")]
    pub form_type: String,
    /// JSON object mapping field names to values
    #[arg(long = "values", value_name = "values.json")]
    pub values: PathBuf,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ValidateReport<'a> {
    form_type: &'a str,
    valid: bool,
    errors: &'a ValidationErrors,
}

pub async fn run(args: ValidateArgs, config: &AppConfig) -> Result<()> {
    let provider = config.schema_provider()?;
    let schema = provider
        .fetch_schema(&args.form_type)
        .await
        .with_context(|| format!("failed to load form `{}`", args.form_type))?;
    let values = load_values(&args.values)?;
    debug!(form_type = %args.form_type, fields = schema.len(), "validating values");

    let errors = validate(&schema, &values);
    if args.json {
        let report = ValidateReport {
            form_type: &args.form_type,
            valid: errors.is_empty(),
            errors: &errors,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if errors.is_empty() {
        println!("{}: valid", args.form_type);
    } else {
        println!("{}: invalid", args.form_type);
        for field in schema.fields() {
            if let Some(message) = errors.get(&field.name) {
                println!("  {}: {message}", field.name);
            }
        }
    }

    if !errors.is_empty() {
        bail!("{} field(s) failed validation", errors.len());
    }
    Ok(())
}

/// Reads a JSON object of raw values. Scalars are taken in their text form.
pub fn load_values(path: &Path) -> Result<FieldValues> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read values {}", path.display()))?;
    let object: BTreeMap<String, JsonValue> = serde_json::from_str(&raw)
        .with_context(|| format!("{} must contain a JSON object", path.display()))?;
    object
        .into_iter()
        .map(|(name, value)| {
            let raw = match value {
                JsonValue::String(text) => text,
                JsonValue::Null => String::new(),
                JsonValue::Number(number) => number.to_string(),
                JsonValue::Bool(flag) => flag.to_string(),
                other => bail!("value of `{name}` must be a scalar, got {other}"),
            };
            Ok((name, raw))
        })
        .collect()
}
