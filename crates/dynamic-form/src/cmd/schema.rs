use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use form_spec::FormSchemaDocument;

#[derive(Args, Debug, Clone, Default)]
pub struct SchemaArgs {
    /// Write the schema to a file instead of stdout
    #[arg(long = "out", value_name = "schema.json")]
    pub out: Option<PathBuf>,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let schema = schemars::schema_for!(FormSchemaDocument);
    let payload = serde_json::to_string_pretty(&schema)?;
    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, payload + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{payload}"),
    }
    Ok(())
}
