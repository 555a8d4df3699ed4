use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cmd::{
    self, forms::FormsArgs, run::RunArgs, schema::SchemaArgs, validate::ValidateArgs,
};
use crate::config::AppConfig;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "dynamic-form",
    about = "Fill, validate and keep records of schema-driven forms",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// JSON catalog of form schemas; overrides the config file
    #[arg(long = "catalog", value_name = "FILE", global = true)]
    catalog: Option<PathBuf>,

    /// Log filter for stderr output (e.g. `debug`, `form_engine=trace`)
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill forms interactively
    Run(RunArgs),
    /// List selectable form types
    Forms(FormsArgs),
    /// Validate a JSON file of values against a form type
    Validate(ValidateArgs),
    /// Print the JSON Schema of the form document format
    Schema(SchemaArgs),
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(catalog) = &self.catalog {
            config.catalog = Some(catalog.clone());
        }
        Ok(config)
    }
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref())?;
    let config = cli.app_config()?;
    debug!(?config, "starting");

    match cli.command {
        Commands::Run(args) => block_on(cmd::run::run(args, &config)),
        Commands::Forms(args) => cmd::forms::run(args, &config),
        Commands::Validate(args) => block_on(cmd::validate::run(args, &config)),
        Commands::Schema(args) => cmd::schema::run(args),
    }
}

fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(future)
}
