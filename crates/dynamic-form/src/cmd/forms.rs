use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;
use crate::render::render_form_types;

#[derive(Args, Debug, Clone, Default)]
pub struct FormsArgs {
    /// Emit the list as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: FormsArgs, config: &AppConfig) -> Result<()> {
    let form_types = config.resolved_form_types()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&form_types)?);
    } else {
        println!("{}", render_form_types(&form_types));
    }
    Ok(())
}
