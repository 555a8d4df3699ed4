use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;
use form_engine::{FormEngine, SelectOutcome, SubmitOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::config::AppConfig;
use crate::render::{render_form_types, render_text};

const HELP: &str = "\
Commands:
  type <id|none>        switch form type (none clears the form)
  set <field> [value]   write a field value; the rest of the line is the value
  submit                validate and save the form
  edit <n>              load record n into the form
  delete <n>            remove record n
  cancel                leave edit mode and clear the form
  forms                 list form types
  show                  print the current form
  help                  print this help
  quit                  leave";

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Form type to open on start
    #[arg(long = "form-type", value_name = "ID")]
    pub form_type: Option<String>,
    /// Do not print the prompt
    #[arg(long = "quiet", default_value_t = false)]
    pub quiet: bool,
}

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    SelectType(Option<String>),
    Set { field: String, value: String },
    Submit,
    Edit(usize),
    Delete(usize),
    Cancel,
    Forms,
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<ReplCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };
    let command = match verb {
        "type" => match rest.trim() {
            "" | "none" => ReplCommand::SelectType(None),
            id => ReplCommand::SelectType(Some(id.to_string())),
        },
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim_start()),
                None => (rest, ""),
            };
            if field.is_empty() {
                bail!("usage: set <field> [value]");
            }
            ReplCommand::Set {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "submit" => ReplCommand::Submit,
        "edit" => ReplCommand::Edit(parse_index(verb, rest)?),
        "delete" => ReplCommand::Delete(parse_index(verb, rest)?),
        "cancel" => ReplCommand::Cancel,
        "forms" => ReplCommand::Forms,
        "show" => ReplCommand::Show,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => bail!("unknown command `{other}`; type `help`"),
    };
    Ok(Some(command))
}

fn parse_index(verb: &str, rest: &str) -> Result<usize> {
    match rest.trim().parse() {
        Ok(index) => Ok(index),
        Err(_) => bail!("usage: {verb} <n>"),
    }
}

pub async fn run(args: RunArgs, config: &AppConfig) -> Result<()> {
    let engine = FormEngine::new(config.schema_provider()?, config.engine_config()?);
    let input = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    run_session(&engine, &args, input, &mut out).await
}

/// Reads commands from `input` until `quit` or end of input.
pub async fn run_session<R, W>(
    engine: &FormEngine,
    args: &RunArgs,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}", render_form_types(engine.form_types()))?;
    if let Some(form_type) = &args.form_type {
        select(engine, Some(form_type.as_str()), out).await?;
    }

    let mut lines = input.lines();
    loop {
        if !args.quiet {
            write!(out, "> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };
        debug!(?command, "repl command");
        if command == ReplCommand::Quit {
            break;
        }
        execute(engine, command, out).await?;
    }
    Ok(())
}

async fn execute<W: Write>(engine: &FormEngine, command: ReplCommand, out: &mut W) -> Result<()> {
    let result = match command {
        ReplCommand::SelectType(form_type) => {
            return select(engine, form_type.as_deref(), out).await;
        }
        ReplCommand::Set { field, value } => engine.set_field_value(&field, value),
        ReplCommand::Submit => engine.submit().map(|outcome| match outcome {
            SubmitOutcome::Created { index, .. } => debug!(index, "created"),
            SubmitOutcome::Updated { index, .. } => debug!(index, "updated"),
            SubmitOutcome::Rejected { errors } => debug!(errors = errors.len(), "rejected"),
        }),
        ReplCommand::Edit(index) => engine.begin_edit(index),
        ReplCommand::Delete(index) => engine.delete_record(index).map(drop),
        ReplCommand::Cancel => {
            engine.cancel_edit();
            Ok(())
        }
        ReplCommand::Forms => {
            writeln!(out, "{}", render_form_types(engine.form_types()))?;
            return Ok(());
        }
        ReplCommand::Show => Ok(()),
        ReplCommand::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(());
        }
        ReplCommand::Quit => return Ok(()),
    };
    if let Err(err) = result {
        writeln!(out, "error: {err}")?;
        return Ok(());
    }
    show(engine, out)
}

async fn select<W: Write>(
    engine: &FormEngine,
    form_type: Option<&str>,
    out: &mut W,
) -> Result<()> {
    if form_type.is_some() {
        writeln!(out, "Loading form structure...")?;
    }
    match engine.select_form_type(form_type).await {
        SelectOutcome::Failed(err) => debug!(error = %err, "selection failed"),
        SelectOutcome::Superseded => return Ok(()),
        SelectOutcome::Cleared | SelectOutcome::Loaded { .. } => {}
    }
    show(engine, out)
}

fn show<W: Write>(engine: &FormEngine, out: &mut W) -> Result<()> {
    writeln!(out, "{}", render_text(&engine.snapshot(), engine.form_types()))?;
    Ok(())
}
