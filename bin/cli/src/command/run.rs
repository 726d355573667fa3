use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Args;
use colored::Colorize;
use spindb_adapter::ScriptInput;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct RunArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,

  /// Inline script text. Mutually exclusive with `--file`.
  #[arg(long)]
  pub sql: Option<String>,

  /// Script file path. Mutually exclusive with `--sql`.
  #[arg(long)]
  pub file: Option<PathBuf>,

  #[arg(long)]
  pub database: Option<String>,
}

pub async fn handle(ctx: &Ctx, args: &RunArgs) -> anyhow::Result<()> {
  let input = match (&args.sql, &args.file) {
    (Some(sql), None) => ScriptInput::Sql(sql.clone()),
    (None, Some(path)) => ScriptInput::File(path.clone()),
    (Some(_), Some(_)) => bail!("pass exactly one of --sql or --file, not both"),
    (None, None) => bail!("one of --sql or --file is required"),
  };

  let config = ctx
    .manager
    .get_config(&args.name, args.engine)?
    .with_context(|| format!("container '{}' not found", args.name))?;
  let adapter = ctx.adapters.get_for_engine(args.engine)?;
  adapter
    .run_script(&config, input, args.database.as_deref())
    .await?;

  emit(ctx.json, &args.name, |name| {
    println!("{} ran script against '{name}'", "ok:".green().bold());
  });
  Ok(())
}
