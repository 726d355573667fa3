use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use spindb_adapter::BackupOpts;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct BackupArgs {
  pub name: String,
  pub out_dir: PathBuf,

  #[arg(long, short = 'e')]
  pub engine: Engine,

  /// Output artifact basename; defaults to the container name.
  #[arg(long, short = 'n')]
  pub out_name: Option<String>,

  #[arg(long)]
  pub database: Option<String>,

  #[arg(long)]
  pub format: Option<String>,
}

#[derive(serde::Serialize)]
struct BackupOutput {
  path: PathBuf,
  format: String,
  size: u64,
}

pub async fn handle(ctx: &Ctx, args: &BackupArgs) -> anyhow::Result<()> {
  let outcome = ctx
    .backups
    .backup(
      &args.name,
      args.engine,
      &args.out_dir,
      args.out_name.as_deref(),
      BackupOpts {
        database: args.database.clone(),
        format: args.format.clone(),
      },
    )
    .await?;

  let output = BackupOutput {
    path: outcome.path,
    format: outcome.format,
    size: outcome.size,
  };

  emit(ctx.json, &output, |output| {
    println!(
      "{} wrote {} ({}, {} bytes)",
      "ok:".green().bold(),
      output.path.display(),
      output.format,
      output.size
    );
  });
  Ok(())
}
