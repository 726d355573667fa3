use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use spindb_adapter::RestoreOpts;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct RestoreArgs {
  pub name: String,
  pub in_path: PathBuf,

  #[arg(long, short = 'e')]
  pub engine: Engine,

  #[arg(long)]
  pub database: Option<String>,

  /// Force a format instead of sniffing the artifact's magic bytes.
  #[arg(long)]
  pub format: Option<String>,
}

pub async fn handle(ctx: &Ctx, args: &RestoreArgs) -> anyhow::Result<()> {
  let outcome = ctx
    .backups
    .restore(
      &args.name,
      args.engine,
      &args.in_path,
      RestoreOpts {
        database: args.database.clone(),
        format: args.format.clone(),
      },
    )
    .await?;

  emit(ctx.json, &outcome.format, |format| {
    println!(
      "{} restored '{}' from {} ({format})",
      "ok:".green().bold(),
      args.name,
      args.in_path.display(),
    );
  });
  Ok(())
}
