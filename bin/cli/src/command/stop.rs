use anyhow::Context;
use clap::Args;
use colored::Colorize;
use spindb_types::{ContainerConfigPatch, ContainerStatus, Engine};

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct StopArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,
}

pub async fn handle(ctx: &Ctx, args: &StopArgs) -> anyhow::Result<()> {
  let config = ctx
    .manager
    .get_config(&args.name, args.engine)?
    .with_context(|| format!("container '{}' not found", args.name))?;

  if !args.engine.is_file_embedded() {
    let adapter = ctx.adapters.get_for_engine(args.engine)?;
    adapter.stop(&config).await?;
  }
  ctx.manager.update_config(
    &args.name,
    args.engine,
    ContainerConfigPatch {
      status: Some(ContainerStatus::Stopped),
      ..Default::default()
    },
  )?;

  emit(ctx.json, &args.name, |name| {
    println!("{} stopped '{name}'", "ok:".green().bold());
  });
  Ok(())
}
