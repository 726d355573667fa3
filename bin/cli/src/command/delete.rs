use clap::Args;
use colored::Colorize;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct DeleteArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,

  /// Delete even if the container is currently running.
  #[arg(long)]
  pub force: bool,
}

pub async fn handle(ctx: &Ctx, args: &DeleteArgs) -> anyhow::Result<()> {
  if !args.engine.is_file_embedded()
    && let Some(config) = ctx.manager.get_config(&args.name, args.engine)?
  {
    let adapter = ctx.adapters.get_for_engine(args.engine)?;
    if args.force {
      let _ = adapter.stop(&config).await;
    }
  }
  ctx.manager.delete(&args.name, args.engine, args.force)?;

  emit(ctx.json, &args.name, |name| {
    println!("{} deleted '{name}'", "ok:".green().bold());
  });
  Ok(())
}
