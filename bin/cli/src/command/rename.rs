use clap::Args;
use colored::Colorize;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct RenameArgs {
  pub name: String,
  pub new_name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,
}

pub async fn handle(ctx: &Ctx, args: &RenameArgs) -> anyhow::Result<()> {
  let config = ctx.manager.rename(&args.name, &args.new_name, args.engine)?;
  emit(ctx.json, &config, |config| {
    println!(
      "{} renamed '{}' to '{}'",
      "ok:".green().bold(),
      args.name,
      config.name
    );
  });
  Ok(())
}
