use clap::{Args, Subcommand};

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct EnginesArgs {
  #[command(subcommand)]
  pub command: EnginesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EnginesCommand {
  /// List the engines supported on this platform.
  List,
}

pub fn handle(ctx: &Ctx, args: &EnginesArgs) -> anyhow::Result<()> {
  match &args.command {
    EnginesCommand::List => {}
  }
  let mut engines = ctx.adapters.list_adapters_for_platform();
  engines.sort();
  let names: Vec<String> = engines.iter().map(|e| e.to_string()).collect();

  emit(ctx.json, &names, |names| {
    for name in names {
      println!("{name}");
    }
  });
  Ok(())
}
