use anyhow::Context;
use clap::Args;
use colored::Colorize;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct InfoArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,
}

pub async fn handle(ctx: &Ctx, args: &InfoArgs) -> anyhow::Result<()> {
  let config = ctx
    .manager
    .get_config(&args.name, args.engine)?
    .with_context(|| format!("container '{}' not found", args.name))?;
  let adapter = ctx.adapters.get_for_engine(args.engine)?;
  let status = adapter.status(&config).await?;
  let connection_string = adapter.get_connection_string(&config, None);

  #[derive(serde::Serialize)]
  struct Info {
    #[serde(flatten)]
    config: spindb_types::ContainerConfig,
    running: bool,
    connection_string: String,
  }
  let info = Info {
    config,
    running: status.running,
    connection_string,
  };

  emit(ctx.json, &info, |info| {
    println!("{}  {}", "name:".bold(), info.config.name);
    println!("{}  {}", "engine:".bold(), info.config.engine);
    println!("{}  {}", "version:".bold(), info.config.version);
    println!(
      "{}  {}",
      "port:".bold(),
      if info.config.port == 0 {
        "-".to_string()
      } else {
        info.config.port.to_string()
      }
    );
    println!("{}  {}", "running:".bold(), info.running);
    println!("{}  {}", "connection:".bold(), info.connection_string);
    if let Some(cloned_from) = &info.config.cloned_from {
      println!("{}  {}", "cloned from:".bold(), cloned_from);
    }
  });
  Ok(())
}
