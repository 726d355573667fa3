use anyhow::bail;
use clap::Args;
use colored::Colorize;
use spindb_adapter::RetryOpts;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct StartArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,
}

pub async fn handle(ctx: &Ctx, args: &StartArgs) -> anyhow::Result<()> {
  if args.engine.is_file_embedded() {
    bail!("'{}' is a file-embedded engine and has no process to start", args.engine);
  }
  let adapter = ctx.adapters.get_for_engine(args.engine)?;
  let outcome = spindb_adapter::start_with_retry(
    adapter.as_ref(),
    &ctx.manager,
    &args.name,
    args.engine,
    &RetryOpts::default(),
    |old, new| {
      if !ctx.json {
        println!("{} port {old} was in use; retried on {new}", "note:".yellow());
      }
    },
  )
  .await?;

  if !outcome.success {
    bail!(outcome.error.unwrap_or_else(|| "start failed".to_string()));
  }

  #[derive(serde::Serialize)]
  struct Started {
    name: String,
    port: u16,
    retries_used: u32,
    connection_string: Option<String>,
  }
  let result = Started {
    name: args.name.clone(),
    port: outcome.final_port,
    retries_used: outcome.retries_used,
    connection_string: outcome.connection_string.clone(),
  };

  emit(ctx.json, &result, |result| {
    println!(
      "{} started '{}' on port {} ({})",
      "ok:".green().bold(),
      result.name,
      result.port,
      result.connection_string.as_deref().unwrap_or("-"),
    );
  });
  Ok(())
}
