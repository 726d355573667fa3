use anyhow::Context;
use clap::Args;
use spindb_adapter::ExecuteQueryOpts;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::{emit, table};

#[derive(Debug, Args)]
pub struct QueryArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,

  pub query: String,

  #[arg(long)]
  pub database: Option<String>,
}

#[derive(serde::Serialize)]
struct QueryOutput {
  columns: Vec<String>,
  rows: Vec<Vec<String>>,
  row_count: usize,
}

pub async fn handle(ctx: &Ctx, args: &QueryArgs) -> anyhow::Result<()> {
  let config = ctx
    .manager
    .get_config(&args.name, args.engine)?
    .with_context(|| format!("container '{}' not found", args.name))?;
  let adapter = ctx.adapters.get_for_engine(args.engine)?;
  let result = adapter
    .execute_query(
      &config,
      &args.query,
      &ExecuteQueryOpts {
        database: args.database.clone(),
      },
    )
    .await?;

  let output = QueryOutput {
    columns: result.columns,
    rows: result.rows,
    row_count: result.row_count,
  };

  emit(ctx.json, &output, |output| {
    if output.columns.is_empty() && output.rows.is_empty() {
      println!("(no output)");
      return;
    }
    let headers: Vec<&str> = output.columns.iter().map(String::as_str).collect();
    println!("{}", table(&headers, output.rows.clone()));
    println!("({} row{})", output.row_count, if output.row_count == 1 { "" } else { "s" });
  });
  Ok(())
}
