use clap::Args;

use crate::command::Ctx;
use crate::output::{emit, table};

#[derive(Debug, Args)]
pub struct ListArgs {
  /// Restrict to a single engine.
  #[arg(long, short = 'e')]
  pub engine: Option<spindb_types::Engine>,
}

pub async fn handle(ctx: &Ctx, args: &ListArgs) -> anyhow::Result<()> {
  let mut records = ctx.manager.list()?;
  if let Some(engine) = args.engine {
    records.retain(|r| r.engine == engine);
  }
  records.sort_by(|a, b| (a.engine, &a.name).cmp(&(b.engine, &b.name)));

  emit(ctx.json, &records, |records| {
    if records.is_empty() {
      println!("no containers");
      return;
    }
    let rows = records
      .iter()
      .map(|r| {
        vec![
          r.name.clone(),
          r.engine.to_string(),
          r.version.clone(),
          if r.port == 0 {
            "-".to_string()
          } else {
            r.port.to_string()
          },
          format!("{:?}", r.status).to_lowercase(),
        ]
      })
      .collect();
    println!(
      "{}",
      table(&["NAME", "ENGINE", "VERSION", "PORT", "STATUS"], rows)
    );
  });
  Ok(())
}
