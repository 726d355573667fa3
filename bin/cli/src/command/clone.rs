use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use colored::Colorize;
use spindb_adapter::RetryOpts;
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct CloneArgs {
  pub source_name: String,
  pub target_name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,

  /// Logical database name for the new container; defaults to
  /// `target_name`.
  #[arg(long)]
  pub database: Option<String>,

  /// Required for file-embedded engines: the path to create the
  /// clone's file at.
  #[arg(long)]
  pub path: Option<PathBuf>,
}

pub async fn handle(ctx: &Ctx, args: &CloneArgs) -> anyhow::Result<()> {
  let database = args
    .database
    .clone()
    .unwrap_or_else(|| args.target_name.clone());

  let config = ctx.backups.register_clone_target(
    &args.source_name,
    &args.target_name,
    args.engine,
    database,
  )?;

  let adapter = ctx.adapters.get_for_engine(args.engine)?;
  adapter.ensure_binaries(&config.version).await?;

  let mut opts = BTreeMap::new();
  if args.engine.is_file_embedded() {
    let path = args
      .path
      .as_ref()
      .ok_or_else(|| anyhow::anyhow!("--path is required for file-embedded engine '{}'", args.engine))?;
    opts.insert("path".to_string(), path.to_string_lossy().into_owned());
  }
  adapter
    .init_data_dir(&args.target_name, &config.version, &opts)
    .await?;

  if args.engine.is_file_embedded() {
    let patch = spindb_types::ContainerConfigPatch {
      database: Some(
        args
          .path
          .as_ref()
          .expect("checked above")
          .to_string_lossy()
          .into_owned(),
      ),
      ..Default::default()
    };
    ctx
      .manager
      .update_config(&args.target_name, args.engine, patch)?;
  } else {
    let outcome = spindb_adapter::start_with_retry(
      adapter.as_ref(),
      &ctx.manager,
      &args.target_name,
      args.engine,
      &RetryOpts::default(),
      |_, _| {},
    )
    .await?;
    if !outcome.success {
      bail!(outcome.error.unwrap_or_else(|| "start failed".to_string()));
    }
  }

  let restore_outcome = ctx
    .backups
    .clone_into(&args.source_name, &args.target_name, args.engine)
    .await?;

  emit(ctx.json, &restore_outcome.format, |format| {
    println!(
      "{} cloned '{}' into '{}' ({format})",
      "ok:".green().bold(),
      args.source_name,
      args.target_name,
    );
  });
  Ok(())
}
