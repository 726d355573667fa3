use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Args;
use colored::Colorize;
use spindb_adapter::RetryOpts;
use spindb_container::CreateOpts;
use spindb_types::{Engine, RemoteConfig};

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct CreateArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,

  #[arg(long, default_value = "latest")]
  pub version: String,

  #[arg(long)]
  pub port: Option<u16>,

  /// Primary logical database name; defaults to `name`.
  #[arg(long)]
  pub database: Option<String>,

  /// Required for file-embedded engines (sqlite, duckdb): the
  /// absolute path to create the database file at.
  #[arg(long)]
  pub path: Option<PathBuf>,

  #[arg(long)]
  pub no_start: bool,

  #[arg(long)]
  pub remote_host: Option<String>,

  #[arg(long, default_value = "tcp")]
  pub remote_scheme: String,

  #[arg(long)]
  pub remote_ssl: bool,
}

pub async fn handle(ctx: &Ctx, args: &CreateArgs) -> anyhow::Result<()> {
  let engine = args.engine;
  let database = args.database.clone().unwrap_or_else(|| args.name.clone());
  let remote = args.remote_host.as_ref().map(|host| RemoteConfig {
    host: host.clone(),
    scheme: args.remote_scheme.clone(),
    ssl: args.remote_ssl,
  });

  let mut config = ctx
    .manager
    .create(
      &args.name,
      engine,
      CreateOpts {
        version: args.version.clone(),
        port: args.port,
        database: database.clone(),
        databases: vec![database],
        cloned_from: None,
        remote,
      },
    )
    .context("create failed")?;

  if config.remote.is_none() {
    let adapter = ctx.adapters.get_for_engine(engine)?;
    adapter.ensure_binaries(&config.version).await?;

    let mut opts = BTreeMap::new();
    if engine.is_file_embedded() {
      let path = args.path.as_ref().ok_or_else(|| {
        anyhow::anyhow!("--path is required for file-embedded engine '{engine}'")
      })?;
      opts.insert("path".to_string(), path.to_string_lossy().into_owned());
    }
    adapter
      .init_data_dir(&args.name, &config.version, &opts)
      .await
      .context("failed to initialize data directory")?;

    if engine.is_file_embedded() {
      config = ctx
        .manager
        .get_config(&args.name, engine)?
        .context("container vanished right after creation")?;
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
      config = ctx.manager.update_config(&args.name, engine, patch)?;
    }

    if matches!(engine, Engine::Postgres | Engine::CockroachDb) {
      let bundle = spindb_adapter::engines::postgres::bootstrap_admin_credential(&config);
      ctx.credentials.save(&args.name, engine, "admin", &bundle)?;
    }

    if !args.no_start && !engine.is_file_embedded() {
      let outcome = spindb_adapter::start_with_retry(
        adapter.as_ref(),
        &ctx.manager,
        &args.name,
        engine,
        &RetryOpts::default(),
        |old, new| {
          if !ctx.json {
            println!(
              "{} port {old} was in use; retried on {new}",
              "note:".yellow()
            );
          }
        },
      )
      .await?;
      if !outcome.success {
        bail!(outcome.error.unwrap_or_else(|| "start failed".to_string()));
      }
      config = ctx
        .manager
        .get_config(&args.name, engine)?
        .context("container vanished right after start")?;
    }
  }

  emit(ctx.json, &config, |config| {
    println!(
      "{} created '{}' ({}{})",
      "ok:".green().bold(),
      config.name,
      config.engine,
      if config.status == spindb_types::ContainerStatus::Running {
        ", running".to_string()
      } else {
        String::new()
      }
    );
  });
  Ok(())
}
