//! Mongo-wire family: MongoDB and FerretDB. FerretDB speaks the
//! MongoDB wire protocol over a Postgres-backed storage engine, so
//! the same `mongosh`/`mongodump`/`mongorestore` client toolchain
//! works against either server unmodified.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use spindb_paths::Layout;
use spindb_types::{
  ContainerConfig, CredentialBundle, Engine, Error, PasswordCredential, Result,
};

use crate::profile::{EngineProfile, profile_for};
use crate::{
  BackupOpts, BackupOutcome, CreateUserOpts, DumpOutcome, EngineAdapter,
  ExecuteQueryOpts, InitOpts, QueryResult, RestoreOpts, RestoreOutcome,
  ScriptInput, StartOutcome, StatusOutcome, common, resolve_binary,
};

pub struct MongoWireAdapter {
  engine: Engine,
  profile: &'static EngineProfile,
  layout: Layout,
}

impl MongoWireAdapter {
  pub fn new(engine: Engine, layout: Layout) -> Self {
    let profile = profile_for(engine)
      .expect("MongoWireAdapter constructed for a non-mongo-wire engine");
    MongoWireAdapter {
      engine,
      profile,
      layout,
    }
  }

  fn client_binary(&self) -> Result<PathBuf> {
    let name = self.profile.client_binary.unwrap_or(self.profile.binary_name);
    resolve_binary(name).ok_or_else(|| Error::BinaryMissing {
      engine: self.engine.to_string(),
      hint: self.profile.install_hint.to_string(),
    })
  }

  fn uri(&self, config: &ContainerConfig, database: &str) -> String {
    format!("mongodb://127.0.0.1:{}/{database}", config.port)
  }
}

#[async_trait]
impl EngineAdapter for MongoWireAdapter {
  fn engine(&self) -> Engine {
    self.engine
  }

  fn install_hint(&self) -> &str {
    self.profile.install_hint
  }

  async fn ensure_binaries(&self, _version: &str) -> Result<PathBuf> {
    resolve_binary(self.profile.binary_name).ok_or_else(|| Error::BinaryMissing {
      engine: self.engine.to_string(),
      hint: self.profile.install_hint.to_string(),
    })
  }

  fn verify_binary(&self) -> bool {
    resolve_binary(self.profile.binary_name).is_some()
  }

  async fn init_data_dir(
    &self,
    name: &str,
    _version: &str,
    _opts: &InitOpts,
  ) -> Result<PathBuf> {
    common::init_plain_data_dir(&self.layout, name, self.engine)
  }

  async fn start(&self, config: &ContainerConfig) -> Result<StartOutcome> {
    let data_dir = self.layout.data_dir(&config.name, self.engine)?;
    let args = vec![
      "--dbpath".to_string(),
      data_dir.to_string_lossy().into_owned(),
      "--port".to_string(),
      config.port.to_string(),
      "--bind_ip".to_string(),
      "127.0.0.1".to_string(),
    ];
    common::start(self.profile, &self.layout, config, args).await
  }

  async fn stop(&self, config: &ContainerConfig) -> Result<()> {
    common::stop(self.profile, &self.layout, config).await
  }

  async fn status(&self, config: &ContainerConfig) -> Result<StatusOutcome> {
    common::status(&self.layout, config)
  }

  fn get_connection_string(
    &self,
    config: &ContainerConfig,
    database: Option<&str>,
  ) -> String {
    common::connection_string(self.profile, config, database)
  }

  async fn create_database(&self, config: &ContainerConfig, name: &str) -> Result<()> {
    // Mongo creates databases implicitly on first write; this inserts
    // and removes a sentinel document so `create_database` has an
    // observable effect the catalogue can rely on.
    let bin = self.client_binary()?;
    let js = "db.__spindb_sentinel.insertOne({}); db.__spindb_sentinel.drop();";
    let out = spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &[self.uri(config, name), "--quiet".to_string()],
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(30),
      js.as_bytes(),
    )
    .await?;
    if !out.success {
      return Err(Error::NonZeroExit {
        code: out.code.unwrap_or(-1),
        stderr: out.stderr,
      });
    }
    Ok(())
  }

  async fn drop_database(&self, config: &ContainerConfig, name: &str) -> Result<()> {
    let bin = self.client_binary()?;
    let js = "db.dropDatabase();";
    spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &[self.uri(config, name), "--quiet".to_string()],
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(30),
      js.as_bytes(),
    )
    .await?;
    Ok(())
  }

  async fn run_script(
    &self,
    config: &ContainerConfig,
    input: ScriptInput,
    database: Option<&str>,
  ) -> Result<()> {
    let bin = self.client_binary()?;
    let db = database.unwrap_or(&config.database);
    let bytes: Vec<u8> = match input {
      ScriptInput::File(path) => std::fs::read(path)?,
      ScriptInput::Sql(js) => js.into_bytes(),
    };
    let out = spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &[self.uri(config, db), "--quiet".to_string()],
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(60),
      &bytes,
    )
    .await?;
    if !out.success {
      return Err(Error::NonZeroExit {
        code: out.code.unwrap_or(-1),
        stderr: out.stderr,
      });
    }
    Ok(())
  }

  async fn execute_query(
    &self,
    config: &ContainerConfig,
    query: &str,
    opts: &ExecuteQueryOpts,
  ) -> Result<QueryResult> {
    let bin = self.client_binary()?;
    let db = opts.database.as_deref().unwrap_or(&config.database);
    let js = format!("printjson({query});");
    let out = spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &[self.uri(config, db), "--quiet".to_string()],
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(30),
      js.as_bytes(),
    )
    .await?;
    Ok(QueryResult {
      columns: vec!["result".to_string()],
      rows: vec![vec![out.stdout.trim().to_string()]],
      row_count: 1,
    })
  }

  async fn backup(
    &self,
    config: &ContainerConfig,
    out_path: &Path,
    opts: &BackupOpts,
  ) -> Result<BackupOutcome> {
    let dump_bin = self.profile.dump_binary.ok_or_else(|| {
      Error::Unsupported(format!("{} has no dump binary configured", self.engine))
    })?;
    let bin = resolve_binary(dump_bin).ok_or_else(|| Error::BinaryMissing {
      engine: self.engine.to_string(),
      hint: self.profile.install_hint.to_string(),
    })?;
    let db = opts.database.as_deref().unwrap_or(&config.database);
    let args = vec![
      format!("--uri={}", self.uri(config, db)),
      format!("--archive={}", out_path.to_string_lossy()),
    ];
    spindb_process::spawn(
      &bin.to_string_lossy(),
      &args,
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(300),
        ..Default::default()
      },
    )
    .await?;
    let size = std::fs::metadata(out_path)?.len();
    Ok(BackupOutcome {
      path: out_path.to_path_buf(),
      format: "archive".to_string(),
      size,
    })
  }

  async fn restore(
    &self,
    config: &ContainerConfig,
    in_path: &Path,
    opts: &RestoreOpts,
  ) -> Result<RestoreOutcome> {
    let restore_bin = self.profile.restore_binary.ok_or_else(|| {
      Error::Unsupported(format!("{} has no restore binary configured", self.engine))
    })?;
    let bin = resolve_binary(restore_bin).ok_or_else(|| Error::BinaryMissing {
      engine: self.engine.to_string(),
      hint: self.profile.install_hint.to_string(),
    })?;
    let db = opts.database.as_deref().unwrap_or(&config.database);
    let args = vec![
      format!("--uri={}", self.uri(config, db)),
      format!("--archive={}", in_path.to_string_lossy()),
      "--drop".to_string(),
    ];
    spindb_process::spawn(
      &bin.to_string_lossy(),
      &args,
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(300),
        ..Default::default()
      },
    )
    .await?;
    Ok(RestoreOutcome {
      format: "archive".to_string(),
    })
  }

  async fn dump_from_connection_string(
    &self,
    conn: &str,
    out_path: &Path,
  ) -> Result<DumpOutcome> {
    let dump_bin = self.profile.dump_binary.ok_or_else(|| {
      Error::Unsupported(format!("{} has no dump binary configured", self.engine))
    })?;
    let bin = resolve_binary(dump_bin).ok_or_else(|| Error::BinaryMissing {
      engine: self.engine.to_string(),
      hint: self.profile.install_hint.to_string(),
    })?;
    let result = spindb_process::spawn(
      &bin.to_string_lossy(),
      &[
        format!("--uri={conn}"),
        format!("--archive={}", out_path.to_string_lossy()),
      ],
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(300),
        ..Default::default()
      },
    )
    .await;
    match result {
      Ok(_) => Ok(DumpOutcome {
        file_path: out_path.to_path_buf(),
      }),
      Err(e) => Err(Error::Network(format!("dump from remote connection failed: {e}"))),
    }
  }

  async fn create_user(
    &self,
    config: &ContainerConfig,
    opts: &CreateUserOpts,
  ) -> Result<CredentialBundle> {
    spindb_validations::validate_username(&opts.username)?;
    let bin = self.client_binary()?;
    let database = opts.database.as_deref().unwrap_or(&config.database);
    let js = format!(
      "db.createUser({{user: '{}', pwd: '{}', roles: [{{role: 'readWrite', db: '{}'}}]}});",
      opts.username, opts.password.replace('\'', "\\'"), database
    );
    let out = spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &[self.uri(config, database), "--quiet".to_string()],
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(30),
      js.as_bytes(),
    )
    .await?;
    if !out.success {
      return Err(Error::NonZeroExit {
        code: out.code.unwrap_or(-1),
        stderr: out.stderr,
      });
    }
    Ok(CredentialBundle::Password(PasswordCredential {
      db_user: opts.username.clone(),
      db_password: opts.password.clone(),
      db_host: "127.0.0.1".to_string(),
      db_port: config.port.to_string(),
      db_name: database.to_string(),
      db_url: format!(
        "mongodb://{}:{}@127.0.0.1:{}/{database}",
        opts.username, opts.password, config.port
      ),
    }))
  }
}
