//! Redis-wire family: Redis and Valkey. `redis-cli` speaks to both
//! servers unmodified, which is also why this family has no real
//! `client_binary`/query story beyond raw command lines — there is no
//! tabular result format to parse, just a reply string per command.

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

pub struct RedisWireAdapter {
  engine: Engine,
  profile: &'static EngineProfile,
  layout: Layout,
}

impl RedisWireAdapter {
  pub fn new(engine: Engine, layout: Layout) -> Self {
    let profile = profile_for(engine)
      .expect("RedisWireAdapter constructed for a non-redis-wire engine");
    RedisWireAdapter {
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

  fn client_args(&self, config: &ContainerConfig) -> Vec<String> {
    vec![
      "-h".into(),
      "127.0.0.1".into(),
      "-p".into(),
      config.port.to_string(),
    ]
  }
}

#[async_trait]
impl EngineAdapter for RedisWireAdapter {
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
      "--port".to_string(),
      config.port.to_string(),
      "--bind".to_string(),
      "127.0.0.1".to_string(),
      "--dir".to_string(),
      data_dir.to_string_lossy().into_owned(),
      "--daemonize".to_string(),
      "no".to_string(),
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

  async fn run_script(
    &self,
    config: &ContainerConfig,
    input: ScriptInput,
    _database: Option<&str>,
  ) -> Result<()> {
    let bin = self.client_binary()?;
    let mut args = self.client_args(config);
    args.push("--pipe".into());
    let bytes: Vec<u8> = match input {
      ScriptInput::File(path) => std::fs::read(path)?,
      ScriptInput::Sql(commands) => commands.into_bytes(),
    };
    let out = spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &args,
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
    _opts: &ExecuteQueryOpts,
  ) -> Result<QueryResult> {
    let bin = self.client_binary()?;
    let mut args = self.client_args(config);
    args.extend(shlex::split(query).unwrap_or_else(|| vec![query.to_string()]));
    let out = spindb_process::spawn(
      &bin.to_string_lossy(),
      &args,
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(30),
        ..Default::default()
      },
    )
    .await?;
    let reply = out.stdout.trim().to_string();
    Ok(QueryResult {
      columns: vec!["reply".to_string()],
      rows: vec![vec![reply]],
      row_count: 1,
    })
  }

  async fn backup(
    &self,
    config: &ContainerConfig,
    out_path: &Path,
    _opts: &BackupOpts,
  ) -> Result<BackupOutcome> {
    let bin = self.client_binary()?;
    let mut args = self.client_args(config);
    args.push("SAVE".into());
    spindb_process::spawn(
      &bin.to_string_lossy(),
      &args,
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(60),
        ..Default::default()
      },
    )
    .await?;
    let data_dir = self.layout.data_dir(&config.name, self.engine)?;
    let rdb_path = data_dir.join("dump.rdb");
    std::fs::copy(&rdb_path, out_path)?;
    let size = std::fs::metadata(out_path)?.len();
    Ok(BackupOutcome {
      path: out_path.to_path_buf(),
      format: "rdb".to_string(),
      size,
    })
  }

  async fn restore(
    &self,
    config: &ContainerConfig,
    in_path: &Path,
    _opts: &RestoreOpts,
  ) -> Result<RestoreOutcome> {
    if common::status(&self.layout, config)?.running {
      return Err(Error::AlreadyRunning(
        "restore requires the container to be stopped first".to_string(),
      ));
    }
    let data_dir = self.layout.data_dir(&config.name, self.engine)?;
    let rdb_path = data_dir.join("dump.rdb");
    std::fs::copy(in_path, &rdb_path)?;
    Ok(RestoreOutcome {
      format: "rdb".to_string(),
    })
  }

  async fn dump_from_connection_string(
    &self,
    conn: &str,
    _out_path: &Path,
  ) -> Result<DumpOutcome> {
    Err(Error::Unsupported(format!(
      "{} has no remote dump tool; connect with redis-cli --uri {conn} and use --rdb instead",
      self.engine
    )))
  }

  async fn create_user(
    &self,
    config: &ContainerConfig,
    opts: &CreateUserOpts,
  ) -> Result<CredentialBundle> {
    spindb_validations::validate_username(&opts.username)?;
    let bin = self.client_binary()?;
    let mut args = self.client_args(config);
    args.extend([
      "ACL".to_string(),
      "SETUSER".to_string(),
      opts.username.clone(),
      "on".to_string(),
      format!(">{}", opts.password),
      "~*".to_string(),
      "+@all".to_string(),
    ]);
    let out = spindb_process::spawn(
      &bin.to_string_lossy(),
      &args,
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(30),
        ..Default::default()
      },
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
      db_name: String::new(),
      db_url: format!(
        "redis://{}:{}@127.0.0.1:{}/0",
        opts.username, opts.password, config.port
      ),
    }))
  }
}
