//! MySQL-wire family: MySQL and MariaDB. `mariadbd` is close enough
//! to a drop-in for `mysqld` that the only real differences live in
//! `EngineProfile` (binary names, init/dump/restore tool names).

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

pub struct MysqlWireAdapter {
  engine: Engine,
  profile: &'static EngineProfile,
  layout: Layout,
}

impl MysqlWireAdapter {
  pub fn new(engine: Engine, layout: Layout) -> Self {
    let profile = profile_for(engine)
      .expect("MysqlWireAdapter constructed for a non-mysql-wire engine");
    MysqlWireAdapter {
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

  fn client_args(&self, config: &ContainerConfig, database: &str) -> Vec<String> {
    vec![
      "-h".into(),
      "127.0.0.1".into(),
      "-P".into(),
      config.port.to_string(),
      "-u".into(),
      "root".into(),
      database.into(),
    ]
  }
}

#[async_trait]
impl EngineAdapter for MysqlWireAdapter {
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
    let data_dir = common::init_plain_data_dir(&self.layout, name, self.engine)?;
    if let Some(init_binary) = self.profile.init_binary {
      let bin = resolve_binary(init_binary).ok_or_else(|| Error::BinaryMissing {
        engine: self.engine.to_string(),
        hint: self.profile.install_hint.to_string(),
      })?;
      let args = match self.engine {
        Engine::Mysql => vec![
          "--initialize-insecure".to_string(),
          format!("--datadir={}", data_dir.to_string_lossy()),
        ],
        Engine::MariaDb => vec![format!("--datadir={}", data_dir.to_string_lossy())],
        other => unreachable!("{other} is not part of the mysql-wire family"),
      };
      spindb_process::spawn(
        &bin.to_string_lossy(),
        &args,
        &spindb_process::SpawnOpts {
          timeout: Duration::from_secs(60),
          ..Default::default()
        },
      )
      .await?;
    }
    Ok(data_dir)
  }

  async fn start(&self, config: &ContainerConfig) -> Result<StartOutcome> {
    let data_dir = self.layout.data_dir(&config.name, self.engine)?;
    let args = vec![
      format!("--datadir={}", data_dir.to_string_lossy()),
      format!("--port={}", config.port),
      "--bind-address=127.0.0.1".to_string(),
      "--skip-grant-tables".to_string(),
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
    let bin = self.client_binary()?;
    let args = self.client_args(config, "");
    let sql = format!("CREATE DATABASE {name}");
    let out = spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &args,
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(30),
      sql.as_bytes(),
    )
    .await?;
    if out.success {
      Ok(())
    } else if out.stderr.contains("database exists") {
      Err(Error::AlreadyExists(format!("database '{name}' already exists")))
    } else {
      Err(Error::NonZeroExit {
        code: out.code.unwrap_or(-1),
        stderr: out.stderr,
      })
    }
  }

  async fn drop_database(&self, config: &ContainerConfig, name: &str) -> Result<()> {
    let bin = self.client_binary()?;
    let args = self.client_args(config, "");
    let sql = format!("DROP DATABASE IF EXISTS {name}");
    spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &args,
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(30),
      sql.as_bytes(),
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
    let args = self.client_args(config, db);
    let bytes: Vec<u8> = match input {
      ScriptInput::File(path) => std::fs::read(path)?,
      ScriptInput::Sql(sql) => sql.into_bytes(),
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
    opts: &ExecuteQueryOpts,
  ) -> Result<QueryResult> {
    let bin = self.client_binary()?;
    let db = opts.database.as_deref().unwrap_or(&config.database);
    let mut args = self.client_args(config, db);
    args.push("--batch".into());
    args.push("--raw".into());
    let out = spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &args,
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(30),
      query.as_bytes(),
    )
    .await?;
    Ok(parse_tsv_table(&out.stdout))
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
    let args = self.client_args(config, db);
    let out = spindb_process::spawn(
      &bin.to_string_lossy(),
      &args,
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(300),
        ..Default::default()
      },
    )
    .await?;
    std::fs::write(out_path, &out.stdout)?;
    let size = std::fs::metadata(out_path)?.len();
    Ok(BackupOutcome {
      path: out_path.to_path_buf(),
      format: "sql".to_string(),
      size,
    })
  }

  async fn restore(
    &self,
    config: &ContainerConfig,
    in_path: &Path,
    opts: &RestoreOpts,
  ) -> Result<RestoreOutcome> {
    let bin = self.client_binary()?;
    let db = opts.database.as_deref().unwrap_or(&config.database);
    let args = self.client_args(config, db);
    let sql = std::fs::read(in_path)?;
    let out = spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &args,
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(300),
      &sql,
    )
    .await?;
    if !out.success {
      return Err(Error::NonZeroExit {
        code: out.code.unwrap_or(-1),
        stderr: out.stderr,
      });
    }
    Ok(RestoreOutcome {
      format: "sql".to_string(),
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
      &[format!("--host={conn}")],
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(300),
        ..Default::default()
      },
    )
    .await;
    match result {
      Ok(out) => {
        std::fs::write(out_path, &out.stdout)?;
        Ok(DumpOutcome {
          file_path: out_path.to_path_buf(),
        })
      }
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
    let args = self.client_args(config, "");
    let sql = format!(
      "CREATE USER '{}'@'%' IDENTIFIED BY '{}'; GRANT ALL PRIVILEGES ON *.* TO '{}'@'%';",
      opts.username,
      opts.password.replace('\'', "''"),
      opts.username
    );
    spindb_command::run_command_stdin(
      &bin.to_string_lossy(),
      &args,
      None,
      spindb_command::ShellMode::Args,
      Duration::from_secs(30),
      sql.as_bytes(),
    )
    .await?;
    let database = opts.database.as_deref().unwrap_or(&config.database);
    Ok(CredentialBundle::Password(PasswordCredential {
      db_user: opts.username.clone(),
      db_password: opts.password.clone(),
      db_host: "127.0.0.1".to_string(),
      db_port: config.port.to_string(),
      db_name: database.to_string(),
      db_url: format!(
        "mysql://{}:{}@127.0.0.1:{}/{database}",
        opts.username, opts.password, config.port
      ),
    }))
  }
}

fn parse_tsv_table(stdout: &str) -> QueryResult {
  let mut lines = stdout.lines().filter(|l| !l.trim().is_empty());
  let columns: Vec<String> = lines
    .next()
    .map(|h| h.split('\t').map(|c| c.to_string()).collect())
    .unwrap_or_default();
  let rows: Vec<Vec<String>> = lines
    .map(|l| l.split('\t').map(|c| c.to_string()).collect())
    .collect();
  let row_count = rows.len();
  QueryResult {
    columns,
    rows,
    row_count,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_tab_separated_output() {
    let stdout = "id\tname\n1\talice\n";
    let result = parse_tsv_table(stdout);
    assert_eq!(result.columns, vec!["id", "name"]);
    assert_eq!(result.row_count, 1);
  }
}
