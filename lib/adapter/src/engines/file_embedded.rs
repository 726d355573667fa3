//! File-embedded family: SQLite and DuckDB. There is no server
//! process, so `start`/`stop`/`create_database` are no-ops,
//! `status.running` reflects "file exists", and `init_data_dir`
//! creates the file itself (not a directory) and registers it in the
//! parallel [`spindb_embedded::EmbeddedFileRegistry`] instead of the
//! server-engine catalogue.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use spindb_embedded::EmbeddedFileRegistry;
use spindb_paths::Layout;
use spindb_types::{ContainerConfig, Engine, Error, Result};

use crate::{
  BackupOpts, BackupOutcome, EngineAdapter, ExecuteQueryOpts, InitOpts,
  QueryResult, RestoreOpts, RestoreOutcome, StartOutcome, StatusOutcome,
  resolve_binary,
};

fn client_binary_name(engine: Engine) -> &'static str {
  match engine {
    Engine::Sqlite => "sqlite3",
    Engine::DuckDb => "duckdb",
    other => unreachable!("{other} is not a file-embedded engine"),
  }
}

fn install_hint(engine: Engine) -> &'static str {
  match engine {
    Engine::Sqlite => "install SQLite (e.g. `apt install sqlite3`)",
    Engine::DuckDb => "install DuckDB from https://duckdb.org/docs/installation/",
    other => unreachable!("{other} is not a file-embedded engine"),
  }
}

pub struct FileEmbeddedAdapter {
  engine: Engine,
  layout: Layout,
}

impl FileEmbeddedAdapter {
  pub fn new(engine: Engine, layout: Layout) -> Self {
    FileEmbeddedAdapter { engine, layout }
  }

  fn registry(&self) -> Result<EmbeddedFileRegistry> {
    EmbeddedFileRegistry::open(self.layout.clone(), self.engine)
  }
}

#[async_trait]
impl EngineAdapter for FileEmbeddedAdapter {
  fn engine(&self) -> Engine {
    self.engine
  }

  fn install_hint(&self) -> &str {
    install_hint(self.engine)
  }

  async fn ensure_binaries(&self, _version: &str) -> Result<PathBuf> {
    resolve_binary(client_binary_name(self.engine)).ok_or_else(|| Error::BinaryMissing {
      engine: self.engine.to_string(),
      hint: install_hint(self.engine).to_string(),
    })
  }

  fn verify_binary(&self) -> bool {
    resolve_binary(client_binary_name(self.engine)).is_some()
  }

  async fn init_data_dir(
    &self,
    name: &str,
    _version: &str,
    opts: &InitOpts,
  ) -> Result<PathBuf> {
    let raw_path = opts.get("path").ok_or_else(|| {
      Error::InvalidInput("file-embedded engines require an explicit 'path' option".to_string())
    })?;
    let path = PathBuf::from(raw_path);
    if path.exists() {
      return Err(Error::AlreadyExists(format!(
        "'{}' already exists",
        path.display()
      )));
    }
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::File::create(&path)?;
    self.registry()?.add(EmbeddedFileRegistry::new_entry(
      name,
      path.to_string_lossy().into_owned(),
    ))?;
    Ok(path)
  }

  async fn start(&self, config: &ContainerConfig) -> Result<StartOutcome> {
    Ok(StartOutcome {
      port: 0,
      connection_string: self.get_connection_string(config, None),
    })
  }

  async fn stop(&self, _config: &ContainerConfig) -> Result<()> {
    Ok(())
  }

  async fn status(&self, config: &ContainerConfig) -> Result<StatusOutcome> {
    let running = Path::new(&config.database).exists();
    Ok(StatusOutcome {
      running,
      message: if running {
        "file present".to_string()
      } else {
        "missing".to_string()
      },
    })
  }

  fn get_connection_string(
    &self,
    config: &ContainerConfig,
    _database: Option<&str>,
  ) -> String {
    let scheme = match self.engine {
      Engine::Sqlite => "sqlite",
      Engine::DuckDb => "duckdb",
      other => unreachable!("{other} is not a file-embedded engine"),
    };
    format!("{scheme}:///{}", config.database)
  }

  async fn create_database(&self, _config: &ContainerConfig, _name: &str) -> Result<()> {
    Ok(())
  }

  async fn drop_database(&self, config: &ContainerConfig, name: &str) -> Result<()> {
    let path = Path::new(&config.database);
    if path.exists() {
      std::fs::remove_file(path)?;
    }
    let registry = self.registry()?;
    if registry.get(name)?.is_some() {
      registry.remove(name)?;
    }
    Ok(())
  }

  async fn execute_query(
    &self,
    config: &ContainerConfig,
    query: &str,
    _opts: &ExecuteQueryOpts,
  ) -> Result<QueryResult> {
    let bin = resolve_binary(client_binary_name(self.engine)).ok_or_else(|| {
      Error::BinaryMissing {
        engine: self.engine.to_string(),
        hint: install_hint(self.engine).to_string(),
      }
    })?;
    let args = match self.engine {
      Engine::Sqlite => vec![
        "-header".to_string(),
        "-separator".to_string(),
        "|".to_string(),
        config.database.clone(),
        query.to_string(),
      ],
      Engine::DuckDb => vec![
        config.database.clone(),
        "-separator".to_string(),
        "|".to_string(),
        "-c".to_string(),
        query.to_string(),
      ],
      other => unreachable!("{other} is not a file-embedded engine"),
    };
    let out = spindb_process::spawn(
      &bin.to_string_lossy(),
      &args,
      &spindb_process::SpawnOpts {
        timeout: Duration::from_secs(30),
        ..Default::default()
      },
    )
    .await?;
    Ok(parse_pipe_table(&out.stdout))
  }

  async fn backup(
    &self,
    config: &ContainerConfig,
    out_path: &Path,
    _opts: &BackupOpts,
  ) -> Result<BackupOutcome> {
    std::fs::copy(&config.database, out_path)?;
    let size = std::fs::metadata(out_path)?.len();
    let format = match self.engine {
      Engine::Sqlite => "sqlite",
      Engine::DuckDb => "duckdb",
      other => unreachable!("{other} is not a file-embedded engine"),
    };
    Ok(BackupOutcome {
      path: out_path.to_path_buf(),
      format: format.to_string(),
      size,
    })
  }

  async fn restore(
    &self,
    config: &ContainerConfig,
    in_path: &Path,
    _opts: &RestoreOpts,
  ) -> Result<RestoreOutcome> {
    std::fs::copy(in_path, &config.database)?;
    let format = match self.engine {
      Engine::Sqlite => "sqlite",
      Engine::DuckDb => "duckdb",
      other => unreachable!("{other} is not a file-embedded engine"),
    };
    Ok(RestoreOutcome {
      format: format.to_string(),
    })
  }
}

fn parse_pipe_table(stdout: &str) -> QueryResult {
  let mut lines = stdout.lines().filter(|l| !l.is_empty());
  let columns: Vec<String> = lines
    .next()
    .map(|h| h.split('|').map(|c| c.to_string()).collect())
    .unwrap_or_default();
  let rows: Vec<Vec<String>> = lines
    .map(|l| l.split('|').map(|c| c.to_string()).collect())
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
  fn parses_pipe_delimited_output() {
    let stdout = "id|name\n1|alice\n";
    let result = parse_pipe_table(stdout);
    assert_eq!(result.columns, vec!["id", "name"]);
    assert_eq!(result.row_count, 1);
  }

  #[tokio::test]
  async fn start_is_a_no_op_returning_port_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    let adapter = FileEmbeddedAdapter::new(Engine::Sqlite, layout);
    let config = ContainerConfig {
      name: "x".into(),
      engine: Engine::Sqlite,
      version: "3".into(),
      port: 0,
      database: tmp.path().join("x.sqlite").to_string_lossy().into_owned(),
      databases: vec![],
      status: spindb_types::ContainerStatus::Created,
      created: "now".into(),
      modified: "now".into(),
      cloned_from: None,
      remote: None,
    };
    let outcome = adapter.start(&config).await.unwrap();
    assert_eq!(outcome.port, 0);
  }
}
