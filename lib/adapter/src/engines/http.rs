//! HTTP-surface family: every engine whose primary interface is a
//! REST/JSON API rather than a SQL wire protocol — ClickHouse,
//! Qdrant, Meilisearch, CouchDB, SurrealDB, QuestDB, TypeDB,
//! TigerBeetle, Weaviate. The shared plumbing (spawn/stop/readiness)
//! is identical across all nine; what differs is the handful of
//! REST endpoints each one exposes for schema and data management,
//! so those stay behind per-engine `match` arms instead of a second
//! layer of structs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use spindb_paths::Layout;
use spindb_types::{ContainerConfig, Engine, Error, Result};

use crate::profile::{EngineProfile, profile_for};
use crate::{
  BackupOpts, BackupOutcome, EngineAdapter, ExecuteQueryOpts, InitOpts,
  QueryResult, RestoreOpts, RestoreOutcome, ScriptInput, StartOutcome,
  StatusOutcome, common, resolve_binary,
};

pub struct HttpAdapter {
  engine: Engine,
  profile: &'static EngineProfile,
  layout: Layout,
  http: reqwest::Client,
}

impl HttpAdapter {
  pub fn new(engine: Engine, layout: Layout) -> Self {
    let profile = profile_for(engine)
      .expect("HttpAdapter constructed for a non-http-surface engine");
    HttpAdapter {
      engine,
      profile,
      layout,
      http: reqwest::Client::new(),
    }
  }

  fn base_url(&self, config: &ContainerConfig) -> String {
    format!("http://127.0.0.1:{}", config.port)
  }

  fn start_args(&self, config: &ContainerConfig, data_dir: &Path) -> Vec<String> {
    let port = config.port.to_string();
    let data_dir = data_dir.to_string_lossy().into_owned();
    match self.engine {
      Engine::ClickHouse => vec![
        "--".to_string(),
        format!("--http_port={port}"),
        format!("--path={data_dir}"),
      ],
      Engine::Qdrant => vec![
        format!("--uri=http://127.0.0.1:{port}"),
        format!("--storage-dir={data_dir}"),
      ],
      Engine::Meilisearch => vec![
        "--http-addr".to_string(),
        format!("127.0.0.1:{port}"),
        "--db-path".to_string(),
        data_dir,
      ],
      Engine::CouchDb => vec![],
      Engine::SurrealDb => vec![
        "start".to_string(),
        "--bind".to_string(),
        format!("127.0.0.1:{port}"),
        format!("file:{data_dir}"),
      ],
      Engine::QuestDb => vec!["-d".to_string(), data_dir, "-n".to_string()],
      Engine::TypeDb => vec![
        "server".to_string(),
        "--data".to_string(),
        data_dir,
        "--port".to_string(),
        port,
      ],
      Engine::TigerBeetle => vec![
        "start".to_string(),
        format!("--addresses=127.0.0.1:{port}"),
        format!("{data_dir}/0_0.tigerbeetle"),
      ],
      Engine::Weaviate => vec![
        "--host".to_string(),
        "127.0.0.1".to_string(),
        "--port".to_string(),
        port,
        "--scheme".to_string(),
        "http".to_string(),
      ],
      other => unreachable!("{other} is not part of the http-surface family"),
    }
  }
}

#[async_trait]
impl EngineAdapter for HttpAdapter {
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
    if self.engine == Engine::TigerBeetle {
      if let Some(init_binary) = self.profile.init_binary {
        let bin = resolve_binary(init_binary).ok_or_else(|| Error::BinaryMissing {
          engine: self.engine.to_string(),
          hint: self.profile.install_hint.to_string(),
        })?;
        let args = vec![
          "format".to_string(),
          "--cluster=0".to_string(),
          "--replica=0".to_string(),
          "--replica-count=1".to_string(),
          format!("{}/0_0.tigerbeetle", data_dir.to_string_lossy()),
        ];
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
    }
    Ok(data_dir)
  }

  async fn start(&self, config: &ContainerConfig) -> Result<StartOutcome> {
    let data_dir = self.layout.data_dir(&config.name, self.engine)?;
    let args = self.start_args(config, &data_dir);
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
    let base = self.base_url(config);
    let response = match self.engine {
      Engine::ClickHouse => {
        self
          .http
          .post(&base)
          .body(format!("CREATE DATABASE IF NOT EXISTS {name}"))
          .send()
          .await
      }
      Engine::CouchDb => self.http.put(format!("{base}/{name}")).send().await,
      Engine::Qdrant => {
        self
          .http
          .put(format!("{base}/collections/{name}"))
          .json(&serde_json::json!({"vectors": {"size": 4, "distance": "Cosine"}}))
          .send()
          .await
      }
      Engine::Meilisearch => {
        self
          .http
          .post(format!("{base}/indexes"))
          .json(&serde_json::json!({"uid": name}))
          .send()
          .await
      }
      Engine::Weaviate => {
        self
          .http
          .post(format!("{base}/v1/schema"))
          .json(&serde_json::json!({"class": name}))
          .send()
          .await
      }
      Engine::SurrealDb => {
        self
          .http
          .post(format!("{base}/sql"))
          .body(format!("DEFINE DATABASE {name};"))
          .send()
          .await
      }
      _ => return Err(Error::Unsupported(format!(
        "{} has no create_database equivalent",
        self.engine
      ))),
    };
    match response {
      Ok(r) if r.status().is_success() => Ok(()),
      Ok(r) if r.status().as_u16() == 412 || r.status().as_u16() == 409 => {
        Err(Error::AlreadyExists(format!("'{name}' already exists")))
      }
      Ok(r) => Err(Error::Network(format!(
        "create_database failed with status {}",
        r.status()
      ))),
      Err(e) => Err(Error::Network(e.to_string())),
    }
  }

  async fn drop_database(&self, config: &ContainerConfig, name: &str) -> Result<()> {
    let base = self.base_url(config);
    let response = match self.engine {
      Engine::ClickHouse => {
        self
          .http
          .post(&base)
          .body(format!("DROP DATABASE IF EXISTS {name}"))
          .send()
          .await
      }
      Engine::CouchDb => self.http.delete(format!("{base}/{name}")).send().await,
      Engine::Qdrant => {
        self
          .http
          .delete(format!("{base}/collections/{name}"))
          .send()
          .await
      }
      Engine::Meilisearch => {
        self
          .http
          .delete(format!("{base}/indexes/{name}"))
          .send()
          .await
      }
      Engine::Weaviate => {
        self
          .http
          .delete(format!("{base}/v1/schema/{name}"))
          .send()
          .await
      }
      Engine::SurrealDb => {
        self
          .http
          .post(format!("{base}/sql"))
          .body(format!("REMOVE DATABASE {name};"))
          .send()
          .await
      }
      _ => {
        return Err(Error::Unsupported(format!(
          "{} has no drop_database equivalent",
          self.engine
        )));
      }
    };
    match response {
      Ok(_) => Ok(()),
      Err(e) => Err(Error::Network(e.to_string())),
    }
  }

  async fn run_script(
    &self,
    config: &ContainerConfig,
    input: ScriptInput,
    _database: Option<&str>,
  ) -> Result<()> {
    let body: String = match input {
      ScriptInput::File(path) => std::fs::read_to_string(path)?,
      ScriptInput::Sql(statements) => statements,
    };
    let base = self.base_url(config);
    let response = match self.engine {
      Engine::ClickHouse => self.http.post(&base).body(body).send().await,
      Engine::SurrealDb => self.http.post(format!("{base}/sql")).body(body).send().await,
      Engine::QuestDb => {
        self
          .http
          .get(format!("{base}/exec"))
          .query(&[("query", body.as_str())])
          .send()
          .await
      }
      _ => {
        return Err(Error::Unsupported(format!(
          "{} has no statement-script interface",
          self.engine
        )));
      }
    };
    match response {
      Ok(r) if r.status().is_success() => Ok(()),
      Ok(r) => Err(Error::Network(format!("script failed with status {}", r.status()))),
      Err(e) => Err(Error::Network(e.to_string())),
    }
  }

  async fn execute_query(
    &self,
    config: &ContainerConfig,
    query: &str,
    _opts: &ExecuteQueryOpts,
  ) -> Result<QueryResult> {
    let base = self.base_url(config);
    let text = match self.engine {
      Engine::ClickHouse => {
        self
          .http
          .post(&base)
          .body(format!("{query} FORMAT TSVWithNames"))
          .send()
          .await
          .map_err(|e| Error::Network(e.to_string()))?
          .text()
          .await
          .map_err(|e| Error::Network(e.to_string()))?
      }
      Engine::SurrealDb => {
        self
          .http
          .post(format!("{base}/sql"))
          .body(query.to_string())
          .send()
          .await
          .map_err(|e| Error::Network(e.to_string()))?
          .text()
          .await
          .map_err(|e| Error::Network(e.to_string()))?
      }
      Engine::QuestDb => {
        self
          .http
          .get(format!("{base}/exec"))
          .query(&[("query", query)])
          .send()
          .await
          .map_err(|e| Error::Network(e.to_string()))?
          .text()
          .await
          .map_err(|e| Error::Network(e.to_string()))?
      }
      _ => {
        return Err(Error::Unsupported(format!(
          "{} has no tabular query interface",
          self.engine
        )));
      }
    };
    if self.engine == Engine::ClickHouse {
      return Ok(parse_tsv_table(&text));
    }
    Ok(QueryResult {
      columns: vec!["result".to_string()],
      rows: vec![vec![text]],
      row_count: 1,
    })
  }

  async fn backup(
    &self,
    config: &ContainerConfig,
    out_path: &Path,
    _opts: &BackupOpts,
  ) -> Result<BackupOutcome> {
    let base = self.base_url(config);
    let body = match self.engine {
      Engine::SurrealDb => self
        .http
        .get(format!("{base}/export"))
        .send()
        .await
        .map_err(|e| Error::Network(e.to_string()))?
        .bytes()
        .await
        .map_err(|e| Error::Network(e.to_string()))?,
      Engine::CouchDb => self
        .http
        .get(format!("{base}/{}/_all_docs?include_docs=true", config.database))
        .send()
        .await
        .map_err(|e| Error::Network(e.to_string()))?
        .bytes()
        .await
        .map_err(|e| Error::Network(e.to_string()))?,
      _ => {
        return Err(Error::Unsupported(format!(
          "{} has no generic HTTP backup endpoint",
          self.engine
        )));
      }
    };
    std::fs::write(out_path, &body)?;
    let size = std::fs::metadata(out_path)?.len();
    Ok(BackupOutcome {
      path: out_path.to_path_buf(),
      format: self.profile.backup_ext.trim_start_matches('.').to_string(),
      size,
    })
  }

  async fn restore(
    &self,
    config: &ContainerConfig,
    in_path: &Path,
    _opts: &RestoreOpts,
  ) -> Result<RestoreOutcome> {
    let base = self.base_url(config);
    let body = std::fs::read(in_path)?;
    match self.engine {
      Engine::SurrealDb => {
        self
          .http
          .post(format!("{base}/import"))
          .body(body)
          .send()
          .await
          .map_err(|e| Error::Network(e.to_string()))?;
      }
      Engine::CouchDb => {
        self
          .http
          .post(format!("{base}/{}/_bulk_docs", config.database))
          .header("content-type", "application/json")
          .body(body)
          .send()
          .await
          .map_err(|e| Error::Network(e.to_string()))?;
      }
      _ => {
        return Err(Error::Unsupported(format!(
          "{} has no generic HTTP restore endpoint",
          self.engine
        )));
      }
    }
    Ok(RestoreOutcome {
      format: self.profile.backup_ext.trim_start_matches('.').to_string(),
    })
  }
}

fn parse_tsv_table(body: &str) -> QueryResult {
  let mut lines = body.lines().filter(|l| !l.is_empty());
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
  fn parses_clickhouse_tsv_with_header() {
    let body = "id\tname\n1\tfoo\n2\tbar\n";
    let result = parse_tsv_table(body);
    assert_eq!(result.columns, vec!["id", "name"]);
    assert_eq!(result.row_count, 2);
  }
}
