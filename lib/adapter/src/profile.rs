//! Per-engine static descriptors. Adapter families (`engines::postgres`,
//! `engines::mysql`, ...) are generic over this data instead of being
//! duplicated per engine; the fields here are exactly what the shared
//! start/stop/status machinery in [`crate::common`] needs plus what
//! each family's own dump/restore/query code branches on.

use spindb_types::Engine;

/// The connection-string family, per §6 of the canonical forms table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionScheme {
  Postgres,
  Mysql,
  Mongo,
  Redis,
  Http,
  Ws,
}

/// How `start` polls for readiness once the process is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
  Tcp,
  Http(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct EngineProfile {
  pub engine: Engine,
  /// The server binary, spawned detached by `start`.
  pub binary_name: &'static str,
  /// Optional separate binary used only by `init_data_dir` (e.g.
  /// `initdb` for the PG-wire family). `None` means init is just
  /// `mkdir -p`.
  pub init_binary: Option<&'static str>,
  /// CLI client used for `run_script`/`execute_query`/`create_database`.
  pub client_binary: Option<&'static str>,
  pub dump_binary: Option<&'static str>,
  pub restore_binary: Option<&'static str>,
  pub install_hint: &'static str,
  pub default_port: u16,
  pub scheme: ConnectionScheme,
  /// File extension (with leading dot) used for the per-engine backup
  /// output path, `<outDir>/<name><ext>`.
  pub backup_ext: &'static str,
  pub readiness: Readiness,
}

const POSTGRES: EngineProfile = EngineProfile {
  engine: Engine::Postgres,
  binary_name: "postgres",
  init_binary: Some("initdb"),
  client_binary: Some("psql"),
  dump_binary: Some("pg_dump"),
  restore_binary: Some("pg_restore"),
  install_hint: "install PostgreSQL (e.g. `apt install postgresql` or https://www.postgresql.org/download/)",
  default_port: 5432,
  scheme: ConnectionScheme::Postgres,
  backup_ext: ".sql",
  readiness: Readiness::Tcp,
};

const COCKROACHDB: EngineProfile = EngineProfile {
  engine: Engine::CockroachDb,
  binary_name: "cockroach",
  init_binary: None,
  client_binary: Some("cockroach"),
  dump_binary: Some("cockroach"),
  restore_binary: Some("cockroach"),
  install_hint: "install CockroachDB from https://www.cockroachlabs.com/docs/releases/",
  default_port: 26257,
  scheme: ConnectionScheme::Postgres,
  backup_ext: ".sql",
  readiness: Readiness::Tcp,
};

const MYSQL: EngineProfile = EngineProfile {
  engine: Engine::Mysql,
  binary_name: "mysqld",
  init_binary: Some("mysqld"),
  client_binary: Some("mysql"),
  dump_binary: Some("mysqldump"),
  restore_binary: Some("mysql"),
  install_hint: "install MySQL server (e.g. `apt install mysql-server`)",
  default_port: 3306,
  scheme: ConnectionScheme::Mysql,
  backup_ext: ".sql",
  readiness: Readiness::Tcp,
};

const MARIADB: EngineProfile = EngineProfile {
  engine: Engine::MariaDb,
  binary_name: "mariadbd",
  init_binary: Some("mariadb-install-db"),
  client_binary: Some("mariadb"),
  dump_binary: Some("mariadb-dump"),
  restore_binary: Some("mariadb"),
  install_hint: "install MariaDB server (e.g. `apt install mariadb-server`)",
  default_port: 3306,
  scheme: ConnectionScheme::Mysql,
  backup_ext: ".sql",
  readiness: Readiness::Tcp,
};

const REDIS: EngineProfile = EngineProfile {
  engine: Engine::Redis,
  binary_name: "redis-server",
  init_binary: None,
  client_binary: Some("redis-cli"),
  dump_binary: Some("redis-cli"),
  restore_binary: Some("redis-cli"),
  install_hint: "install Redis (e.g. `apt install redis-server`)",
  default_port: 6379,
  scheme: ConnectionScheme::Redis,
  backup_ext: ".rdb",
  readiness: Readiness::Tcp,
};

const VALKEY: EngineProfile = EngineProfile {
  engine: Engine::Valkey,
  binary_name: "valkey-server",
  init_binary: None,
  client_binary: Some("valkey-cli"),
  dump_binary: Some("valkey-cli"),
  restore_binary: Some("valkey-cli"),
  install_hint: "install Valkey from https://valkey.io/download/",
  default_port: 6379,
  scheme: ConnectionScheme::Redis,
  backup_ext: ".rdb",
  readiness: Readiness::Tcp,
};

const MONGODB: EngineProfile = EngineProfile {
  engine: Engine::MongoDb,
  binary_name: "mongod",
  init_binary: None,
  client_binary: Some("mongosh"),
  dump_binary: Some("mongodump"),
  restore_binary: Some("mongorestore"),
  install_hint: "install MongoDB from https://www.mongodb.com/try/download/community",
  default_port: 27017,
  scheme: ConnectionScheme::Mongo,
  backup_ext: ".archive",
  readiness: Readiness::Tcp,
};

const FERRETDB: EngineProfile = EngineProfile {
  engine: Engine::FerretDb,
  binary_name: "ferretdb",
  init_binary: None,
  client_binary: Some("mongosh"),
  dump_binary: Some("mongodump"),
  restore_binary: Some("mongorestore"),
  install_hint: "install FerretDB from https://www.ferretdb.com/",
  default_port: 27017,
  scheme: ConnectionScheme::Mongo,
  backup_ext: ".archive",
  readiness: Readiness::Tcp,
};

const CLICKHOUSE: EngineProfile = EngineProfile {
  engine: Engine::ClickHouse,
  binary_name: "clickhouse-server",
  init_binary: None,
  client_binary: Some("clickhouse-client"),
  dump_binary: None,
  restore_binary: None,
  install_hint: "install ClickHouse from https://clickhouse.com/docs/en/install",
  default_port: 8123,
  scheme: ConnectionScheme::Http,
  backup_ext: ".native",
  readiness: Readiness::Http("/ping"),
};

const QDRANT: EngineProfile = EngineProfile {
  engine: Engine::Qdrant,
  binary_name: "qdrant",
  init_binary: None,
  client_binary: None,
  dump_binary: None,
  restore_binary: None,
  install_hint: "install Qdrant from https://qdrant.tech/documentation/guides/installation/",
  default_port: 6333,
  scheme: ConnectionScheme::Http,
  backup_ext: ".snapshot",
  readiness: Readiness::Http("/healthz"),
};

const MEILISEARCH: EngineProfile = EngineProfile {
  engine: Engine::Meilisearch,
  binary_name: "meilisearch",
  init_binary: None,
  client_binary: None,
  dump_binary: None,
  restore_binary: None,
  install_hint: "install Meilisearch from https://www.meilisearch.com/docs/learn/getting_started/installation",
  default_port: 7700,
  scheme: ConnectionScheme::Http,
  backup_ext: ".dump",
  readiness: Readiness::Http("/health"),
};

const COUCHDB: EngineProfile = EngineProfile {
  engine: Engine::CouchDb,
  binary_name: "couchdb",
  init_binary: None,
  client_binary: None,
  dump_binary: None,
  restore_binary: None,
  install_hint: "install CouchDB from https://couchdb.apache.org/#download",
  default_port: 5984,
  scheme: ConnectionScheme::Http,
  backup_ext: ".json",
  readiness: Readiness::Http("/"),
};

const SURREALDB: EngineProfile = EngineProfile {
  engine: Engine::SurrealDb,
  binary_name: "surreal",
  init_binary: None,
  client_binary: Some("surreal"),
  dump_binary: Some("surreal"),
  restore_binary: Some("surreal"),
  install_hint: "install SurrealDB from https://surrealdb.com/install",
  default_port: 8000,
  scheme: ConnectionScheme::Ws,
  backup_ext: ".surql",
  readiness: Readiness::Http("/health"),
};

const QUESTDB: EngineProfile = EngineProfile {
  engine: Engine::QuestDb,
  binary_name: "questdb",
  init_binary: None,
  client_binary: None,
  dump_binary: None,
  restore_binary: None,
  install_hint: "install QuestDB from https://questdb.io/download/",
  default_port: 9000,
  scheme: ConnectionScheme::Http,
  backup_ext: ".csv",
  readiness: Readiness::Http("/"),
};

const TYPEDB: EngineProfile = EngineProfile {
  engine: Engine::TypeDb,
  binary_name: "typedb",
  init_binary: None,
  client_binary: Some("typedb"),
  dump_binary: None,
  restore_binary: None,
  install_hint: "install TypeDB from https://typedb.com/docs/home/install",
  default_port: 1729,
  scheme: ConnectionScheme::Http,
  backup_ext: ".typedb",
  readiness: Readiness::Tcp,
};

const TIGERBEETLE: EngineProfile = EngineProfile {
  engine: Engine::TigerBeetle,
  binary_name: "tigerbeetle",
  init_binary: Some("tigerbeetle"),
  client_binary: None,
  dump_binary: None,
  restore_binary: None,
  install_hint: "install TigerBeetle from https://docs.tigerbeetle.com/quick-start/",
  default_port: 3000,
  scheme: ConnectionScheme::Http,
  backup_ext: ".tigerbeetle",
  readiness: Readiness::Tcp,
};

const WEAVIATE: EngineProfile = EngineProfile {
  engine: Engine::Weaviate,
  binary_name: "weaviate",
  init_binary: None,
  client_binary: None,
  dump_binary: None,
  restore_binary: None,
  install_hint: "install Weaviate from https://weaviate.io/developers/weaviate/installation",
  default_port: 8080,
  scheme: ConnectionScheme::Http,
  backup_ext: ".json",
  readiness: Readiness::Http("/v1/.well-known/ready"),
};

/// Looks up the static profile for a server engine. File-embedded
/// engines (`Sqlite`, `DuckDb`) have no profile — they are handled by
/// `engines::file_embedded` directly, which needs none of this data.
pub fn profile_for(engine: Engine) -> Option<&'static EngineProfile> {
  use Engine::*;
  Some(match engine {
    Postgres => &POSTGRES,
    CockroachDb => &COCKROACHDB,
    Mysql => &MYSQL,
    MariaDb => &MARIADB,
    Redis => &REDIS,
    Valkey => &VALKEY,
    MongoDb => &MONGODB,
    FerretDb => &FERRETDB,
    ClickHouse => &CLICKHOUSE,
    Qdrant => &QDRANT,
    Meilisearch => &MEILISEARCH,
    CouchDb => &COUCHDB,
    SurrealDb => &SURREALDB,
    QuestDb => &QUESTDB,
    TypeDb => &TYPEDB,
    TigerBeetle => &TIGERBEETLE,
    Weaviate => &WEAVIATE,
    Sqlite | DuckDb => return None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use strum::IntoEnumIterator;

  #[test]
  fn every_server_engine_has_a_profile() {
    for engine in Engine::iter() {
      if engine.is_file_embedded() {
        assert!(profile_for(engine).is_none());
      } else {
        assert!(profile_for(engine).is_some(), "{engine} missing a profile");
      }
    }
  }

  #[test]
  fn profile_engine_field_matches_its_own_lookup_key() {
    for engine in Engine::iter() {
      if let Some(profile) = profile_for(engine) {
        assert_eq!(profile.engine, engine);
      }
    }
  }
}
