//! Shared start/stop/status/connection-string machinery used by every
//! server-engine family. File-embedded engines don't use this module
//! at all — their "server" is a no-op by contract.

use std::path::Path;
use std::time::Duration;

use spindb_paths::Layout;
use spindb_port::is_port_in_use_error;
use spindb_process::ShellMode;
use spindb_types::{ContainerConfig, Engine, Error, Result};

use crate::profile::{ConnectionScheme, EngineProfile, Readiness};
use crate::{StartOutcome, StatusOutcome, resolve_binary};

/// Engines whose storage layer memory-maps data files need extra time
/// for file handles to release after the process exits (§5,
/// "Windows-specific cautions" — applied cross-platform since the
/// race is real on POSIX too, just usually faster).
fn settle_delay(engine: Engine) -> Duration {
  match engine {
    Engine::ClickHouse | Engine::QuestDb | Engine::TigerBeetle => {
      Duration::from_secs(15)
    }
    Engine::Postgres | Engine::CockroachDb | Engine::Mysql | Engine::MariaDb => {
      Duration::from_secs(3)
    }
    _ => Duration::from_secs(1),
  }
}

fn readiness_timeout(engine: Engine) -> Duration {
  match engine {
    Engine::ClickHouse | Engine::QuestDb | Engine::TigerBeetle | Engine::TypeDb => {
      Duration::from_secs(90)
    }
    _ => Duration::from_secs(30),
  }
}

/// Spawns `profile.binary_name` detached with `args`, writes the PID
/// file, and polls readiness per `profile.readiness`. On failure to
/// become ready, tails the log for a port-in-use message before
/// giving up with `NotReady`.
pub(crate) async fn start(
  profile: &EngineProfile,
  layout: &Layout,
  config: &ContainerConfig,
  args: Vec<String>,
) -> Result<StartOutcome> {
  let engine = profile.engine;
  let name = &config.name;

  if !spindb_port::is_port_available(config.port).await? {
    return Err(Error::PortInUse(format!(
      "port {} is already in use",
      config.port
    )));
  }

  let bin = resolve_binary(profile.binary_name).ok_or_else(|| {
    Error::BinaryMissing {
      engine: engine.to_string(),
      hint: profile.install_hint.to_string(),
    }
  })?;

  let data_dir = layout.data_dir(name, engine)?;
  let log_path = layout.log_path(name, engine)?;
  let pid_path = layout.pid_path(name, engine)?;
  std::fs::create_dir_all(layout.log_dir(name, engine)?)?;

  let child = spindb_process::spawn_detached(
    &bin.to_string_lossy(),
    &args,
    Some(&data_dir),
    ShellMode::Args,
    &log_path,
  )?;
  let pid = child
    .id()
    .ok_or_else(|| Error::SpawnError("spawned child has no pid".into()))?;
  spindb_process::write_pid_file(&pid_path, pid)?;
  drop(child);

  let ready = poll_ready(profile, config.port).await;
  if !ready {
    let tail = std::fs::read_to_string(&log_path).unwrap_or_default();
    let _ = spindb_process::remove_pid_file(&pid_path);
    if is_port_in_use_error(&tail) {
      return Err(Error::PortInUse(format!(
        "{engine} failed to bind port {}",
        config.port
      )));
    }
    return Err(Error::NotReady(format!(
      "{engine} did not become ready within {:?}",
      readiness_timeout(engine)
    )));
  }

  Ok(StartOutcome {
    port: config.port,
    connection_string: connection_string(profile, config, None),
  })
}

async fn poll_ready(profile: &EngineProfile, port: u16) -> bool {
  let interval = Duration::from_millis(300);
  let timeout = readiness_timeout(profile.engine);
  match profile.readiness {
    Readiness::Tcp => {
      spindb_process::poll_readiness(
        || async move {
          tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .is_ok()
        },
        interval,
        timeout,
      )
      .await
    }
    Readiness::Http(path) => {
      let url = format!("http://127.0.0.1:{port}{path}");
      spindb_process::poll_readiness(
        || {
          let url = url.clone();
          async move {
            reqwest::get(&url)
              .await
              .map(|r| r.status().is_success())
              .unwrap_or(false)
          }
        },
        interval,
        timeout,
      )
      .await
    }
  }
}

/// Graceful-then-idempotent stop: `SIGTERM`, wait, remove the PID
/// file. A missing or already-dead PID file is success, not an error
/// — `stop` on an already-stopped container never raises.
pub(crate) async fn stop(
  profile: &EngineProfile,
  layout: &Layout,
  config: &ContainerConfig,
) -> Result<()> {
  let pid_path = layout.pid_path(&config.name, profile.engine)?;
  let Some(pid) = spindb_process::read_pid_file(&pid_path) else {
    return Ok(());
  };
  if !spindb_process::pid_is_alive(pid) {
    return spindb_process::remove_pid_file(&pid_path);
  }
  spindb_process::terminate(pid)?;
  spindb_process::wait_stopped(
    &pid_path,
    Duration::from_secs(30),
    settle_delay(profile.engine),
  )
  .await;
  spindb_process::remove_pid_file(&pid_path)
}

pub(crate) fn status(
  layout: &Layout,
  config: &ContainerConfig,
) -> Result<StatusOutcome> {
  let pid_path = layout.pid_path(&config.name, config.engine)?;
  let running = spindb_process::is_running(&pid_path);
  Ok(StatusOutcome {
    running,
    message: if running {
      "running".to_string()
    } else {
      "stopped".to_string()
    },
  })
}

pub(crate) fn connection_string(
  profile: &EngineProfile,
  config: &ContainerConfig,
  database: Option<&str>,
) -> String {
  let db = database.unwrap_or(&config.database);
  match profile.scheme {
    ConnectionScheme::Postgres => {
      format!("postgresql://admin@127.0.0.1:{}/{db}", config.port)
    }
    ConnectionScheme::Mysql => {
      format!("mysql://admin@127.0.0.1:{}/{db}", config.port)
    }
    ConnectionScheme::Mongo => format!("mongodb://127.0.0.1:{}/{db}", config.port),
    ConnectionScheme::Redis => format!("redis://127.0.0.1:{}/0", config.port),
    ConnectionScheme::Http => format!("http://127.0.0.1:{}", config.port),
    ConnectionScheme::Ws => format!("ws://127.0.0.1:{}/rpc", config.port),
  }
}

/// `mkdir -p` the data directory, refusing a re-init of a directory
/// that already has contents. Shared by every family that has no
/// separate `init_binary` step of its own.
pub(crate) fn init_plain_data_dir(
  layout: &Layout,
  name: &str,
  engine: Engine,
) -> Result<std::path::PathBuf> {
  let data_dir = layout.data_dir(name, engine)?;
  if data_dir.exists()
    && std::fs::read_dir(&data_dir)?.next().is_some()
  {
    return Err(Error::AlreadyExists(format!(
      "data directory for '{name}' is already initialized"
    )));
  }
  std::fs::create_dir_all(&data_dir)?;
  Ok(data_dir)
}

/// Reads a small prefix of `path` and classifies it by magic
/// bytes/extension. Generic across engines since most of this
/// system's backup formats are either SQL text or a small family of
/// recognizable binary containers.
pub(crate) fn sniff_backup_format(
  path: &Path,
) -> Result<crate::DetectedFormat> {
  let mut buf = [0u8; 16];
  let n = {
    use std::io::Read;
    let mut f = std::fs::File::open(path)?;
    f.read(&mut buf)?
  };
  let prefix = &buf[..n];

  if prefix.starts_with(b"PGDMP") {
    return Ok(crate::DetectedFormat {
      format: "pg_custom".to_string(),
      description: "PostgreSQL custom-format dump".to_string(),
      restore_command: "pg_restore".to_string(),
    });
  }
  if prefix.starts_with(b"REDIS") {
    return Ok(crate::DetectedFormat {
      format: "rdb".to_string(),
      description: "Redis RDB snapshot".to_string(),
      restore_command: "redis-server --dbfilename".to_string(),
    });
  }
  if prefix.starts_with(b"SQLite format 3\0") {
    return Ok(crate::DetectedFormat {
      format: "sqlite".to_string(),
      description: "SQLite database file".to_string(),
      restore_command: "cp".to_string(),
    });
  }
  let looks_textual = prefix.iter().all(|b| b.is_ascii() && *b != 0);
  if looks_textual {
    return Ok(crate::DetectedFormat {
      format: "sql".to_string(),
      description: "plain-text SQL script".to_string(),
      restore_command: "psql -f".to_string(),
    });
  }
  Ok(crate::DetectedFormat {
    format: "binary".to_string(),
    description: "unrecognized binary artifact".to_string(),
    restore_command: String::new(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sniffs_sql_text_by_default() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("dump.sql");
    std::fs::write(&path, b"CREATE TABLE t (id int);").unwrap();
    assert_eq!(sniff_backup_format(&path).unwrap().format, "sql");
  }

  #[test]
  fn sniffs_pg_custom_by_magic_bytes() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("dump.pgc");
    std::fs::write(&path, b"PGDMP0000").unwrap();
    assert_eq!(sniff_backup_format(&path).unwrap().format, "pg_custom");
  }
}
