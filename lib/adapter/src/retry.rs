//! §4.H: wraps `adapter.start` with port-conflict recovery. Readiness
//! is the adapter's own responsibility (completed inside `start`) —
//! this wrapper only reacts to `PortInUse` and otherwise propagates
//! whatever `start` returned.

use spindb_container::ContainerManager;
use spindb_types::{ContainerConfigPatch, ContainerStatus, Engine, Error, Result};

use crate::{EngineAdapter, StartOutcome};

#[derive(Debug, Clone)]
pub struct RetryOpts {
  pub max_retries: u32,
}

impl Default for RetryOpts {
  fn default() -> Self {
    RetryOpts { max_retries: 3 }
  }
}

#[derive(Debug, Clone)]
pub struct StartWithRetryOutcome {
  pub success: bool,
  pub final_port: u16,
  pub retries_used: u32,
  pub connection_string: Option<String>,
  pub error: Option<String>,
}

/// `on_port_change(old, new)` is invoked exactly once per successful
/// reallocation, before the retried `start` call.
pub async fn start_with_retry(
  adapter: &dyn EngineAdapter,
  manager: &ContainerManager,
  name: &str,
  engine: Engine,
  opts: &RetryOpts,
  mut on_port_change: impl FnMut(u16, u16),
) -> Result<StartWithRetryOutcome> {
  let mut retries_used = 0;
  let mut current = manager
    .get_config(name, engine)?
    .ok_or_else(|| Error::NotFound(format!("container '{name}' not found")))?;

  loop {
    match adapter.start(&current).await {
      Ok(StartOutcome {
        port,
        connection_string,
      }) => {
        manager.update_config(
          name,
          engine,
          ContainerConfigPatch {
            status: Some(ContainerStatus::Running),
            port: Some(port),
            ..Default::default()
          },
        )?;
        return Ok(StartWithRetryOutcome {
          success: true,
          final_port: port,
          retries_used,
          connection_string: Some(connection_string),
          error: None,
        });
      }
      Err(Error::PortInUse(message)) => {
        if retries_used >= opts.max_retries {
          return Ok(StartWithRetryOutcome {
            success: false,
            final_port: current.port,
            retries_used,
            connection_string: None,
            error: Some(message),
          });
        }
        let old_port = current.port;
        let new_port = spindb_port::find_next_free(old_port + 1, 100).await?;
        current = manager.update_config(
          name,
          engine,
          ContainerConfigPatch {
            port: Some(new_port),
            ..Default::default()
          },
        )?;
        on_port_change(old_port, new_port);
        retries_used += 1;
      }
      Err(other) => {
        return Ok(StartWithRetryOutcome {
          success: false,
          final_port: current.port,
          retries_used,
          connection_string: None,
          error: Some(other.to_string()),
        });
      }
    }
  }
}
