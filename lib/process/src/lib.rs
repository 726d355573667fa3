//! Engine-agnostic primitives the adapters build on: single-shot
//! spawn, detached long-lived spawn, readiness polling, PID-file
//! liveness checks, and stop-and-wait. The supervisor uses OS
//! processes, not in-process threads, for parallelism; every
//! blocking primitive here accepts a timeout.

use std::{
  future::Future,
  path::Path,
  process::Stdio,
  time::Duration,
};

use spindb_types::{Error, Result};
use tokio::process::Child;

pub use spindb_command::ShellMode;

/// Options for a single-shot spawn (`§4.C spawn`). Defaults match
/// the "short commands" bucket: 30s timeout, no shell wrapping.
#[derive(Debug, Clone)]
pub struct SpawnOpts {
  pub cwd: Option<std::path::PathBuf>,
  pub timeout: Duration,
  pub mode: ShellMode,
}

impl Default for SpawnOpts {
  fn default() -> Self {
    SpawnOpts {
      cwd: None,
      timeout: Duration::from_secs(30),
      mode: ShellMode::Args,
    }
  }
}

/// Single-shot invocation: capture stdout/stderr, return a result
/// containing both and the exit code. A non-zero exit is surfaced as
/// `Error::NonZeroExit`, not folded into `Ok`, so callers that only
/// want to react to failure don't have to inspect `success` by hand.
pub async fn spawn(
  bin: &str,
  args: &[String],
  opts: &SpawnOpts,
) -> Result<spindb_command::CommandOutput> {
  let output = spindb_command::run_command(
    bin,
    args,
    opts.cwd.as_deref(),
    opts.mode,
    opts.timeout,
  )
  .await?;
  if !output.success {
    return Err(Error::NonZeroExit {
      code: output.code.unwrap_or(-1),
      stderr: output.stderr,
    });
  }
  Ok(output)
}

/// Launches a long-lived server and returns as soon as the child is
/// launched. Stdout/stderr are redirected to `log_path` (opened in
/// append mode) so the server's own log survives after this process
/// exits; the child is not killed when the handle is dropped.
pub fn spawn_detached(
  bin: &str,
  args: &[String],
  cwd: Option<&Path>,
  mode: ShellMode,
  log_path: &Path,
) -> Result<Child> {
  let stdout = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(log_path)?;
  let stderr = stdout.try_clone()?;
  spindb_command::spawn_detached(
    bin,
    args,
    cwd,
    mode,
    Stdio::from(stdout),
    Stdio::from(stderr),
  )
}

/// Repeatedly invokes `probe` until it returns `true` or `timeout`
/// fires. Ordering is strictly sequential: the next probe is only
/// issued after the previous one resolves and the poll interval has
/// elapsed.
pub async fn poll_readiness<F, Fut>(
  mut probe: F,
  interval: Duration,
  timeout: Duration,
) -> bool
where
  F: FnMut() -> Fut,
  Fut: Future<Output = bool>,
{
  let deadline = tokio::time::Instant::now() + timeout;
  loop {
    if probe().await {
      return true;
    }
    if tokio::time::Instant::now() >= deadline {
      return false;
    }
    tokio::time::sleep(interval.min(
      deadline.saturating_duration_since(tokio::time::Instant::now()),
    ))
    .await;
  }
}

/// Writes the PID record: the OS process identifier on the first
/// line.
pub fn write_pid_file(path: &Path, pid: u32) -> Result<()> {
  std::fs::write(path, format!("{pid}\n"))?;
  Ok(())
}

/// Reads the recorded PID, if the file exists and its first line
/// parses as an integer.
pub fn read_pid_file(path: &Path) -> Option<u32> {
  let contents = std::fs::read_to_string(path).ok()?;
  contents.lines().next()?.trim().parse().ok()
}

pub fn remove_pid_file(path: &Path) -> Result<()> {
  match std::fs::remove_file(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e.into()),
  }
}

/// Tests whether `pid` is a reachable process, without sending a
/// real signal (POSIX) or terminating it (Windows).
#[cfg(unix)]
pub fn pid_is_alive(pid: u32) -> bool {
  nix::sys::signal::kill(
    nix::unistd::Pid::from_raw(pid as i32),
    None,
  )
  .is_ok()
}

#[cfg(windows)]
pub fn pid_is_alive(pid: u32) -> bool {
  let mut system = sysinfo::System::new();
  system.refresh_processes(
    sysinfo::ProcessesToUpdate::Some(&[sysinfo::Pid::from_u32(pid)]),
    true,
  );
  system.process(sysinfo::Pid::from_u32(pid)).is_some()
}

/// Sends a graceful termination request to `pid` (`SIGTERM` on POSIX;
/// the closest analog via `sysinfo` on Windows, which has no
/// graceful/forceful distinction). Does not wait for exit — pair with
/// [`wait_stopped`].
#[cfg(unix)]
pub fn terminate(pid: u32) -> Result<()> {
  nix::sys::signal::kill(
    nix::unistd::Pid::from_raw(pid as i32),
    nix::sys::signal::Signal::SIGTERM,
  )
  .map_err(|e| Error::SpawnError(format!("failed to signal pid {pid}: {e}")))
}

#[cfg(windows)]
pub fn terminate(pid: u32) -> Result<()> {
  let mut system = sysinfo::System::new();
  system.refresh_processes(
    sysinfo::ProcessesToUpdate::Some(&[sysinfo::Pid::from_u32(pid)]),
    true,
  );
  match system.process(sysinfo::Pid::from_u32(pid)) {
    Some(process) => {
      process.kill();
      Ok(())
    }
    None => Ok(()),
  }
}

/// The canonical liveness check used by every caller: reads the PID
/// file; if present, tests whether the recorded PID is a reachable
/// process. Returns `false` on any failure (missing file, unparsable
/// PID, dead process) rather than erroring — liveness is a yes/no
/// question, not a fallible one.
pub fn is_running(pid_path: &Path) -> bool {
  match read_pid_file(pid_path) {
    Some(pid) => pid_is_alive(pid),
    None => false,
  }
}

/// Polls [`is_running`] until it returns `false` or `timeout`
/// elapses. Applies `settle_delay` afterwards — engines whose
/// storage layer memory-maps data files release file handles
/// asynchronously, so a caller that immediately deletes the data
/// directory can otherwise race a still-closing mmap.
pub async fn wait_stopped(
  pid_path: &Path,
  timeout: Duration,
  settle_delay: Duration,
) -> bool {
  let pid_path = pid_path.to_path_buf();
  let stopped = poll_readiness(
    || {
      let pid_path = pid_path.clone();
      async move { !is_running(&pid_path) }
    },
    Duration::from_millis(200),
    timeout,
  )
  .await;
  if stopped && !settle_delay.is_zero() {
    tokio::time::sleep(settle_delay).await;
  }
  stopped
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn spawn_surfaces_non_zero_exit() {
    let err = spawn(
      "sh",
      &["-c".to_string(), "exit 3".to_string()],
      &SpawnOpts::default(),
    )
    .await;
    assert!(matches!(
      err,
      Err(Error::NonZeroExit { code: 3, .. })
    ));
  }

  #[tokio::test]
  async fn poll_readiness_returns_true_as_soon_as_probe_succeeds() {
    let mut calls = 0;
    let ready = poll_readiness(
      || {
        calls += 1;
        let ready_now = calls >= 3;
        async move { ready_now }
      },
      Duration::from_millis(10),
      Duration::from_secs(1),
    )
    .await;
    assert!(ready);
    assert_eq!(calls, 3);
  }

  #[tokio::test]
  async fn poll_readiness_times_out_if_probe_never_succeeds() {
    let ready = poll_readiness(
      || async { false },
      Duration::from_millis(5),
      Duration::from_millis(50),
    )
    .await;
    assert!(!ready);
  }

  #[test]
  fn current_process_is_alive() {
    let pid = std::process::id();
    assert!(pid_is_alive(pid));
  }

  #[test]
  fn is_running_false_without_pid_file() {
    let tmp = tempfile::tempdir().unwrap();
    let pid_path = tmp.path().join("x.pid");
    assert!(!is_running(&pid_path));
  }

  #[test]
  fn is_running_true_for_own_pid() {
    let tmp = tempfile::tempdir().unwrap();
    let pid_path = tmp.path().join("x.pid");
    write_pid_file(&pid_path, std::process::id()).unwrap();
    assert!(is_running(&pid_path));
  }

  #[tokio::test]
  async fn wait_stopped_detects_removed_pid_file() {
    let tmp = tempfile::tempdir().unwrap();
    let pid_path = tmp.path().join("x.pid");
    write_pid_file(&pid_path, 999_999).unwrap();
    remove_pid_file(&pid_path).unwrap();
    assert!(
      wait_stopped(
        &pid_path,
        Duration::from_millis(200),
        Duration::ZERO
      )
      .await
    );
  }
}
