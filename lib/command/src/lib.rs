//! No-shell process invocation. Binaries are spawned with argument
//! arrays; nothing here ever goes through `sh -c` unless the caller
//! explicitly opts in via [`ShellMode::Wrapped`], which exists only
//! for the Windows binaries (batch-file wrappers) that require a
//! single command string to resolve at all.

use std::{
  path::Path,
  process::Stdio,
  time::Duration,
};

use spindb_types::{Error, Result};
use tokio::process::{Child, Command};

mod output;
pub use output::CommandOutput;

/// How the binary should be invoked. `Args` (the default) passes an
/// argument array directly to the OS with no shell in between.
/// `Wrapped` quotes the binary path and arguments into one command
/// string and runs it through the platform shell — reserved for
/// binaries that can't be resolved any other way on Windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShellMode {
  #[default]
  Args,
  Wrapped,
}

fn build_command(
  bin: &str,
  args: &[String],
  mode: ShellMode,
) -> Command {
  match mode {
    ShellMode::Args => {
      let mut cmd = Command::new(bin);
      cmd.args(args);
      cmd
    }
    ShellMode::Wrapped => {
      let mut quoted = shlex::try_quote(bin)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| bin.to_string());
      for arg in args {
        quoted.push(' ');
        quoted.push_str(
          &shlex::try_quote(arg)
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| arg.clone()),
        );
      }
      #[cfg(windows)]
      {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", &quoted]);
        cmd
      }
      #[cfg(not(windows))]
      {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", &quoted]);
        cmd
      }
    }
  }
}

/// Runs `bin` to completion, capturing stdout/stderr and the exit
/// code. Fails with `Error::SpawnError` if the process could not be
/// launched at all, or `Error::Timeout` if `timeout` elapses first.
pub async fn run_command(
  bin: &str,
  args: &[String],
  cwd: Option<&Path>,
  mode: ShellMode,
  timeout: Duration,
) -> Result<CommandOutput> {
  let mut cmd = build_command(bin, args, mode);
  cmd
    .kill_on_drop(true)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());
  if let Some(cwd) = cwd {
    cmd.current_dir(cwd);
  }

  let child = cmd
    .spawn()
    .map_err(|e| Error::SpawnError(e.to_string()))?;
  let pid = child.id();

  match tokio::time::timeout(timeout, child.wait_with_output()).await
  {
    Ok(Ok(output)) => Ok(CommandOutput::from_output(pid, output)),
    Ok(Err(e)) => Ok(CommandOutput::from_io_error(&e)),
    Err(_) => Err(Error::Timeout(format!(
      "'{bin}' did not complete within {timeout:?}"
    ))),
  }
}

/// Like [`run_command`], but writes `stdin` to the child's standard
/// input before reading its output. Used by adapters that accept a
/// script body on stdin (`psql`, `redis-cli --pipe`, `mongosh`)
/// instead of a `-f`/file flag.
pub async fn run_command_stdin(
  bin: &str,
  args: &[String],
  cwd: Option<&Path>,
  mode: ShellMode,
  timeout: Duration,
  stdin: &[u8],
) -> Result<CommandOutput> {
  use tokio::io::AsyncWriteExt;

  let mut cmd = build_command(bin, args, mode);
  cmd
    .kill_on_drop(true)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());
  if let Some(cwd) = cwd {
    cmd.current_dir(cwd);
  }

  let mut child = cmd
    .spawn()
    .map_err(|e| Error::SpawnError(e.to_string()))?;
  let pid = child.id();
  if let Some(mut child_stdin) = child.stdin.take() {
    let _ = child_stdin.write_all(stdin).await;
    drop(child_stdin);
  }

  match tokio::time::timeout(timeout, child.wait_with_output()).await
  {
    Ok(Ok(output)) => Ok(CommandOutput::from_output(pid, output)),
    Ok(Err(e)) => Ok(CommandOutput::from_io_error(&e)),
    Err(_) => Err(Error::Timeout(format!(
      "'{bin}' did not complete within {timeout:?}"
    ))),
  }
}

/// Launches `bin` and returns immediately with the live child handle,
/// for long-lived server processes. Stdio is redirected to the null
/// device so the child detaches cleanly from the controlling
/// terminal; callers that need log output redirect stdout/stderr to
/// a file via `opts` before calling this (engine adapters open the
/// log file themselves and pass it through `Stdio::from`).
pub fn spawn_detached(
  bin: &str,
  args: &[String],
  cwd: Option<&Path>,
  mode: ShellMode,
  stdout: Stdio,
  stderr: Stdio,
) -> Result<Child> {
  let mut cmd = build_command(bin, args, mode);
  cmd.kill_on_drop(false).stdin(Stdio::null()).stdout(stdout).stderr(stderr);
  if let Some(cwd) = cwd {
    cmd.current_dir(cwd);
  }
  cmd.spawn().map_err(|e| Error::SpawnError(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn run_command_captures_stdout_and_exit_code() {
    let out = run_command(
      "echo",
      &["hello".to_string()],
      None,
      ShellMode::Args,
      Duration::from_secs(5),
    )
    .await
    .unwrap();
    assert!(out.success);
    assert_eq!(out.code, Some(0));
    assert_eq!(out.stdout.trim(), "hello");
  }

  #[tokio::test]
  async fn run_command_reports_non_zero_exit() {
    let out = run_command(
      "sh",
      &["-c".to_string(), "exit 7".to_string()],
      None,
      ShellMode::Args,
      Duration::from_secs(5),
    )
    .await
    .unwrap();
    assert!(!out.success);
    assert_eq!(out.code, Some(7));
  }

  #[tokio::test]
  async fn missing_binary_is_spawn_error() {
    let err = run_command(
      "this-binary-does-not-exist-anywhere",
      &[],
      None,
      ShellMode::Args,
      Duration::from_secs(5),
    )
    .await;
    assert!(matches!(err, Err(Error::SpawnError(_))));
  }

  #[tokio::test]
  async fn timeout_fires_for_long_running_command() {
    let err = run_command(
      "sleep",
      &["5".to_string()],
      None,
      ShellMode::Args,
      Duration::from_millis(50),
    )
    .await;
    assert!(matches!(err, Err(Error::Timeout(_))));
  }
}
