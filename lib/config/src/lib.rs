//! Configuration is loaded once at process start, the way
//! `periphery_config()` loads `PeripheryConfig`: CLI flags take
//! priority, falling back to environment variables, falling back to
//! a hardcoded default. Stored behind a `OnceLock` so the rest of the
//! binary can call [`config()`] from anywhere without threading a
//! value through every function signature.

use std::io::IsTerminal;
use std::sync::OnceLock;

use clap::Parser;
use serde::Deserialize;

/// Global flags shared by every `spindb` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(name = "spindb", version, about = "Local database container manager")]
pub struct CliArgs {
  /// Render output as a single JSON document instead of
  /// human-readable text. Also disables all interactive prompting.
  #[arg(long, global = true)]
  pub json: bool,

  /// Assume "yes" to any confirmation prompt; implies non-interactive
  /// for that prompt only.
  #[arg(short = 'y', long = "yes", global = true)]
  pub assume_yes: bool,

  /// Override the root directory (defaults to `$HOME/.spindb`).
  #[arg(long, global = true)]
  pub root_dir: Option<std::path::PathBuf>,

  /// Override the log level (defaults to `info`, or `SPINDB_LOG_LEVEL`).
  #[arg(long, global = true)]
  pub log_level: Option<LogLevel>,
}

/// Environment variables read when the matching CLI flag is absent.
#[derive(Debug, Deserialize, Default)]
pub struct Env {
  pub spindb_root: Option<std::path::PathBuf>,
  pub spindb_log_level: Option<LogLevel>,
  pub spindb_log_json: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Error,
  Warn,
  Info,
  Debug,
  Trace,
}

impl From<LogLevel> for tracing::Level {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::Error => tracing::Level::ERROR,
      LogLevel::Warn => tracing::Level::WARN,
      LogLevel::Info => tracing::Level::INFO,
      LogLevel::Debug => tracing::Level::DEBUG,
      LogLevel::Trace => tracing::Level::TRACE,
    }
  }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
  pub level: LogLevel,
  /// `true` when rendering JSON is requested (`--json` or
  /// `SPINDB_LOG_JSON`); human-readable stderr otherwise.
  pub json: bool,
  pub ansi: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
  pub root_dir: Option<std::path::PathBuf>,
  pub json_output: bool,
  pub assume_yes: bool,
  pub log: LogConfig,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Merges CLI args over environment variables into the process-wide
/// [`Config`] and stores it. Must be called exactly once, at binary
/// startup, before [`config()`] is used.
pub fn init(args: &CliArgs) -> &'static Config {
  CONFIG.get_or_init(|| {
    let env: Env = envy::from_env().unwrap_or_default();
    let root_dir = args.root_dir.clone().or(env.spindb_root);
    let json_output = args.json || env.spindb_log_json.unwrap_or(false);
    let level = args
      .log_level
      .or(env.spindb_log_level)
      .unwrap_or(LogLevel::Info);
    Config {
      root_dir,
      json_output,
      assume_yes: args.assume_yes,
      log: LogConfig {
        level,
        json: json_output,
        ansi: !json_output && std::io::stderr().is_terminal(),
      },
    }
  })
}

/// Returns the process-wide config. Panics if [`init`] has not been
/// called yet — a programmer error, not a user-facing one.
pub fn config() -> &'static Config {
  CONFIG.get().expect("spindb_config::init was not called")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn log_level_maps_to_tracing_level() {
    assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
  }
}
