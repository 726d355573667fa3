use anyhow::Context;
use spindb_config::LogConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
  Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Initializes the global `tracing` subscriber from a
/// [`LogConfig`]. JSON mode is used both for `--json` CLI rendering
/// and machine-readable log shipping; human mode uses ANSI color
/// only when stderr is a real terminal.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
  let log_level: tracing::Level = config.level.into();
  let registry = Registry::default().with(LevelFilter::from(log_level));

  if config.json {
    registry
      .with(tracing_subscriber::fmt::layer().json())
      .try_init()
  } else {
    registry
      .with(
        tracing_subscriber::fmt::layer()
          .with_target(false)
          .with_ansi(config.ansi),
      )
      .try_init()
  }
  .context("failed to init logger")
}
