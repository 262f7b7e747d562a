use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const COMBINED_LOG: &str = "combined.log";
pub const ERROR_LOG: &str = "error.log";

#[derive(Debug, Clone)]
pub struct LogSettings {
  pub directive: String,
  pub dir: PathBuf,
  pub console: bool,
}

impl LogSettings {
  /// `RUST_LOG` wins over `LOG_LEVEL` (default `info`). Console output is off
  /// when `APP_ENV=production`.
  pub fn from_env() -> Self {
    let directive = std::env::var("RUST_LOG")
      .or_else(|_| std::env::var("LOG_LEVEL"))
      .unwrap_or_else(|_| "info".to_string());
    let production = std::env::var("APP_ENV").is_ok_and(|env| env == "production");
    Self {
      directive,
      dir: std::env::var("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("logs")),
      console: !production,
    }
  }
}

/// Keeps the file writers flushing; drop it only on shutdown.
pub struct LogGuard {
  _guards: Vec<WorkerGuard>,
}

fn file_writer(dir: &Path, name: &str) -> anyhow::Result<RollingFileAppender> {
  RollingFileAppender::builder()
    .rotation(Rotation::NEVER)
    .filename_prefix(name)
    .build(dir)
    .with_context(|| format!("failed to open {}", dir.join(name).display()))
}

/// JSON lines for everything into `combined.log`, errors only into `error.log`,
/// plus colored console output unless disabled.
pub fn subscriber(settings: &LogSettings) -> anyhow::Result<(impl Subscriber + Send + Sync, LogGuard)> {
  std::fs::create_dir_all(&settings.dir)
    .with_context(|| format!("failed to create log directory {}", settings.dir.display()))?;

  let (combined, combined_guard) = tracing_appender::non_blocking(file_writer(&settings.dir, COMBINED_LOG)?);
  let (errors, errors_guard) = tracing_appender::non_blocking(file_writer(&settings.dir, ERROR_LOG)?);

  let console = settings
    .console
    .then(|| fmt::layer().with_target(false));
  let subscriber = tracing_subscriber::registry()
    .with(EnvFilter::new(&settings.directive))
    .with(console)
    .with(fmt::layer().json().with_writer(combined))
    .with(
      fmt::layer()
        .json()
        .with_writer(errors)
        .with_filter(LevelFilter::ERROR),
    );

  Ok((
    subscriber,
    LogGuard {
      _guards: vec![combined_guard, errors_guard],
    },
  ))
}

pub fn init(settings: &LogSettings) -> anyhow::Result<LogGuard> {
  let (subscriber, guard) = subscriber(settings)?;
  tracing::subscriber::set_global_default(subscriber).context("logger already installed")?;
  Ok(guard)
}
