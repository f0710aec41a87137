use tracing_appender::{non_blocking, non_blocking::WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "sleep-diary.log";
const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn,tower=warn,tower_http=warn,h2=warn";

/// Installs the global subscriber: coloured output on stdout plus a plain copy
/// appended to `sleep-diary.log` inside `log_dir`.
///
/// `RUST_LOG` overrides the default filter. Hold on to the returned guard
/// until shutdown, the file writer flushes when it drops.
pub fn init(log_dir: &str) -> WorkerGuard {
    let (file_writer, guard) = non_blocking(tracing_appender::rolling::never(log_dir, LOG_FILE));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    guard
}
