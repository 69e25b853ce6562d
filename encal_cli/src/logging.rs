//! Tracing subscriber setup from the `[logging]` config section.

use encal_config::Logging;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. File output uses JSON lines; console
/// output goes to stderr so `--json` keeps stdout clean. Returns the
/// appender guard that must stay alive for file logging to flush.
pub fn init(cfg: &Logging) -> eyre::Result<Option<WorkerGuard>> {
    let level = cfg.level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(file) = &cfg.file {
        let path = std::path::Path::new(file);
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "encal.log".into());
        let appender = match cfg.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(None)
    }
}
