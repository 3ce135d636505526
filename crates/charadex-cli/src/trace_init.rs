#[cfg(feature = "trace")]
use std::path::Path;
#[cfg(feature = "trace")]
use std::sync::Once;

#[cfg(feature = "trace")]
static INIT: Once = Once::new();

/// Install a JSON subscriber. With a `log_dir`, events go to
/// `charadex-trace.jsonl` in it; otherwise to stderr.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: Option<&Path>) {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("charadex_core=debug,charadex_cli=debug")
        });
        let builder = tracing_subscriber::fmt()
            .json()
            .with_target(true)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
            .with_env_filter(filter);

        match log_dir {
            Some(dir) => {
                // Blocking writer: a CLI run is too short-lived for a worker thread.
                let file_appender = tracing_appender::rolling::never(dir, "charadex-trace.jsonl");
                builder.with_writer(file_appender).init();
            }
            None => builder.with_writer(std::io::stderr).init(),
        }
    });
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: Option<&std::path::Path>) {}
