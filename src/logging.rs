use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::Span;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

use crate::error::Result;

const DEFAULT_DIRECTIVES: &str = "plex_sorter=debug";

/// Process logging handle.
///
/// The subscriber is installed as the default for the current thread and
/// stays active until this handle is dropped, so `main` owns it for the
/// life of the process. Components receive a span from [`Logging::component`]
/// instead of touching global logger state.
pub struct Logging {
    _guard: DefaultGuard,
}

impl Logging {
    /// Installs a subscriber writing to `log_file` (truncated first) or,
    /// when no file is given, to stderr.
    pub fn install(log_file: Option<&Path>) -> Result<Self> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false);

        let guard = match log_file {
            Some(path) => {
                let file = File::create(path)?;
                let subscriber = builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .finish();
                tracing::subscriber::set_default(subscriber)
            }
            None => {
                let subscriber = builder.with_writer(std::io::stderr).finish();
                tracing::subscriber::set_default(subscriber)
            }
        };

        Ok(Self { _guard: guard })
    }

    pub fn component(&self, name: &'static str) -> Span {
        tracing::info_span!("plex_sorter", component = name)
    }
}
