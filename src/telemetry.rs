use tracing_subscriber::{prelude::*, EnvFilter, Registry};

use crate::error::{Error, Result};

/// Initialize tracing. `RUST_LOG` wins over the debug flag when it is set.
pub fn init(debug: bool) -> Result<()> {
    let logger = tracing_subscriber::fmt::layer()
        .compact()
        .with_line_number(true)
        .with_target(true);
    let default_level = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|err| Error::Config(format!("log filter: {err}")))?;

    let collector = Registry::default().with(logger).with(env_filter);
    tracing::subscriber::set_global_default(collector)
        .map_err(|err| Error::Config(format!("tracing subscriber: {err}")))
}
