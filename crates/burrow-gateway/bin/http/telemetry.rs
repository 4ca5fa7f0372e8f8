use crate::cli::LogFormatArg;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// level.
pub fn init(format: LogFormatArg) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormatArg::Text => registry
            .with(fmt::layer().with_target(false).with_line_number(true))
            .try_init()?,
        LogFormatArg::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?,
    }

    Ok(())
}
