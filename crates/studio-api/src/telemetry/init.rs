use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

const DEFAULT_FILTER: &str =
    "studio_api=debug,studio_db=debug,studio_storage=debug,tower_http=debug";

/// Initialize tracing.
///
/// `RUST_LOG` overrides the default filter. `log_format = "json"` switches the console
/// output to one JSON object per line. Calling this twice is harmless: the second call
/// leaves the first subscriber in place.
pub fn init_telemetry(log_format: &str) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let console = if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .event_format(
                Format::default()
                    .compact()
                    .with_target(false)
                    .without_time(),
            )
            .boxed()
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
        return Ok(());
    }

    tracing::info!(log_format, "Tracing initialized");
    Ok(())
}
