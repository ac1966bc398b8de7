use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

/// Install the global tracing subscriber.
///
/// The filter comes from `explicit_filter` when given, otherwise from
/// `RUST_LOG`, otherwise everything at `info`.
///
/// # Errors
///
/// Returns an error if the explicit filter does not parse, if the JSON
/// layer is requested without the `json-logs` feature, or if a global
/// subscriber is already installed.
pub fn init_tracing(explicit_filter: Option<&str>, use_json: bool) -> Result<()> {
    let filter = resolve_filter(explicit_filter)?;

    #[cfg(feature = "json-logs")]
    if use_json {
        return Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(true).json().flatten_event(true))
            .try_init()
            .map_err(|err| Error::Telemetry(err.to_string()));
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|err| Error::Telemetry(err.to_string()))
}

fn resolve_filter(explicit: Option<&str>) -> Result<EnvFilter> {
    if let Some(directives) = explicit {
        return EnvFilter::try_new(directives)
            .map_err(|err| Error::Telemetry(format!("invalid log filter: {err}")));
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
}
