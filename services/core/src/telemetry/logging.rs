use std::io;

use log::SetLoggerError;
use thiserror::Error;
use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to redirect `log` records: {0}")]
    Logger(#[from] SetLoggerError),

    #[error("Failed to install the tracing subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Compose multiple layers into a tracing subscriber.
///
/// The layers used allow filtering tracing spans based on the logging level set through `RUST_LOG`, falling
/// back to `env_filter`. The logs are sent to stdout in Bunyan compatible format.
pub fn make_subscriber(name: impl Into<String>, env_filter: impl Into<String>) -> impl Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter.into()));
    let formatting_layer = BunyanFormattingLayer::new(name.into(), io::stdout);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs the given subscriber as global default. The AWS SDK and other dependencies still log through
/// `log`, so those records are redirected to the subscriber as well.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), TelemetryError> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}

/// Utility macro to log information about an error and map it to some other type.
///
/// This is meant to be used in a `Result::map_err`, e.g.:
///
/// ```ignore
/// ledger.adjust_seats(&course_id, -1).await.map_err(simple_err_map!("Seat decrement failed.", MyError::Internal))?;
/// ```
#[macro_export]
macro_rules! simple_err_map {
    ($msg:expr, $result:expr) => {
        |e| {
            tracing::error!(error = ?e, $msg);
            $result
        }
    };
}
