use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the JSON subscriber. `RUST_LOG` wins over `default_filter`.
pub fn get_subscriber(default_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
}

/// Install structured JSON logging as the global subscriber.
pub fn init_telemetry() {
    get_subscriber("info").init();
}
