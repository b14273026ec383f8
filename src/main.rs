use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::Authenticator;
use chirpy::clock::SystemClock;
use chirpy::configuration::{get_configuration, DatabaseSettings};
use chirpy::startup::run;
use chirpy::store::{
    InMemoryRefreshTokenRepository, InMemoryUserStore, PgRefreshTokenRepository, PgUserStore,
    RefreshTokenRepository, UserStore,
};
use chirpy::telemetry::init_telemetry;

type Stores = (Arc<dyn UserStore>, Arc<dyn RefreshTokenRepository>);

async fn build_stores(database: &DatabaseSettings) -> std::io::Result<Stores> {
    if database.in_memory {
        tracing::warn!("Using in-memory stores; data is lost on restart");
        return Ok((
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryRefreshTokenRepository::new()),
        ));
    }

    tracing::info!("Attempting to connect to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
    })?;

    tracing::info!("Database connection pool created successfully");
    Ok((
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgRefreshTokenRepository::new(pool)),
    ))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let (users, refresh_tokens) = build_stores(&configuration.database).await?;
    let authenticator = Authenticator::new(
        users,
        refresh_tokens,
        configuration.auth.clone(),
        Arc::new(SystemClock),
    );

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, authenticator)?.await
}
