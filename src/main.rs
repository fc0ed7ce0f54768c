use library_back_office::{
    adapters::postgres::{
        PostgresBookDirectory, PostgresNotificationSink, PostgresTransactionRepository,
        PostgresUserDirectory,
    },
    api::{handlers::AppState, router::create_router},
    application::{navigation::NavigationBadgeCache, transaction::ServiceDependencies},
    config::Config,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "library_back_office=debug,tower_http=debug,axum=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    tracing::info!(
        port = config.port,
        max_connections = config.database_max_connections,
        badge_cache_ttl_secs = config.badge_cache_ttl.as_secs(),
        "Configuration loaded"
    );

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Create service dependencies
    let service_deps = ServiceDependencies {
        transaction_repository: Arc::new(PostgresTransactionRepository::new(pool.clone())),
        book_directory: Arc::new(PostgresBookDirectory::new(pool.clone())),
        user_directory: Arc::new(PostgresUserDirectory::new(pool.clone())),
        notification_sink: Arc::new(PostgresNotificationSink::new(pool)),
        badge_cache: Arc::new(NavigationBadgeCache::new(config.badge_cache_ttl)),
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
