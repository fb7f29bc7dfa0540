use anyhow::Context;
use rusty_library_books::{
    adapters::{memory::InMemoryBookRepository, postgres::PostgresBookRepository},
    api::{handlers::AppState, router::create_router},
    application::book::ServiceDependencies,
    config::{Settings, StorageBackend},
    ports::BookRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_books=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    let year_range = settings.books.year_range()?;

    tracing::info!(
        year_min = year_range.min(),
        year_max = year_range.max(),
        "Accepted publication years"
    );

    // Initialize adapters
    let book_repository: Arc<dyn BookRepository> = match settings.storage.backend {
        StorageBackend::Postgres => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.database.max_connections)
                .connect(&settings.database.url)
                .await
                .with_context(|| "failed to connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .with_context(|| "failed to run migrations")?;

            tracing::info!("Using PostgreSQL book storage");
            Arc::new(PostgresBookRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory book storage; data is lost on shutdown");
            Arc::new(InMemoryBookRepository::new())
        }
    };

    // Create service dependencies
    let service_deps = ServiceDependencies {
        book_repository,
        year_range,
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = settings.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .with_context(|| "server error")?;

    Ok(())
}
