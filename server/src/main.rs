//! movies-server: loads config from the environment, opens storage and the event
//! publisher, and serves the movie routes until the listener fails.
//!
//! Run from repo root: `cargo run -p movies-server`
//! With Kafka publishing: `cargo run -p movies-server --features kafka`

use movies_crud::{
    build_router, connect, ensure_database_exists, ensure_movie_tables, AppConfig, AppState, InMemoryMovieRepository,
    LogPublisher, MovieEventPublisher, MovieRepository, MovieService, PgMovieRepository, PgNormalizedMovieRepository,
    StorageLayout,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("movies_crud=info,movies_server=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let repository = open_repository(&config).await?;
    let publisher = open_publisher(&config)?;
    let state = AppState::new(MovieService::new(repository, publisher));

    let app = build_router(state, config.max_body_bytes);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(layout = ?config.layout, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn open_repository(config: &AppConfig) -> Result<Arc<dyn MovieRepository>, Box<dyn std::error::Error>> {
    if !config.layout.uses_database() {
        tracing::warn!("using in-memory storage; movies are lost on restart");
        return Ok(Arc::new(InMemoryMovieRepository::new()));
    }
    if config.ensure_schema {
        ensure_database_exists(&config.database_url).await?;
    }
    let pool = connect(config).await?;
    tracing::info!("connected to database");
    if config.ensure_schema {
        ensure_movie_tables(&pool, config.layout).await?;
    }
    let repository: Arc<dyn MovieRepository> = match config.layout {
        StorageLayout::Normalized => Arc::new(PgNormalizedMovieRepository::new(pool, config.db_timeout)),
        _ => Arc::new(PgMovieRepository::new(pool, config.db_timeout)),
    };
    Ok(repository)
}

fn open_publisher(config: &AppConfig) -> Result<Arc<dyn MovieEventPublisher>, Box<dyn std::error::Error>> {
    match config.kafka_brokers.as_deref() {
        #[cfg(feature = "kafka")]
        Some(brokers) => Ok(Arc::new(movies_crud::KafkaMovieProducer::new(brokers, config.kafka_topic.clone())?)),
        #[cfg(not(feature = "kafka"))]
        Some(_) => {
            tracing::warn!("KAFKA_BROKERS is set but this build has no kafka feature; movie events are only logged");
            Ok(Arc::new(LogPublisher::new(config.kafka_topic.clone())))
        }
        None => Ok(Arc::new(LogPublisher::new(config.kafka_topic.clone()))),
    }
}
