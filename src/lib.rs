//! movies-crud: REST service for a movies resource on PostgreSQL, with change events on create.

pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod model;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{AppConfig, StorageLayout};
pub use error::{AppError, ConfigError, EventError};
pub use events::{LogPublisher, MovieEventPublisher, RecordingPublisher};
#[cfg(feature = "kafka")]
pub use events::KafkaMovieProducer;
pub use model::{Director, Movie, MovieEvent};
pub use repository::{InMemoryMovieRepository, MovieRepository, PgMovieRepository, PgNormalizedMovieRepository};
pub use routes::{build_router, common_routes, movie_routes};
pub use service::MovieService;
pub use state::AppState;
pub use store::{connect, ensure_database_exists, ensure_movie_tables};
