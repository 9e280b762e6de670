//! Movie operations: delegates to the repository and emits a change event after create.

use crate::error::{AppError, EventError};
use crate::events::MovieEventPublisher;
use crate::model::{Movie, MovieEvent};
use crate::repository::MovieRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct MovieService {
    repository: Arc<dyn MovieRepository>,
    publisher: Arc<dyn MovieEventPublisher>,
}

impl MovieService {
    pub fn new(repository: Arc<dyn MovieRepository>, publisher: Arc<dyn MovieEventPublisher>) -> Self {
        MovieService {
            repository,
            publisher,
        }
    }

    pub async fn list(&self) -> Result<Vec<Movie>, AppError> {
        self.repository.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Movie, AppError> {
        self.repository.get_by_id(id).await
    }

    /// Persist the movie, then publish its snapshot. Event failures are logged and
    /// never change the outcome of the create.
    pub async fn create(&self, movie: Movie) -> Result<Movie, AppError> {
        let created = self.repository.create(movie).await?;
        tracing::info!(id = created.id, isbn = %created.isbn, "movie created");
        if let Err(e) = self.emit_created(&created).await {
            match e {
                EventError::Serialize(_) => tracing::error!(id = created.id, error = %e, "movie event dropped"),
                _ => tracing::warn!(id = created.id, topic = %self.publisher.topic(), error = %e, "movie event not published"),
            }
        }
        Ok(created)
    }

    pub async fn update(&self, id: i64, movie: Movie) -> Result<Movie, AppError> {
        self.repository.update(id, movie).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.repository.delete(id).await
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    async fn emit_created(&self, movie: &Movie) -> Result<(), EventError> {
        let payload = MovieEvent::from(movie).encode()?;
        self.publisher.publish(payload).await
    }
}
