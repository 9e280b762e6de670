//! Data access for movies: one capability trait, PostgreSQL and in-memory implementations.

mod memory;
mod normalized;
mod postgres;

pub use memory::InMemoryMovieRepository;
pub use normalized::PgNormalizedMovieRepository;
pub use postgres::PgMovieRepository;

use crate::error::AppError;
use crate::model::Movie;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Storage operations the service needs. Implementations must be safe to share across requests.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// All movies, ordered by id.
    async fn list(&self) -> Result<Vec<Movie>, AppError>;

    /// One movie, or `AppError::NotFound` when no row has this id.
    async fn get_by_id(&self, id: i64) -> Result<Movie, AppError>;

    /// Insert and return the movie carrying its generated id. Any incoming id is ignored.
    async fn create(&self, movie: Movie) -> Result<Movie, AppError>;

    /// Replace isbn, title and director. Does not check that the row exists.
    async fn update(&self, id: i64, movie: Movie) -> Result<Movie, AppError>;

    /// Remove the row. Does not check that the row exists.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Cheap connectivity check used by the readiness route.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Run one database call under `timeout`; expiry becomes `AppError::Timeout`.
pub(crate) async fn with_deadline<T, F>(op: &str, timeout: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::Timeout(format!("{} after {}ms", op, timeout.as_millis()))),
    }
}

pub(crate) fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("movie {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_passes_through_results() {
        let ok = with_deadline("select", Duration::from_secs(1), async { Ok::<_, sqlx::Error>(3) }).await;
        assert_eq!(ok.unwrap(), 3);
        let err = with_deadline("select", Duration::from_secs(1), async {
            Err::<i32, _>(sqlx::Error::RowNotFound)
        })
        .await;
        assert!(matches!(err, Err(AppError::Db(sqlx::Error::RowNotFound))));
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, sqlx::Error>(())
        };
        let err = with_deadline("insert movie", Duration::from_millis(10), slow).await;
        match err {
            Err(AppError::Timeout(msg)) => assert!(msg.starts_with("insert movie")),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
