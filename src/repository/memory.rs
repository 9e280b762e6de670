//! Process-local movie store. Same contract as the SQL repositories, no persistence.

use super::{not_found, MovieRepository};
use crate::error::AppError;
use crate::model::Movie;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Store {
    movies: BTreeMap<i64, Movie>,
    last_id: i64,
}

/// Cloning shares the underlying store.
#[derive(Clone, Default)]
pub struct InMemoryMovieRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryMovieRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `movies`; each gets the next id in order.
    pub fn with_movies<I>(movies: I) -> Self
    where
        I: IntoIterator<Item = Movie>,
    {
        let mut store = Store::default();
        for movie in movies {
            store.last_id += 1;
            let id = store.last_id;
            store.movies.insert(id, movie.with_id(id));
        }
        InMemoryMovieRepository {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn list(&self) -> Result<Vec<Movie>, AppError> {
        Ok(self.store.read().await.movies.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Movie, AppError> {
        self.store
            .read()
            .await
            .movies
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, movie: Movie) -> Result<Movie, AppError> {
        let mut store = self.store.write().await;
        store.last_id += 1;
        let movie = movie.with_id(store.last_id);
        store.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn update(&self, id: i64, movie: Movie) -> Result<Movie, AppError> {
        let movie = movie.with_id(id);
        if let Some(existing) = self.store.write().await.movies.get_mut(&id) {
            *existing = movie.clone();
        }
        Ok(movie)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.store.write().await.movies.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
