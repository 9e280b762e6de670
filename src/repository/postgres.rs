//! Single-table layout: `movies(id, isbn, title, director)`.

use super::{not_found, with_deadline, MovieRepository};
use crate::error::AppError;
use crate::model::{Director, Movie};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Duration;

const SELECT_ALL: &str = "SELECT id, isbn, title, director FROM movies ORDER BY id";
const SELECT_BY_ID: &str = "SELECT id, isbn, title, director FROM movies WHERE id = $1";
const INSERT: &str = "INSERT INTO movies (isbn, title, director) VALUES ($1, $2, $3) RETURNING id";
const UPDATE: &str = "UPDATE movies SET isbn = $1, title = $2, director = $3 WHERE id = $4";
const DELETE: &str = "DELETE FROM movies WHERE id = $1";

#[derive(Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgMovieRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        PgMovieRepository { pool, timeout }
    }
}

/// The movie as a later read returns it: the director collapses to its display name.
fn stored(movie: Movie) -> Movie {
    let director = Director::Name(movie.director.full_name());
    Movie { director, ..movie }
}

fn row_to_movie(row: &PgRow) -> Result<Movie, sqlx::Error> {
    Ok(Movie {
        id: row.try_get("id")?,
        isbn: row.try_get("isbn")?,
        title: row.try_get("title")?,
        director: Director::Name(row.try_get("director")?),
    })
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn list(&self) -> Result<Vec<Movie>, AppError> {
        tracing::debug!(sql = %SELECT_ALL, "query");
        let rows = with_deadline("list movies", self.timeout, sqlx::query(SELECT_ALL).fetch_all(&self.pool)).await?;
        let movies = rows.iter().map(row_to_movie).collect::<Result<Vec<_>, _>>()?;
        Ok(movies)
    }

    async fn get_by_id(&self, id: i64) -> Result<Movie, AppError> {
        tracing::debug!(sql = %SELECT_BY_ID, id, "query");
        let row = with_deadline(
            "get movie",
            self.timeout,
            sqlx::query(SELECT_BY_ID).bind(id).fetch_optional(&self.pool),
        )
        .await?;
        match row {
            Some(r) => Ok(row_to_movie(&r)?),
            None => Err(not_found(id)),
        }
    }

    async fn create(&self, movie: Movie) -> Result<Movie, AppError> {
        tracing::debug!(sql = %INSERT, isbn = %movie.isbn, "query");
        let id: i64 = with_deadline(
            "insert movie",
            self.timeout,
            sqlx::query_scalar::<_, i64>(INSERT)
                .bind(&movie.isbn)
                .bind(&movie.title)
                .bind(movie.director.full_name())
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(stored(movie).with_id(id))
    }

    async fn update(&self, id: i64, movie: Movie) -> Result<Movie, AppError> {
        tracing::debug!(sql = %UPDATE, id, "query");
        let result = with_deadline(
            "update movie",
            self.timeout,
            sqlx::query(UPDATE)
                .bind(&movie.isbn)
                .bind(&movie.title)
                .bind(movie.director.full_name())
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            tracing::debug!(id, "update matched no rows");
        }
        Ok(stored(movie).with_id(id))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        tracing::debug!(sql = %DELETE, id, "query");
        let result = with_deadline(
            "delete movie",
            self.timeout,
            sqlx::query(DELETE).bind(id).execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            tracing::debug!(id, "delete matched no rows");
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        with_deadline("ping", self.timeout, sqlx::query("SELECT 1").fetch_optional(&self.pool)).await?;
        Ok(())
    }
}
