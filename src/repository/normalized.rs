//! Two-table layout: `directors(id, first_name, last_name)` referenced by `movies.director_id`.
//!
//! Create inserts the director, then the movie, as two separate statements with no
//! transaction. If the movie insert fails the director row stays behind unreferenced.

use super::{not_found, with_deadline, MovieRepository};
use crate::error::AppError;
use crate::model::{Director, Movie};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Duration;

const SELECT_ALL: &str = "SELECT m.id, m.isbn, m.title, d.first_name, d.last_name \
    FROM movies m JOIN directors d ON d.id = m.director_id ORDER BY m.id";
const SELECT_BY_ID: &str = "SELECT m.id, m.isbn, m.title, d.first_name, d.last_name \
    FROM movies m JOIN directors d ON d.id = m.director_id WHERE m.id = $1";
const INSERT_DIRECTOR: &str = "INSERT INTO directors (first_name, last_name) VALUES ($1, $2) RETURNING id";
const INSERT_MOVIE: &str = "INSERT INTO movies (isbn, title, director_id) VALUES ($1, $2, $3) RETURNING id";
// Movie and its director are rewritten by one statement.
const UPDATE: &str = "WITH m AS ( \
        UPDATE movies SET isbn = $2, title = $3 WHERE id = $1 RETURNING director_id \
    ) \
    UPDATE directors d SET first_name = $4, last_name = $5 FROM m WHERE d.id = m.director_id";
// Also removes the movie's director row.
const DELETE: &str = "WITH m AS ( \
        DELETE FROM movies WHERE id = $1 RETURNING director_id \
    ) \
    DELETE FROM directors d USING m WHERE d.id = m.director_id";

#[derive(Clone)]
pub struct PgNormalizedMovieRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgNormalizedMovieRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        PgNormalizedMovieRepository { pool, timeout }
    }

    async fn insert_director(&self, director: &Director) -> Result<i64, AppError> {
        let (first_name, last_name) = director.split_name();
        tracing::debug!(sql = %INSERT_DIRECTOR, "query");
        with_deadline(
            "insert director",
            self.timeout,
            sqlx::query_scalar::<_, i64>(INSERT_DIRECTOR)
                .bind(first_name)
                .bind(last_name)
                .fetch_one(&self.pool),
        )
        .await
    }
}

fn row_to_movie(row: &PgRow) -> Result<Movie, sqlx::Error> {
    Ok(Movie {
        id: row.try_get("id")?,
        isbn: row.try_get("isbn")?,
        title: row.try_get("title")?,
        director: Director::Person {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
        },
    })
}

/// Director as it reads back from this layout.
fn stored_director(director: &Director) -> Director {
    let (first_name, last_name) = director.split_name();
    Director::Person {
        first_name,
        last_name,
    }
}

#[async_trait]
impl MovieRepository for PgNormalizedMovieRepository {
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
        let director_id = self.insert_director(&movie.director).await?;
        tracing::debug!(sql = %INSERT_MOVIE, director_id, "query");
        let inserted = with_deadline(
            "insert movie",
            self.timeout,
            sqlx::query_scalar::<_, i64>(INSERT_MOVIE)
                .bind(&movie.isbn)
                .bind(&movie.title)
                .bind(director_id)
                .fetch_one(&self.pool),
        )
        .await;
        let id = match inserted {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(director_id, error = %e, "movie insert failed; director row left unreferenced");
                return Err(e);
            }
        };
        let director = stored_director(&movie.director);
        Ok(Movie {
            id,
            director,
            ..movie
        })
    }

    async fn update(&self, id: i64, movie: Movie) -> Result<Movie, AppError> {
        let (first_name, last_name) = movie.director.split_name();
        tracing::debug!(sql = %UPDATE, id, "query");
        let result = with_deadline(
            "update movie",
            self.timeout,
            sqlx::query(UPDATE)
                .bind(id)
                .bind(&movie.isbn)
                .bind(&movie.title)
                .bind(first_name)
                .bind(last_name)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            tracing::debug!(id, "update matched no rows");
        }
        let director = stored_director(&movie.director);
        Ok(Movie {
            id,
            director,
            ..movie
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        tracing::debug!(sql = %DELETE, id, "query");
        with_deadline(
            "delete movie",
            self.timeout,
            sqlx::query(DELETE).bind(id).execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        with_deadline("ping", self.timeout, sqlx::query("SELECT 1").fetch_optional(&self.pool)).await?;
        Ok(())
    }
}
