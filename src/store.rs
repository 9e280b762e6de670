//! Connection setup and bootstrap DDL for the movie tables.
//!
//! Only `CREATE ... IF NOT EXISTS`: existing tables are never altered.

use crate::config::{AppConfig, StorageLayout};
use crate::error::{AppError, ConfigError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const FLAT_DDL: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS movies (
        id BIGSERIAL PRIMARY KEY,
        isbn TEXT NOT NULL,
        title TEXT NOT NULL,
        director TEXT NOT NULL
    )
    "#];

const NORMALIZED_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS directors (
        id BIGSERIAL PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS movies (
        id BIGSERIAL PRIMARY KEY,
        isbn TEXT NOT NULL,
        title TEXT NOT NULL,
        director_id BIGINT NOT NULL REFERENCES directors (id)
    )
    "#,
];

/// Open the pool described by `config`. The acquire timeout follows the per-call deadline.
pub async fn connect(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_timeout)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Create the tables `layout` reads and writes if they do not exist. No-op for memory.
pub async fn ensure_movie_tables(pool: &PgPool, layout: StorageLayout) -> Result<(), AppError> {
    let statements = match layout {
        StorageLayout::Memory => return Ok(()),
        StorageLayout::Flat => FLAT_DDL,
        StorageLayout::Normalized => NORMALIZED_DDL,
    };
    for ddl in statements {
        sqlx::query(*ddl).execute(pool).await?;
    }
    tracing::info!(?layout, "movie tables ready");
    Ok(())
}

/// Create the database named in `database_url` if it is missing, via the `postgres` maintenance db.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)
        .map_err(|_| invalid_url())?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(invalid_url)? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

/// The URL itself is not echoed: it may carry credentials.
fn invalid_url() -> AppError {
    AppError::Config(ConfigError::InvalidValue {
        key: "DATABASE_URL",
        value: "<redacted>".into(),
    })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
