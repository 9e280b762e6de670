//! Movie CRUD handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::model::Movie;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

/// Every decode failure is a 400, except a body over the size limit.
fn decode_body(body: Result<Json<Movie>, JsonRejection>) -> Result<Movie, AppError> {
    match body {
        Ok(Json(movie)) => Ok(movie),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge(rejection.body_text()))
        }
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, AppError> {
    let movies = state.movies.list().await?;
    Ok(Json(movies))
}

pub async fn read(State(state): State<AppState>, Path(id_str): Path<String>) -> Result<Json<Movie>, AppError> {
    let id = parse_id(&id_str)?;
    let movie = state.movies.get_by_id(id).await?;
    Ok(Json(movie))
}

/// Any `id` in the body is ignored; the store assigns one.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Movie>, JsonRejection>,
) -> Result<Json<Movie>, AppError> {
    let movie = decode_body(body)?;
    let created = state.movies.create(movie).await?;
    Ok(Json(created))
}

/// Full replace of isbn, title and director. The path id wins over any id in the body.
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<Movie>, JsonRejection>,
) -> Result<Json<Movie>, AppError> {
    let id = parse_id(&id_str)?;
    let movie = decode_body(body)?;
    let updated = state.movies.update(id, movie).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    state.movies.delete(id).await?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")]))
}
