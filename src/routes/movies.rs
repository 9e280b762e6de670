//! Movie CRUD routes.

use crate::handlers::movies::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn movie_routes(state: AppState) -> Router {
    Router::new()
        .route("/movies", get(list).post(create))
        .route("/movies/:id", get(read).put(update).delete(delete_handler))
        .with_state(state)
}
