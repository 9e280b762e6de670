//! Shared application state for all routes.

use crate::service::MovieService;

#[derive(Clone)]
pub struct AppState {
    pub movies: MovieService,
}

impl AppState {
    pub fn new(movies: MovieService) -> Self {
        AppState { movies }
    }
}
