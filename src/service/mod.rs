//! MovieService: request-facing operations over a repository and an event publisher.

mod movies;
pub use movies::MovieService;
