//! HTTP ingress: axum handlers, routes, and the error envelope.

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::AppError;
pub use routes::router;
pub use state::AppState;
