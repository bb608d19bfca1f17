use thiserror::Error;

pub mod config;
mod error;
mod handlers;
pub mod models;
pub mod server;

pub use error::ApiError;

#[derive(Error, Debug)]
pub enum HttpServerError {
    #[error("failed to bind HTTP server: {0}")]
    BindError(#[source] std::io::Error),

    #[error("HTTP server error: {0}")]
    ServerError(#[source] std::io::Error),
}
