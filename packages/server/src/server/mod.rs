// HTTP server setup (Axum)
pub mod app;
pub mod routes;
pub mod static_pages;

pub use app::*;
