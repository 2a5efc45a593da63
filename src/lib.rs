pub mod app;
pub mod catalog;
pub mod config;
pub mod images;
pub mod models;
pub mod pipeline;
pub mod session;

pub use catalog::{CatalogApi, CatalogClient, CatalogError};

pub type Result<T> = std::result::Result<T, CatalogError>;
