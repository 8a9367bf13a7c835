pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod router;
pub mod service;

pub use config::Config;
pub use db::{Product, ProductFields};
pub use error::CatalogError;
pub use service::ProductService;
