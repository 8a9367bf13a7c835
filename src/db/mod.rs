//! Database module: the `product` table and its CRUD storage.
//!
//! Layout:
//! - `models.rs`: the `Product` row and the writable `ProductFields`
//! - `schema.rs`: SQL DDL for initializing the database (SQLite)
//! - `sqlite.rs`: `ProductStorage`, the repository over the pool

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Product, ProductFields};
pub use schema::SQLITE_INIT;
pub use sqlite::{ProductStorage, SqlitePool, connect};
