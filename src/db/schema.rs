//! SQL DDL for the product catalog.

/// SQLite schema for `product`:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT, never reused
/// - `instock` BOOLEAN (stored as INTEGER 0/1)
/// - `created` / `modified` RFC3339 text; `modified` stays NULL until the first update
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS product (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(50) NOT NULL,
    "desc" VARCHAR(200) NOT NULL,
    price REAL NOT NULL,
    image TEXT NULL,
    instock INTEGER NOT NULL DEFAULT 0,
    created TEXT NOT NULL, -- RFC3339
    modified TEXT NULL -- RFC3339
);
"#;
