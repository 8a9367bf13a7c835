use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub price: f64,
    pub image: Option<String>,
    pub instock: bool,
    pub created: DateTime<Utc>,
    pub modified: Option<DateTime<Utc>>,
}

/// Every user-writable column of a product; updates overwrite all of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub desc: String,
    pub price: f64,
    pub image: Option<String>,
    pub instock: bool,
}
