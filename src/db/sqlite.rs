use crate::db::models::{Product, ProductFields};
use crate::db::schema::SQLITE_INIT;
use crate::error::CatalogError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Open (creating if missing) the SQLite database at `database_url`.
pub async fn connect(database_url: &str) -> Result<SqlitePool, CatalogError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    Ok(pool)
}

const SELECT_PRODUCT: &str =
    r#"SELECT id, name, "desc", price, image, instock, created, modified FROM product"#;

/// CRUD over the `product` table.
#[derive(Clone)]
pub struct ProductStorage {
    pool: SqlitePool,
}

impl ProductStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), CatalogError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// All products in storage order.
    pub async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        let rows = sqlx::query(SELECT_PRODUCT).fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Product, CatalogError> {
        let row = sqlx::query(&format!("{SELECT_PRODUCT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        Self::row_to_model(row)
    }

    /// Insert a new row; `created` is stamped now and `modified` left NULL.
    pub async fn create(&self, fields: ProductFields) -> Result<Product, CatalogError> {
        let created = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO product (name, "desc", price, image, instock, created, modified)
               VALUES (?, ?, ?, ?, ?, ?, NULL)"#,
        )
        .bind(&fields.name)
        .bind(&fields.desc)
        .bind(fields.price)
        .bind(&fields.image)
        .bind(if fields.instock { 1 } else { 0 })
        .bind(created.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: fields.name,
            desc: fields.desc,
            price: fields.price,
            image: fields.image,
            instock: fields.instock,
            created,
            modified: None,
        })
    }

    /// Overwrite every writable column by id and stamp `modified`.
    pub async fn update(&self, id: i64, fields: ProductFields) -> Result<Product, CatalogError> {
        let modified = Utc::now();
        let result = sqlx::query(
            r#"UPDATE product SET
                name = ?,
                "desc" = ?,
                price = ?,
                image = ?,
                instock = ?,
                modified = ?
              WHERE id = ?"#,
        )
        .bind(fields.name)
        .bind(fields.desc)
        .bind(fields.price)
        .bind(fields.image)
        .bind(if fields.instock { 1 } else { 0 })
        .bind(modified.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(id));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    fn row_to_model(row: SqliteRow) -> Result<Product, CatalogError> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let desc: String = row.try_get("desc")?;
        let price: f64 = row.try_get("price")?;
        let image: Option<String> = row.try_get("image")?;
        let instock_i: i64 = row.try_get("instock")?;
        let created_str: String = row.try_get("created")?;
        let modified_str: Option<String> = row.try_get("modified")?;

        let created = parse_timestamp(&created_str)?;
        let modified = modified_str.as_deref().map(parse_timestamp).transpose()?;

        Ok(Product {
            id,
            name,
            desc,
            price,
            image,
            instock: instock_i != 0,
            created,
            modified,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CatalogError> {
    let ts = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc);
    Ok(ts)
}
