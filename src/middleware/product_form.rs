use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
};

use crate::db::ProductFields;
use crate::error::CatalogError;

/// Multipart field carrying the product image.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Filename as sent by the client; may be empty when nothing was selected.
    pub filename: String,
    pub bytes: Bytes,
}

/// Raw create/update submission, before any validation.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub desc: Option<String>,
    pub instock: Option<String>,
    pub file: Option<ImageUpload>,
}

impl ProductForm {
    /// Build the column values for a product stored with `image`.
    ///
    /// `instock` is true for any non-empty value, `"false"` included.
    pub fn fields(&self, image: Option<String>) -> Result<ProductFields, CatalogError> {
        let name = required(&self.name, "name")?;
        let desc = required(&self.desc, "desc")?;
        let price_raw = required(&self.price, "price")?;
        let price = price_raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| CatalogError::BadRequest(format!("invalid price `{price_raw}`")))?;

        Ok(ProductFields {
            name,
            desc,
            price,
            image,
            instock: self.instock.as_deref().is_some_and(|s| !s.is_empty()),
        })
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, CatalogError> {
    value
        .clone()
        .ok_or_else(|| CatalogError::BadRequest(format!("missing form field `{field}`")))
}

impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| CatalogError::BadRequest(format!("invalid multipart payload: {e}")))?;

        Self::from_multipart(multipart).await
    }
}

impl ProductForm {
    /// Drain a multipart body into a form.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, CatalogError> {
        let mut form = ProductForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| CatalogError::BadRequest(format!("invalid multipart payload: {e}")))?
        {
            let field_name = field.name().map(str::to_owned).unwrap_or_default();
            if field_name == FILE_FIELD {
                // A plain text part named `file` is not an upload.
                let Some(filename) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let bytes = field.bytes().await.map_err(|e| {
                    CatalogError::BadRequest(format!("failed to read upload: {e}"))
                })?;
                form.file = Some(ImageUpload { filename, bytes });
                continue;
            }

            let slot = match field_name.as_str() {
                "name" => &mut form.name,
                "price" => &mut form.price,
                "desc" => &mut form.desc,
                "instock" => &mut form.instock,
                _ => continue,
            };
            let text = field
                .text()
                .await
                .map_err(|e| CatalogError::BadRequest(format!("failed to read `{field_name}`: {e}")))?;
            // first value wins, like a form lookup by key
            if slot.is_none() {
                *slot = Some(text);
            }
        }

        Ok(form)
    }
}
