use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{Product, ProductStorage, connect};
use crate::error::CatalogError;
use crate::middleware::product_form::{ImageUpload, ProductForm};
use crate::service::image_store::ImageStore;
use crate::service::upload_validator::{ExtensionAllowList, UploadValidator};

/// Why a create/update submission was ignored. None of these write anything.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum UploadRejection {
    #[error("No file part")]
    MissingFile,
    #[error("No selected file")]
    EmptyFilename,
    #[error("File type not allowed: {0}")]
    DisallowedExtension(String),
}

impl UploadRejection {
    /// Missing or empty uploads send the client back to the form URL;
    /// a disallowed file falls through to the form page itself.
    pub fn redirects(&self) -> bool {
        matches!(self, Self::MissingFile | Self::EmptyFilename)
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Saved(Product),
    Rejected(UploadRejection),
}

/// Orchestrates upload checks, image storage and the product table.
#[derive(Clone)]
pub struct ProductService {
    storage: ProductStorage,
    images: ImageStore,
    validator: Arc<dyn UploadValidator>,
}

impl ProductService {
    pub fn new(
        storage: ProductStorage,
        images: ImageStore,
        validator: Arc<dyn UploadValidator>,
    ) -> Self {
        Self {
            storage,
            images,
            validator,
        }
    }

    /// Connect the database, create the schema and the upload directory.
    pub async fn from_config(cfg: &Config) -> Result<Self, CatalogError> {
        let pool = connect(&cfg.database_url).await?;
        let storage = ProductStorage::new(pool);
        storage.init_schema().await?;
        let images = ImageStore::open(cfg.upload_dir.clone()).await?;
        let validator = Arc::new(ExtensionAllowList::new(&cfg.allowed_extensions));
        Ok(Self::new(storage, images, validator))
    }

    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        self.storage.list_all().await
    }

    pub async fn get(&self, id: i64) -> Result<Product, CatalogError> {
        self.storage.get(id).await
    }

    pub async fn create(&self, form: ProductForm) -> Result<SubmitOutcome, CatalogError> {
        let upload = match self.accept_upload(form.file.as_ref()) {
            Ok(upload) => upload,
            Err(rejection) => return Ok(SubmitOutcome::Rejected(rejection)),
        };
        // parse before touching the filesystem so a bad form leaves no file behind
        form.fields(None)?;

        let image = self.images.save(&upload.bytes[..], &upload.filename).await?;
        let product = self.storage.create(form.fields(Some(image))?).await?;
        info!(id = product.id, name = %product.name, "created product");
        Ok(SubmitOutcome::Saved(product))
    }

    /// Overwrite every field of `existing`; the image is only replaced by a valid upload,
    /// and without one nothing is written at all.
    pub async fn update(
        &self,
        existing: Product,
        form: ProductForm,
    ) -> Result<SubmitOutcome, CatalogError> {
        let upload = match self.accept_upload(form.file.as_ref()) {
            Ok(upload) => upload,
            Err(rejection) => return Ok(SubmitOutcome::Rejected(rejection)),
        };
        form.fields(None)?;

        let image = self.images.save(&upload.bytes[..], &upload.filename).await?;
        let product = self
            .storage
            .update(existing.id, form.fields(Some(image))?)
            .await?;
        info!(id = product.id, name = %product.name, "updated product");
        Ok(SubmitOutcome::Saved(product))
    }

    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        self.storage.delete(id).await?;
        info!(id, "deleted product");
        Ok(())
    }

    fn accept_upload<'a>(
        &self,
        file: Option<&'a ImageUpload>,
    ) -> Result<&'a ImageUpload, UploadRejection> {
        let rejection = match file {
            None => UploadRejection::MissingFile,
            Some(upload) if upload.filename.is_empty() => UploadRejection::EmptyFilename,
            Some(upload) if !self.validator.is_allowed(&upload.filename) => {
                UploadRejection::DisallowedExtension(upload.filename.clone())
            }
            Some(upload) => return Ok(upload),
        };
        warn!(reason = %rejection, "ignoring product submission");
        Err(rejection)
    }
}
