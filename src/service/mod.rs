pub mod catalog;
pub mod image_store;
pub mod upload_validator;

pub use catalog::{ProductService, SubmitOutcome, UploadRejection};
pub use image_store::ImageStore;
pub use upload_validator::{ExtensionAllowList, UploadValidator};
