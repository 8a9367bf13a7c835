pub mod not_found;
pub mod product_form;

pub use not_found::{NotFoundPage, render_not_found};
pub use product_form::{ImageUpload, ProductForm};
