use std::collections::HashSet;

/// Decides whether a client-supplied filename may be stored as a product image.
pub trait UploadValidator: Send + Sync {
    fn is_allowed(&self, filename: &str) -> bool;
}

/// Suffix check against a configured set of extensions, case-insensitive.
/// Only the text after the last `.` is considered; file contents are never inspected.
pub struct ExtensionAllowList {
    extensions: HashSet<String>,
}

impl ExtensionAllowList {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl UploadValidator for ExtensionAllowList {
    fn is_allowed(&self, filename: &str) -> bool {
        filename
            .rsplit_once('.')
            .is_some_and(|(_, ext)| self.extensions.contains(&ext.to_ascii_lowercase()))
    }
}
