use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use crate::error::CatalogError;

/// Writes uploaded images into a single directory.
///
/// Files are keyed by their sanitized client filename only. A second upload
/// with the same name replaces the first; concurrent writers race and the
/// last one wins.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Use `dir` as the upload directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stream `reader` to `<dir>/<secure_filename(filename)>` and return the stored name.
    pub async fn save<R>(&self, mut reader: R, filename: &str) -> Result<String, CatalogError>
    where
        R: AsyncRead + Unpin,
    {
        let stored = secure_filename(filename).ok_or(CatalogError::InvalidFilename)?;
        let path = self.dir.join(&stored);

        let mut file = fs::File::create(&path).await?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;

        info!(path = %path.display(), bytes = written, "stored image");
        Ok(stored)
    }
}

/// Reduce a client filename to a safe single path component.
///
/// The name is NFKD-normalized and whatever is still non-ASCII is dropped, path separators become spaces, runs of
/// whitespace become `_`, anything outside `[A-Za-z0-9_.-]` is removed and
/// leading or trailing `.`/`_` are stripped. Returns `None` when nothing is left.
pub fn secure_filename(filename: &str) -> Option<String> {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_ascii_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
