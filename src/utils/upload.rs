use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{
    consts::upload_const::{ALLOWED_IMAGE_EXTENSIONS, IMAGE_DIR},
    errors::{Error, Result},
};

pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduces a client-supplied name to a plain file name that cannot escape the upload directory.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Stores an image as `<uuid>_<name>` and returns the stored name.
pub async fn save_image(upload_dir: &str, filename: &str, bytes: &[u8]) -> Result<String> {
    if !allowed_file(filename) {
        return Err(Error::Validation(format!(
            "File type not allowed, expected one of: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )));
    }

    let dir = Path::new(upload_dir).join(IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let stored = format!("{}_{}", Uuid::new_v4(), secure_filename(filename));
    tokio::fs::write(dir.join(&stored), bytes).await?;
    tracing::info!("Stored upload {stored}");

    Ok(stored)
}

pub fn image_path(upload_dir: &str, stored: &str) -> PathBuf {
    Path::new(upload_dir).join(IMAGE_DIR).join(stored)
}

pub async fn remove_image(upload_dir: &str, stored: &str) {
    if let Err(e) = tokio::fs::remove_file(image_path(upload_dir, stored)).await {
        tracing::warn!("Could not remove upload {stored}: {e}");
    }
}
