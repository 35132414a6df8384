//! Turning command-line image arguments into wizard selections.

use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::controller::events::ImageSelection;

const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// `http(s)` URLs are used as presets; anything else is read as a local file
/// and embedded as a `data:` URL.
pub async fn load_selection(input: &str) -> Result<ImageSelection> {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(ImageSelection::preset(input));
    }

    let path = Path::new(input);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image '{}'", path.display()))?;
    Ok(ImageSelection::upload(to_data_url(path, &bytes)?))
}

pub fn to_data_url(path: &Path, bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        bail!("image '{}' is empty", path.display());
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        bail!(
            "image '{}' exceeds {} bytes",
            path.display(),
            MAX_IMAGE_BYTES
        );
    }
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        bail!("'{}' is not an image ({mime})", path.display());
    }
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
#[path = "tests/images_tests.rs"]
mod tests;
