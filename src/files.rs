use crate::{
    error::{IdeationError, Result},
    models::ImageArtifact,
};
use chrono::Utc;
use std::path::{Path, PathBuf};

const DOWNLOAD_PREFIX: &str = "gemini-ideation";

/// Reads a single image file into an artifact.
pub async fn read_image_file(path: impl AsRef<Path>) -> Result<ImageArtifact> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        log::error!("Failed to read {}: {}", path.display(), e);
        if e.kind() == std::io::ErrorKind::NotFound {
            IdeationError::validation(format!("No image file found at {}.", path.display()))
        } else {
            IdeationError::FileError("Failed to read file as Base64.".into())
        }
    })?;

    if bytes.is_empty() {
        return Err(IdeationError::FileError(
            "Failed to read file as Base64.".into(),
        ));
    }

    let mime_type = sniff_mime(&bytes)
        .or_else(|| mime_from_extension(path))
        .ok_or_else(|| {
            IdeationError::FileError(format!("{} is not a supported image file.", path.display()))
        })?;

    log::debug!(
        "Loaded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );
    Ok(ImageArtifact::from_bytes(&bytes, mime_type))
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

pub fn timestamped_name(extension: &str) -> String {
    format!(
        "{}-{}.{}",
        DOWNLOAD_PREFIX,
        Utc::now().timestamp_millis(),
        extension
    )
}

/// Writes the artifact's bytes into `dir` under a timestamped name.
pub async fn save_image(artifact: &ImageArtifact, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let bytes = artifact.decode()?;
    let path = dir.as_ref().join(timestamped_name(artifact.extension()));
    write_file(&path, &bytes).await?;
    log::info!("Image saved to: {}", path.display());
    Ok(path)
}

pub async fn save_video(bytes: &[u8], dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(timestamped_name("mp4"));
    write_file(&path, bytes).await?;
    log::info!("Video saved to: {}", path.display());
    Ok(path)
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
