//! Name-indexed artifact construction and discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::artifact::{
    ArtifactError, ArtifactFile, ArtifactResult, JsonArtifact, JsonlArtifact, TomlArtifact,
};

/// Format tags accepted by [`open_artifact`]. Each doubles as the file
/// extension matched by [`discover`].
pub const SUPPORTED_FORMATS: &[&str] = &["json", "toml", "jsonl"];

/// Build an artifact handle from a format tag and a path.
pub fn open_artifact(format: &str, path: impl Into<PathBuf>) -> ArtifactResult<Box<dyn ArtifactFile>> {
    match format {
        "json" => Ok(Box::new(JsonArtifact::new(path))),
        "toml" => Ok(Box::new(TomlArtifact::new(path))),
        "jsonl" => Ok(Box::new(JsonlArtifact::new(path))),
        other => Err(ArtifactError::UnknownFormat {
            format: other.to_string(),
            supported: SUPPORTED_FORMATS.join(", "),
        }),
    }
}

/// Walk `root` and return every artifact path of the given format,
/// sorted for stable processing order.
pub fn discover(root: &Path, format: &str) -> ArtifactResult<Vec<PathBuf>> {
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(ArtifactError::UnknownFormat {
            format: format.to_string(),
            supported: SUPPORTED_FORMATS.join(", "),
        });
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| ArtifactError::Io(e.into()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == format)
        {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}
