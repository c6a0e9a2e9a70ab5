//! Artifact file adapters.
//!
//! Every adapter moves one `serde_json::Value` in or out of a file; the
//! value shape is the artifact's own business. Adapters hold only a path —
//! files are opened per operation, so an artifact handle stays valid
//! across retries and reruns.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Errors that can occur reading or writing artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("unknown artifact format `{format}`; supported formats: {supported}")]
    UnknownFormat { format: String, supported: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(String),
}

/// A file holding one typed artifact.
pub trait ArtifactFile: Send + Sync + std::fmt::Debug {
    fn path(&self) -> &Path;

    /// Read the artifact into a JSON value.
    fn read_value(&self) -> ArtifactResult<serde_json::Value>;

    /// Write the artifact from a JSON value, replacing the file.
    fn write_value(&self, value: &serde_json::Value) -> ArtifactResult<()>;
}

/// Plain JSON document.
#[derive(Debug)]
pub struct JsonArtifact {
    path: PathBuf,
}

impl JsonArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArtifactFile for JsonArtifact {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_value(&self) -> ArtifactResult<serde_json::Value> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_value(&self, value: &serde_json::Value) -> ArtifactResult<()> {
        let mut content = serde_json::to_string_pretty(value)?;
        content.push('\n');
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// TOML document. The root must be a table when writing.
#[derive(Debug)]
pub struct TomlArtifact {
    path: PathBuf,
}

impl TomlArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArtifactFile for TomlArtifact {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_value(&self) -> ArtifactResult<serde_json::Value> {
        let content = std::fs::read_to_string(&self.path)?;
        let value: toml::Value = content
            .parse()
            .map_err(|e: toml::de::Error| ArtifactError::Toml(e.to_string()))?;
        Ok(serde_json::to_value(value)?)
    }

    fn write_value(&self, value: &serde_json::Value) -> ArtifactResult<()> {
        let content =
            toml::to_string_pretty(value).map_err(|e| ArtifactError::Toml(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// JSON Lines: one value per line, read back as an array.
#[derive(Debug)]
pub struct JsonlArtifact {
    path: PathBuf,
}

impl JsonlArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArtifactFile for JsonlArtifact {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_value(&self) -> ArtifactResult<serde_json::Value> {
        let file = std::fs::File::open(&self.path)?;
        let mut values = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            values.push(serde_json::from_str(&line)?);
        }
        Ok(serde_json::Value::Array(values))
    }

    fn write_value(&self, value: &serde_json::Value) -> ArtifactResult<()> {
        let mut file = std::fs::File::create(&self.path)?;
        // Arrays are written element-per-line; anything else is one record.
        let records = match value {
            serde_json::Value::Array(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        };
        for record in records {
            writeln!(file, "{}", serde_json::to_string(record)?)?;
        }
        Ok(())
    }
}
