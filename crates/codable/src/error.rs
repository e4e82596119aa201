//! Error type shared by the codable containers and the codec boundary.

use codable_path::CodingPath;
use thiserror::Error;

/// Variant names in the order the decode cascade tries them.
pub const CASCADE_VARIANTS: &str = "Int, Double, Float, String, Bool, Map, Array";

#[derive(Debug, Error)]
pub enum CodableError {
    #[error(
        "type mismatch at {path}: expected one of [{expected}], found {found}",
        expected = CASCADE_VARIANTS
    )]
    TypeMismatch {
        path: CodingPath,
        found: &'static str,
    },
    #[error("invalid coding key `{key}`")]
    InvalidCodingKey { key: String },
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CodableError {
    pub fn type_mismatch(path: &CodingPath, found: &'static str) -> Self {
        CodableError::TypeMismatch {
            path: path.clone(),
            found,
        }
    }

    pub fn invalid_coding_key(key: impl Into<String>) -> Self {
        CodableError::InvalidCodingKey { key: key.into() }
    }

    /// The decode path for cascade failures.
    pub fn path(&self) -> Option<&CodingPath> {
        match self {
            CodableError::TypeMismatch { path, .. } => Some(path),
            _ => None,
        }
    }
}

pub type Result<T, E = CodableError> = std::result::Result<T, E>;
