//! Error types for atrophy.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while loading, analysing or saving meshes and images.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no cells.
    #[error("mesh has no cells")]
    EmptyMesh,

    /// A cell references an invalid vertex index.
    #[error("cell {cell} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The cell index.
        cell: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a mesh or image from file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving a mesh to file.
    #[error("failed to save {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// A required named data array is absent.
    #[error("mesh has no cell array named '{name}'")]
    MissingArray {
        /// Name of the array that was looked up.
        name: String,
    },

    /// Two meshes that must share connectivity have different point counts.
    #[error("point count mismatch: expected {expected}, found {found}")]
    PointCountMismatch {
        /// Point count of the reference mesh.
        expected: usize,
        /// Point count of the other mesh.
        found: usize,
    },

    /// Two per-cell sequences that must line up have different lengths.
    #[error("cell count mismatch: expected {expected}, found {found}")]
    CellCountMismatch {
        /// Expected number of cells.
        expected: usize,
        /// Actual number of cells.
        found: usize,
    },

    /// The mesh contains a cell type the operation cannot handle.
    #[error("cell {cell} has unsupported type {kind}")]
    UnsupportedCell {
        /// The cell index.
        cell: usize,
        /// Description of the offending cell type.
        kind: String,
    },

    /// Image header or volume is not usable.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a load error for `path`.
    pub fn load<P: Into<PathBuf>, M: Into<String>>(path: P, message: M) -> Self {
        MeshError::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a save error for `path`.
    pub fn save<P: Into<PathBuf>, M: Into<String>>(path: P, message: M) -> Self {
        MeshError::SaveError {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::invalid_param("regions", 0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter: regions = 0 (must be positive)"
        );

        let err = MeshError::MissingArray {
            name: "jacobian".to_string(),
        };
        assert!(err.to_string().contains("jacobian"));

        let err = MeshError::load("a.vtk", "bad header");
        assert!(err.to_string().contains("a.vtk"));
        assert!(err.to_string().contains("bad header"));
    }
}
