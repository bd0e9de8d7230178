//! Error types for asset loading

use std::path::PathBuf;

use thiserror::Error;

/// A malformed Wavefront OBJ line. Line numbers are 1-based.
#[derive(Error, Debug, PartialEq)]
pub enum ObjError {
    #[error("line {line}: expected {expected} numbers after '{keyword}'")]
    MissingComponent {
        line: usize,
        keyword: &'static str,
        expected: usize,
    },

    #[error("line {line}: invalid number '{text}'")]
    InvalidNumber { line: usize, text: String },

    #[error("line {line}: invalid face corner '{text}'")]
    InvalidCorner { line: usize, text: String },

    #[error("line {line}: face has {corners} corners, need at least 3")]
    DegenerateFace { line: usize, corners: usize },

    #[error("line {line}: {attribute} index {index} is out of range ({count} defined)")]
    IndexOutOfRange {
        line: usize,
        attribute: &'static str,
        index: i64,
        count: usize,
    },

    #[error("no faces defined")]
    NoFaces,
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed mesh {}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: ObjError,
    },

    #[error("failed to decode image {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{stage} shader failed to compile: {message}")]
    Shader { stage: &'static str, message: String },
}

pub type AssetResult<T> = Result<T, AssetError>;
