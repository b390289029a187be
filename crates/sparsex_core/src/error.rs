use crate::{device::Device, dtype::DType};
use thiserror::Error;

/// Fieldless view of [`Error`], convenient for matching in binding layers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ContextMismatch,
    NotContiguous,
    ShapeMismatch,
    BroadcastIncompatible,
    UnsupportedFormat,
    UnsupportedDispatch,
    DTypeMismatch,
    MultipleEdgeTypes,
    InvalidOffsets,
    IndexOutOfBounds,
    InvalidArgument,
    InvalidDevice,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Expected device context {expected}, but got {got} for {name}")]
    ContextMismatch { name: String, expected: Device, got: Device },

    #[error("Expected {name} to be a contiguous tensor")]
    NotContiguous { name: String },

    #[error("Shape mismatch for {name}: {message}")]
    ShapeMismatch { name: String, message: String },

    #[error("Cannot broadcast feature shapes {lhs:?} and {rhs:?}")]
    BroadcastIncompatible { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("{op} only supports {allowed} formats")]
    UnsupportedFormat { op: &'static str, allowed: String },

    #[error("No {op} kernel for device {device}, index type {index}, feature type {precision}")]
    UnsupportedDispatch {
        op: &'static str,
        device: Device,
        index: DType,
        precision: DType,
    },

    #[error("DType mismatch for {name}: expected {expected}, got {got}")]
    DTypeMismatch { name: String, expected: DType, got: DType },

    #[error("Expected a graph with exactly one edge type, got {0}")]
    MultipleEdgeTypes(usize),

    #[error("Invalid segment offsets: {0}")]
    InvalidOffsets(String),

    #[error("Index out of bounds: index {index} is out of bounds for size {size}")]
    IndexOutOfBounds { index: i64, size: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid device: {0}")]
    InvalidDevice(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContextMismatch { .. } => ErrorKind::ContextMismatch,
            Self::NotContiguous { .. } => ErrorKind::NotContiguous,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::BroadcastIncompatible { .. } => ErrorKind::BroadcastIncompatible,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::UnsupportedDispatch { .. } => ErrorKind::UnsupportedDispatch,
            Self::DTypeMismatch { .. } => ErrorKind::DTypeMismatch,
            Self::MultipleEdgeTypes(_) => ErrorKind::MultipleEdgeTypes,
            Self::InvalidOffsets(_) => ErrorKind::InvalidOffsets,
            Self::IndexOutOfBounds { .. } => ErrorKind::IndexOutOfBounds,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidDevice(_) => ErrorKind::InvalidDevice,
        }
    }

    pub fn shape_mismatch(name: &str, message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
