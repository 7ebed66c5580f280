//! # Error Types
//!
//! Error handling for the framewire codec.
//!
//! This module defines every failure that can surface from an encode or decode
//! call, from structural problems in the object graph to corrupted buffers and
//! transport failures.
//!
//! ## Error Categories
//! - **Graph Errors**: nesting ceiling exceeded, values the codec cannot frame
//! - **Stream Errors**: integrity mismatch, truncated frames, shape mismatch
//! - **Compression Errors**: compression failures, size limit violations
//! - **I/O Errors**: transfer and configuration file failures
//!
//! None of these are retried internally. Every error aborts the whole call and
//! is surfaced to the caller.
//!
//! ## Example Usage
//! ```rust
//! use framewire::core::codec::Codec;
//! use framewire::error::{CodecError, Result};
//!
//! fn roundtrip(codec: &Codec, value: &Vec<i32>) -> Result<Vec<i32>> {
//!     let bytes = codec.encode(value)?;
//!     codec.decode::<Vec<i32>>(&bytes)
//! }
//!
//! let codec = Codec::default();
//! match roundtrip(&codec, &vec![1, 2, 3]) {
//!     Ok(values) => assert_eq!(values, vec![1, 2, 3]),
//!     Err(CodecError::IntegrityMismatch) => panic!("corrupted"),
//!     Err(e) => panic!("unexpected: {e}"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Structural errors
    pub const ERR_MALFORMED_RECORD: &str = "Record declares the same field name twice";
    pub const ERR_CONVERTER_TYPE: &str = "Converter produced a value of the wrong type";
    pub const ERR_CELL_BORROWED: &str = "Shared cell is mutably borrowed during encode";
    pub const ERR_NO_CONVERTER: &str = "No converter registered for opaque type";

    /// Stream errors
    pub const ERR_TRAILING_BYTES: &str = "Root frame does not span the whole body";
    pub const ERR_FIELD_COUNT: &str = "Frame count does not match the record field count";
    pub const ERR_ARRAY_LENGTH: &str = "Frame count does not match the fixed array length";
    pub const ERR_PRIMITIVE_WIDTH: &str = "Payload width does not match the primitive type";
    pub const ERR_INVALID_UTF8: &str = "Text payload is not valid UTF-8";
    pub const ERR_INVALID_CHAR: &str = "Payload is not a valid Unicode scalar value";
    pub const ERR_INVALID_BOOL: &str = "Payload is not a valid boolean byte";

    /// Transfer errors
    pub const ERR_CONNECTION_CLOSED: &str = "Connection closed before any data arrived";
}

// CodecError is the single error type for every codec operation
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Nesting ceiling exceeded: depth {depth} > {ceiling} (cyclic reference or structure too deep)")]
    NestingExceeded { depth: usize, ceiling: usize },

    #[error("Integrity check failed: content hash mismatch")]
    IntegrityMismatch,

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("Truncated frame: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Buffer too large: {0} bytes")]
    OversizedBuffer(usize),

    #[error("Compression failed")]
    CompressionFailure,

    #[error("Decompression failed")]
    DecompressionFailure,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Timeout occurred")]
    Timeout,
}

impl CodecError {
    /// Short, stable label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::Io(_) => "io",
            CodecError::NestingExceeded { .. } => "nesting_exceeded",
            CodecError::IntegrityMismatch => "integrity_mismatch",
            CodecError::ShapeMismatch(_) => "shape_mismatch",
            CodecError::UnsupportedValue(_) => "unsupported_value",
            CodecError::Truncated { .. } => "truncated",
            CodecError::OversizedFrame(_) => "oversized_frame",
            CodecError::OversizedBuffer(_) => "oversized_buffer",
            CodecError::CompressionFailure => "compression_failure",
            CodecError::DecompressionFailure => "decompression_failure",
            CodecError::ConfigError(_) => "config",
            CodecError::TransportError(_) => "transport",
            CodecError::Timeout => "timeout",
        }
    }
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;
