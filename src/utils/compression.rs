//! # Compression
//!
//! The pluggable compression stage applied to the whole sealed buffer: last on
//! encode, first on decode.
//!
//! The codec consumes any [`Compressor`]. Two built-in providers ship with the
//! crate through [`BuiltinCompressor`]:
//! - **LZ4** (default): fast, size-prepended block format
//! - **Zstd**: better ratio, configurable level
//!
//! ## Security
//! Decompression output is capped at the codec's buffer limit, passed in on
//! every call, so that a small hostile buffer cannot claim an enormous output
//! size and exhaust memory.

use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Default Zstd level for [`BuiltinCompressor`]
pub const DEFAULT_ZSTD_LEVEL: i32 = 1;

/// A byte transform whose `decompress` exactly inverts `compress`.
///
/// Implementations are shared across threads by the codec.
pub trait Compressor: Send + Sync {
    /// Compress a sealed buffer
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Invert [`Compressor::compress`], producing at most `max_output` bytes.
    ///
    /// The codec passes its own buffer limit so that anything it agreed to
    /// encode also decompresses.
    fn decompress(&self, data: &[u8], max_output: usize) -> Result<Vec<u8>>;

    /// Name used in logs
    fn name(&self) -> &'static str {
        "custom"
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    #[default]
    Lz4,
    Zstd,
}

impl CompressionKind {
    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            CompressionKind::Lz4 => "lz4",
            CompressionKind::Zstd => "zstd",
        }
    }
}

/// Compress with an explicit Zstd level (ignored for LZ4)
pub fn compress_with_level(data: &[u8], kind: &CompressionKind, level: i32) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        CompressionKind::Zstd => {
            let mut out = Vec::new();
            zstd::stream::copy_encode(data, &mut out, level)
                .map_err(|_| CodecError::CompressionFailure)?;
            Ok(out)
        }
    }
}

/// Decompress, refusing to produce more than `max_output` bytes
pub fn decompress_with_limit(
    data: &[u8],
    kind: &CompressionKind,
    max_output: usize,
) -> Result<Vec<u8>> {
    match *kind {
        CompressionKind::Lz4 => {
            // lz4_flex prepends the uncompressed size as 4 little-endian bytes;
            // check it before lz4_flex allocates
            if data.len() < 4 {
                return Err(CodecError::DecompressionFailure);
            }

            let claimed_size = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
            if claimed_size > max_output {
                return Err(CodecError::DecompressionFailure);
            }

            let decompressed = lz4_flex::decompress_size_prepended(data)
                .map_err(|_| CodecError::DecompressionFailure)?;

            if decompressed.len() > max_output {
                return Err(CodecError::DecompressionFailure);
            }
            Ok(decompressed)
        }
        CompressionKind::Zstd => {
            let mut out = Vec::new();
            let mut reader = zstd::stream::Decoder::new(data)
                .map_err(|_| CodecError::DecompressionFailure)?;

            // Read in chunks to enforce size limit
            let mut buffer = [0u8; 8192];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => break, // EOF
                    Ok(n) => {
                        out.extend_from_slice(&buffer[..n]);
                        if out.len() > max_output {
                            return Err(CodecError::DecompressionFailure);
                        }
                    }
                    Err(_) => return Err(CodecError::DecompressionFailure),
                }
            }
            Ok(out)
        }
    }
}

/// LZ4 or Zstd with a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinCompressor {
    kind: CompressionKind,
    level: i32,
}

impl BuiltinCompressor {
    pub fn new(kind: CompressionKind) -> Self {
        Self {
            kind,
            level: DEFAULT_ZSTD_LEVEL,
        }
    }

    pub fn lz4() -> Self {
        Self::new(CompressionKind::Lz4)
    }

    pub fn zstd(level: i32) -> Self {
        Self::new(CompressionKind::Zstd).with_level(level)
    }

    /// Set the Zstd level (ignored for LZ4)
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn kind(&self) -> CompressionKind {
        self.kind
    }
}

impl Default for BuiltinCompressor {
    fn default() -> Self {
        Self::lz4()
    }
}

impl Compressor for BuiltinCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        compress_with_level(data, &self.kind, self.level)
    }

    fn decompress(&self, data: &[u8], max_output: usize) -> Result<Vec<u8>> {
        decompress_with_limit(data, &self.kind, max_output)
    }

    fn name(&self) -> &'static str {
        self.kind.name()
    }
}
