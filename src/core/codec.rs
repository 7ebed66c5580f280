//! # Codec
//!
//! Composes the recursive framing, the integrity envelope and the optional
//! compression stage into two calls:
//!
//! ```text
//! encode: value -> Frame -> Frame || md5 -> compress?
//! decode: bytes -> decompress? -> verify md5 -> Frame -> value
//! ```
//!
//! A codec owns its converter registry. Registration takes `&mut self`, so a
//! codec shared by reference across threads is frozen for the duration of the
//! borrow; wrap it in a `RwLock` if converters must change while in use.
//!
//! ## Example
//! ```rust,ignore
//! let mut codec = Codec::default();
//! codec.register::<Celsius, _, _>(
//!     |c| Ok(c.0.to_le_bytes().to_vec()),
//!     |b| {
//!         let raw = b.try_into().map_err(|_| CodecError::ShapeMismatch("celsius".into()))?;
//!         Ok(Celsius(f64::from_le_bytes(raw)))
//!     },
//! );
//! let bytes = codec.encode(&readings)?;
//! let back: Vec<Celsius> = codec.decode(&bytes)?;
//! ```

use crate::config::{CodecConfig, CompressionConfig, DEFAULT_NESTING_CEILING, MAX_BUFFER_SIZE};
use crate::core::frame::read_frame;
use crate::core::integrity;
use crate::core::registry::Registry;
use crate::core::shape::{FrameReader, FrameWriter, Shape};
use crate::error::{constants, CodecError, Result};
use crate::utils::compression::{BuiltinCompressor, Compressor};
use crate::utils::metrics::{global_metrics, Timer};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Recursive self-framing binary codec
#[derive(Clone)]
pub struct Codec {
    registry: Registry,
    compressor: Option<Arc<dyn Compressor>>,
    compressing: bool,
    nesting_ceiling: usize,
    max_buffer_size: usize,
}

impl Codec {
    /// Create a codec with the default registry and the given compressor.
    ///
    /// Compression is enabled whenever a compressor is supplied.
    pub fn new(compressor: Option<Arc<dyn Compressor>>) -> Self {
        Self {
            registry: Registry::new(),
            compressing: compressor.is_some(),
            compressor,
            nesting_ceiling: DEFAULT_NESTING_CEILING,
            max_buffer_size: MAX_BUFFER_SIZE,
        }
    }

    /// Codec without a compression stage
    pub fn plain() -> Self {
        Self::new(None)
    }

    /// Build a codec from configuration sections
    ///
    /// # Errors
    /// Returns `CodecError::ConfigError` if either section fails validation
    pub fn from_config(codec: &CodecConfig, compression: &CompressionConfig) -> Result<Self> {
        let mut errors = codec.validate();
        errors.extend(compression.validate());
        if !errors.is_empty() {
            return Err(CodecError::ConfigError(errors.join("; ")));
        }

        let provider = BuiltinCompressor::new(compression.kind).with_level(compression.level);

        let mut built = Self::new(Some(Arc::new(provider)));
        built.compressing = compression.enabled;
        built.nesting_ceiling = codec.nesting_ceiling;
        built.max_buffer_size = codec.max_buffer_size;
        Ok(built)
    }

    /// Replace the compression provider, enabling compression when `Some`
    pub fn with_compressor(mut self, compressor: Option<Arc<dyn Compressor>>) -> Self {
        self.compressing = compressor.is_some();
        self.compressor = compressor;
        self
    }

    pub fn with_nesting_ceiling(mut self, ceiling: usize) -> Self {
        self.nesting_ceiling = ceiling;
        self
    }

    pub fn with_max_buffer_size(mut self, max: usize) -> Self {
        self.max_buffer_size = max;
        self
    }

    /// Turn the compression stage on or off. Has no effect without a compressor.
    pub fn set_compressing(&mut self, enabled: bool) {
        self.compressing = enabled;
    }

    /// Whether encoded buffers pass through the compressor
    pub fn compressing(&self) -> bool {
        self.compressing && self.compressor.is_some()
    }

    pub fn nesting_ceiling(&self) -> usize {
        self.nesting_ceiling
    }

    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a converter for `T`, replacing any earlier one
    pub fn register<T, E, D>(&mut self, encode: E, decode: D)
    where
        T: Any,
        E: Fn(&T) -> Result<Vec<u8>> + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<T> + Send + Sync + 'static,
    {
        self.registry.register(encode, decode);
    }

    /// Copy every converter of `other` into this codec, overwriting on collision
    pub fn absorb(&mut self, other: &Codec) {
        self.registry.merge(&other.registry);
    }

    /// Encode `value` into a self-contained buffer.
    ///
    /// # Errors
    /// - `CodecError::NestingExceeded` for cyclic or too-deep values
    /// - `CodecError::OversizedBuffer` if the buffer exceeds the configured maximum
    /// - any error raised by a converter or the compressor
    pub fn encode<T: Shape>(&self, value: &T) -> Result<Vec<u8>> {
        let _timer = Timer::start("encode");
        let metrics = global_metrics();

        match self.encode_inner(value) {
            Ok(bytes) => {
                metrics.encode_success(bytes.len() as u64);
                debug!(
                    shape = std::any::type_name::<T>(),
                    bytes = bytes.len(),
                    compressed = self.compressing(),
                    "Encoded value"
                );
                Ok(bytes)
            }
            Err(e) => {
                metrics.encode_failed(&e);
                debug!(shape = std::any::type_name::<T>(), error = %e, "Encode failed");
                Err(e)
            }
        }
    }

    fn encode_inner<T: Shape>(&self, value: &T) -> Result<Vec<u8>> {
        let mut writer = FrameWriter::new(&self.registry, self.nesting_ceiling);
        writer.write_value(value)?;
        let sealed = integrity::seal(writer.into_bytes());

        if sealed.len() > self.max_buffer_size {
            return Err(CodecError::OversizedBuffer(sealed.len()));
        }

        match self.active_compressor() {
            Some(compressor) => {
                global_metrics().compression_attempt();
                compressor.compress(&sealed)
            }
            None => Ok(sealed),
        }
    }

    /// Rebuild a `T` from a buffer produced by [`Codec::encode`].
    ///
    /// The codec must use the same compression setting as the encoder.
    ///
    /// # Errors
    /// - `CodecError::IntegrityMismatch` if the content hash does not match
    /// - `CodecError::ShapeMismatch` / `CodecError::Truncated` if the frames do not fit `T`
    /// - `CodecError::NestingExceeded` if the frames nest past the ceiling
    /// - `CodecError::DecompressionFailure` if the compressed buffer is invalid
    pub fn decode<T: Shape>(&self, bytes: &[u8]) -> Result<T> {
        let _timer = Timer::start("decode");
        let metrics = global_metrics();

        match self.decode_inner(bytes) {
            Ok(value) => {
                metrics.decode_success(bytes.len() as u64);
                debug!(
                    shape = std::any::type_name::<T>(),
                    bytes = bytes.len(),
                    "Decoded value"
                );
                Ok(value)
            }
            Err(e) => {
                metrics.decode_failed(&e);
                warn!(
                    shape = std::any::type_name::<T>(),
                    kind = e.kind(),
                    error = %e,
                    "Decode failed"
                );
                Err(e)
            }
        }
    }

    fn decode_inner<T: Shape>(&self, bytes: &[u8]) -> Result<T> {
        if bytes.len() > self.max_buffer_size {
            return Err(CodecError::OversizedBuffer(bytes.len()));
        }

        let plain: Cow<'_, [u8]> = match self.active_compressor() {
            Some(compressor) => {
                global_metrics().decompression_attempt();
                Cow::Owned(compressor.decompress(bytes, self.max_buffer_size)?)
            }
            None => Cow::Borrowed(bytes),
        };

        let body = integrity::open(&plain)?;
        let (payload, rest) = read_frame(body)?;
        if !rest.is_empty() {
            return Err(CodecError::ShapeMismatch(format!(
                "{}: {} bytes after the root frame",
                constants::ERR_TRAILING_BYTES,
                rest.len()
            )));
        }

        let mut reader = FrameReader::new(&self.registry, self.nesting_ceiling);
        reader.read_value(payload)
    }

    fn active_compressor(&self) -> Option<&dyn Compressor> {
        if self.compressing {
            self.compressor.as_deref()
        } else {
            None
        }
    }
}

impl Default for Codec {
    /// LZ4-compressing codec with the default registry
    fn default() -> Self {
        Self::new(Some(Arc::new(BuiltinCompressor::lz4())))
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("registry", &self.registry)
            .field("compressor", &self.compressor.as_ref().map(|c| c.name()))
            .field("compressing", &self.compressing)
            .field("nesting_ceiling", &self.nesting_ceiling)
            .field("max_buffer_size", &self.max_buffer_size)
            .finish()
    }
}
