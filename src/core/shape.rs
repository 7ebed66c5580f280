//! # Shapes and Dispatch
//!
//! A [`Shape`] is a type the codec knows how to frame. Every shape belongs to
//! one [`ShapeKind`], and the kind decides how the codec treats it:
//!
//! | Kind          | Payload                                  | Nesting level |
//! |---------------|------------------------------------------|---------------|
//! | `Primitive`   | raw native-endian bytes                  | no            |
//! | `Text`        | UTF-8 bytes (when no converter is set)   | no            |
//! | `Sequence`    | one frame per element, iteration order   | yes           |
//! | `Record`      | one frame per field, sorted by name      | yes           |
//! | `Transparent` | the inner value's frame (`Option`, `Box`)| no            |
//!
//! [`FrameWriter::write_value`] and [`FrameReader::read_value`] evaluate the
//! same dispatch order at every level of the graph:
//!
//! 1. absent value / zero-length frame
//! 2. registered converter for the exact type
//! 3. the shape's own payload encoding
//!
//! Both track the current depth and abort with
//! [`CodecError::NestingExceeded`] when a sequence or record would be entered
//! past the configured ceiling.

use crate::core::frame::{self, begin_frame, finish_frame};
use crate::core::registry::Registry;
use crate::error::{CodecError, Result};
use tracing::trace;

/// How the codec frames a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Fixed-width scalar
    Primitive,
    /// UTF-8 text
    Text,
    /// Ordered collection of elements
    Sequence,
    /// Composite with named fields
    Record,
    /// Wrapper that shares its inner value's frame
    Transparent,
}

impl ShapeKind {
    /// Whether entering a value of this kind consumes one nesting level
    #[inline]
    pub fn is_nested(self) -> bool {
        matches!(self, ShapeKind::Sequence | ShapeKind::Record)
    }
}

/// A type the codec can encode into a frame and rebuild from one.
///
/// Implementations exist for the primitive scalars, `String`, the standard
/// collections, tuples, `Option`, `Box`, `Arc` and `Rc<RefCell<_>>`.
/// Records are declared with [`wire_record!`](crate::wire_record).
pub trait Shape: Sized + 'static {
    /// How values of this type are framed
    const KIND: ShapeKind;

    /// Whether this value is absent and encodes as the null marker
    fn is_absent(&self) -> bool {
        false
    }

    /// The value a zero-length frame decodes to
    fn absent() -> Result<Self>;

    /// Write this value's payload.
    ///
    /// `Transparent` shapes write exactly one complete frame instead.
    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()>;

    /// Rebuild a value from a non-empty payload.
    fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self>;
}

/// Recursive frame encoder for one encode call
pub struct FrameWriter<'a> {
    registry: &'a Registry,
    buf: Vec<u8>,
    depth: usize,
    ceiling: usize,
}

impl<'a> FrameWriter<'a> {
    pub(crate) fn new(registry: &'a Registry, ceiling: usize) -> Self {
        Self {
            registry,
            buf: Vec::with_capacity(256),
            depth: 0,
            ceiling,
        }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Encode `value` as exactly one frame.
    pub fn write_value<T: Shape>(&mut self, value: &T) -> Result<()> {
        if value.is_absent() {
            frame::write_null(&mut self.buf);
            return Ok(());
        }

        if let Some(bytes) = self.registry.encode(value) {
            return frame::write_frame(&mut self.buf, &bytes?);
        }

        match T::KIND {
            ShapeKind::Transparent => value.write_payload(self),
            kind if kind.is_nested() => self.write_nested(|w| value.write_payload(w)),
            _ => {
                let at = begin_frame(&mut self.buf);
                value.write_payload(self)?;
                finish_frame(&mut self.buf, at)
            }
        }
    }

    /// Write one composite frame, consuming a nesting level while `body` runs.
    pub fn write_nested<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.depth = enter(self.depth, self.ceiling)?;
        let at = begin_frame(&mut self.buf);
        let result = body(self);
        self.depth -= 1;
        result?;
        finish_frame(&mut self.buf, at)
    }

    /// Append raw payload bytes to the frame currently being written
    #[inline]
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Recursive frame decoder for one decode call
pub struct FrameReader<'a> {
    registry: &'a Registry,
    depth: usize,
    ceiling: usize,
}

impl<'a> FrameReader<'a> {
    pub(crate) fn new(registry: &'a Registry, ceiling: usize) -> Self {
        Self {
            registry,
            depth: 0,
            ceiling,
        }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Rebuild a `T` from the payload of one frame.
    pub fn read_value<T: Shape>(&mut self, payload: &[u8]) -> Result<T> {
        if payload.is_empty() {
            return T::absent();
        }

        if let Some(value) = self.registry.decode::<T>(payload) {
            return value;
        }

        if T::KIND.is_nested() {
            self.read_nested(|r| T::read_payload(payload, r))
        } else {
            T::read_payload(payload, self)
        }
    }

    /// Run `body` one nesting level deeper.
    pub fn read_nested<U, F>(&mut self, body: F) -> Result<U>
    where
        F: FnOnce(&mut Self) -> Result<U>,
    {
        self.depth = enter(self.depth, self.ceiling)?;
        let result = body(self);
        self.depth -= 1;
        result
    }
}

#[inline]
fn enter(depth: usize, ceiling: usize) -> Result<usize> {
    let next = depth + 1;
    if next > ceiling {
        trace!(depth = next, ceiling, "Nesting ceiling reached");
        return Err(CodecError::NestingExceeded {
            depth: next,
            ceiling,
        });
    }
    Ok(next)
}

/// Shape mismatch for a payload whose width does not fit a primitive
pub(crate) fn width_mismatch<T>(found: usize) -> CodecError {
    CodecError::ShapeMismatch(format!(
        "{}: {} expects {} bytes, found {found}",
        crate::error::constants::ERR_PRIMITIVE_WIDTH,
        std::any::type_name::<T>(),
        std::mem::size_of::<T>(),
    ))
}
