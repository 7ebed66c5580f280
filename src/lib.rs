//! # framewire
//!
//! A recursive, self-framing binary codec for object graphs.
//!
//! Every value becomes exactly one length-prefixed frame. Sequences and records
//! nest their elements and fields as concatenated sub-frames, so the stream
//! needs no tags or field names: the decoder rebuilds a value from the static
//! type it is asked for. The root frame is sealed with a 16-byte MD5 content
//! hash and the result is optionally compressed.
//!
//! ## Features
//! - **Shapes** for scalars, text, the standard collections, tuples and pointers
//! - **Records** declared with [`wire_record!`], fields written in name order
//! - **Converters** overriding the framing of any concrete type
//! - **Nesting ceiling** stopping cyclic and too-deep graphs
//! - **Pluggable compression** with LZ4 and Zstd providers
//! - **Transfer helpers** for moving buffers over tokio streams
//!
//! ## Example
//! ```rust
//! use framewire::{wire_record, Codec};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     label: String,
//! }
//!
//! wire_record! {
//!     Point { x: i32, y: i32, label: String }
//! }
//!
//! # fn main() -> framewire::error::Result<()> {
//! let codec = Codec::default();
//! let point = Point { x: 3, y: -4, label: "origin".into() };
//! let bytes = codec.encode(&point)?;
//! assert_eq!(codec.decode::<Point>(&bytes)?, point);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod transport;
pub mod utils;

pub use crate::core::codec::Codec;
pub use crate::core::record::{Record, RecordLayout};
pub use crate::core::registry::Registry;
pub use crate::core::shape::{FrameReader, FrameWriter, Shape, ShapeKind};
pub use crate::error::{CodecError, Result};
pub use crate::utils::compression::{BuiltinCompressor, CompressionKind, Compressor};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
