//! # Core Codec Components
//!
//! Recursive framing, shape dispatch, records, converters and the integrity
//! envelope.
//!
//! ## Components
//! - **Frame**: length-prefixed wire unit and frame splitting
//! - **Shape**: per-type dispatch and the recursive writer/reader
//! - **Builtin**: shapes for scalars, text, collections, tuples and pointers
//! - **Record**: name-sorted field layouts and the `wire_record!` macro
//! - **Registry**: per-type converter overrides
//! - **Integrity**: MD5 content hash appended to the root frame
//! - **Codec**: the encode/decode entry points
//!
//! ## Wire Format
//! ```text
//! EncodedBuffer := compress?(Frame || md5(Frame))
//! Frame         := [Length(4, LE)] [Payload(Length)]
//! ```
//!
//! ## Security
//! - Nesting ceiling (default 8) bounds recursion on encode and decode
//! - Frame lengths are checked against the enclosing buffer before slicing
//! - Maximum buffer size: 16MB (prevents memory exhaustion)

pub mod builtin;
pub mod codec;
pub mod frame;
pub mod integrity;
pub mod record;
pub mod registry;
pub mod shape;
