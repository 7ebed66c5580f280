//! # Records
//!
//! Composite types with named fields. The wire format carries no field names
//! or tags, only the concatenated field frames, so encoder and decoder must
//! agree on the field order from static type information alone. That order is
//! ascending by field name, independent of declaration order.
//!
//! A record's [`RecordLayout`] (the name-sorted list of field accessors) is
//! built once, on first use, and cached for the life of the process.
//!
//! ## Declaring a record
//! ```rust
//! use framewire::wire_record;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     y: i32,
//!     x: i32,
//!     label: Option<String>,
//! }
//!
//! wire_record! {
//!     Point { y: i32, x: i32, label: Option<String> }
//! }
//!
//! // Frames are emitted as label, x, y
//! let codec = framewire::core::codec::Codec::plain();
//! let point = Point { y: 2, x: 1, label: Some("origin".into()) };
//! let bytes = codec.encode(&point).unwrap();
//! assert_eq!(codec.decode::<Point>(&bytes).unwrap(), point);
//! ```
//!
//! Records must implement `Default`: decoding fills a freshly constructed
//! instance, and a zero-length frame decodes to the default value.

use crate::core::frame::split_frames;
use crate::core::shape::{FrameReader, FrameWriter};
use crate::error::{constants, CodecError, Result};

/// Encodes one field of `R` as exactly one frame
pub type FieldWriter<R> = fn(&R, &mut FrameWriter<'_>) -> Result<()>;

/// Decodes one frame payload into a field of `R`
pub type FieldReader<R> = fn(&mut R, &[u8], &mut FrameReader<'_>) -> Result<()>;

/// A named field accessor pair
pub struct Field<R> {
    pub name: &'static str,
    pub write: FieldWriter<R>,
    pub read: FieldReader<R>,
}

/// Name-sorted field table for a record type
pub struct RecordLayout<R> {
    type_name: &'static str,
    fields: Vec<Field<R>>,
    duplicate: Option<&'static str>,
}

impl<R> RecordLayout<R> {
    /// Build a layout, sorting `fields` by name
    pub fn new(type_name: &'static str, mut fields: Vec<Field<R>>) -> Self {
        fields.sort_by(|a, b| a.name.cmp(b.name));
        let duplicate = fields
            .windows(2)
            .find(|pair| pair[0].name == pair[1].name)
            .map(|pair| pair[0].name);

        Self {
            type_name,
            fields,
            duplicate,
        }
    }

    /// Field names in wire order
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn check(&self) -> Result<()> {
        match self.duplicate {
            Some(name) => Err(CodecError::UnsupportedValue(format!(
                "{}: {}.{name}",
                constants::ERR_MALFORMED_RECORD,
                self.type_name
            ))),
            None => Ok(()),
        }
    }
}

/// A composite type with a cached, name-sorted field layout.
///
/// Implemented by [`wire_record!`](crate::wire_record).
pub trait Record: Default + Sized + 'static {
    fn layout() -> &'static RecordLayout<Self>;
}

/// Write every field of `record` in layout order
pub fn write_record<R: Record>(record: &R, w: &mut FrameWriter<'_>) -> Result<()> {
    let layout = R::layout();
    layout.check()?;
    for field in &layout.fields {
        (field.write)(record, w)?;
    }
    Ok(())
}

/// Rebuild a record from its composite payload
pub fn read_record<R: Record>(payload: &[u8], r: &mut FrameReader<'_>) -> Result<R> {
    let layout = R::layout();
    layout.check()?;

    let parts = split_frames(payload)?;
    check_frame_count(layout.type_name, layout.fields.len(), parts.len())?;

    let mut record = R::default();
    for (field, part) in layout.fields.iter().zip(parts) {
        (field.read)(&mut record, part, r)?;
    }
    Ok(record)
}

pub(crate) fn check_frame_count(type_name: &str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        return Ok(());
    }
    Err(CodecError::ShapeMismatch(format!(
        "{}: {type_name} expects {expected}, found {found}",
        constants::ERR_FIELD_COUNT
    )))
}

/// Declare one or more structs as records.
///
/// Each listed field is encoded in ascending name order. The struct must
/// implement `Default`, and every field type must implement
/// [`Shape`](crate::core::shape::Shape).
#[macro_export]
macro_rules! wire_record {
    ($($name:ident { $($field:ident : $ty:ty),* $(,)? })+) => {
        $(
            impl $crate::core::record::Record for $name {
                fn layout() -> &'static $crate::core::record::RecordLayout<Self> {
                    static LAYOUT: $crate::__private::Lazy<$crate::core::record::RecordLayout<$name>> =
                        $crate::__private::Lazy::new(|| {
                            $crate::core::record::RecordLayout::new(
                                ::std::stringify!($name),
                                ::std::vec![$(
                                    $crate::core::record::Field::<$name> {
                                        name: ::std::stringify!($field),
                                        write: |record, w| w.write_value(&record.$field),
                                        read: |record, payload, r| {
                                            record.$field = r.read_value::<$ty>(payload)?;
                                            ::std::result::Result::Ok(())
                                        },
                                    }
                                ),*],
                            )
                        });
                    &LAYOUT
                }
            }

            impl $crate::core::shape::Shape for $name {
                const KIND: $crate::core::shape::ShapeKind = $crate::core::shape::ShapeKind::Record;

                fn absent() -> $crate::error::Result<Self> {
                    ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
                }

                fn write_payload(
                    &self,
                    w: &mut $crate::core::shape::FrameWriter<'_>,
                ) -> $crate::error::Result<()> {
                    $crate::core::record::write_record(self, w)
                }

                fn read_payload(
                    payload: &[u8],
                    r: &mut $crate::core::shape::FrameReader<'_>,
                ) -> $crate::error::Result<Self> {
                    $crate::core::record::read_record(payload, r)
                }
            }
        )+
    };
}
