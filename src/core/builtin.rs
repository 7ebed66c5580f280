//! Shape implementations for the standard library types.

use crate::core::frame::frames;
use crate::core::record::check_frame_count;
use crate::core::shape::{width_mismatch, FrameReader, FrameWriter, Shape, ShapeKind};
use crate::error::{constants, CodecError, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

macro_rules! primitive_shape {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Shape for $ty {
                const KIND: ShapeKind = ShapeKind::Primitive;

                fn absent() -> Result<Self> {
                    Ok(<$ty>::default())
                }

                fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
                    w.put_raw(&self.to_ne_bytes());
                    Ok(())
                }

                fn read_payload(payload: &[u8], _r: &mut FrameReader<'_>) -> Result<Self> {
                    let bytes = payload
                        .try_into()
                        .map_err(|_| width_mismatch::<$ty>(payload.len()))?;
                    Ok(<$ty>::from_ne_bytes(bytes))
                }
            }
        )*
    };
}

primitive_shape!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl Shape for bool {
    const KIND: ShapeKind = ShapeKind::Primitive;

    fn absent() -> Result<Self> {
        Ok(false)
    }

    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
        w.put_raw(&[u8::from(*self)]);
        Ok(())
    }

    fn read_payload(payload: &[u8], _r: &mut FrameReader<'_>) -> Result<Self> {
        match payload {
            [0] => Ok(false),
            [1] => Ok(true),
            [_] => Err(CodecError::ShapeMismatch(
                constants::ERR_INVALID_BOOL.to_string(),
            )),
            _ => Err(width_mismatch::<bool>(payload.len())),
        }
    }
}

impl Shape for char {
    const KIND: ShapeKind = ShapeKind::Primitive;

    fn absent() -> Result<Self> {
        Ok('\0')
    }

    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
        w.put_raw(&u32::from(*self).to_ne_bytes());
        Ok(())
    }

    fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
        let code = u32::read_payload(payload, r).map_err(|_| width_mismatch::<char>(payload.len()))?;
        char::from_u32(code)
            .ok_or_else(|| CodecError::ShapeMismatch(constants::ERR_INVALID_CHAR.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

// Used only when the registry carries no `String` converter.
impl Shape for String {
    const KIND: ShapeKind = ShapeKind::Text;

    fn absent() -> Result<Self> {
        Ok(String::new())
    }

    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
        w.put_raw(self.as_bytes());
        Ok(())
    }

    fn read_payload(payload: &[u8], _r: &mut FrameReader<'_>) -> Result<Self> {
        String::from_utf8(payload.to_vec())
            .map_err(|_| CodecError::ShapeMismatch(constants::ERR_INVALID_UTF8.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

fn write_elements<'v, T, I>(items: I, w: &mut FrameWriter<'_>) -> Result<()>
where
    T: Shape,
    I: IntoIterator<Item = &'v T>,
{
    for item in items {
        w.write_value(item)?;
    }
    Ok(())
}

fn read_elements<T, C>(payload: &[u8], r: &mut FrameReader<'_>) -> Result<C>
where
    T: Shape,
    C: FromIterator<T>,
{
    frames(payload)
        .map(|frame| frame.and_then(|frame| r.read_value::<T>(frame)))
        .collect()
}

macro_rules! sequence_shape {
    ($($coll:ident<T $(: $bound:ident $(+ $more:ident)*)?>),* $(,)?) => {
        $(
            impl<T: Shape $(+ $bound $(+ $more)*)?> Shape for $coll<T> {
                const KIND: ShapeKind = ShapeKind::Sequence;

                fn absent() -> Result<Self> {
                    Ok($coll::new())
                }

                fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
                    write_elements(self, w)
                }

                fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
                    read_elements::<T, _>(payload, r)
                }
            }
        )*
    };
}

sequence_shape!(Vec<T>, VecDeque<T>, HashSet<T: Eq + Hash>, BTreeSet<T: Ord>);

impl<T: Shape, const N: usize> Shape for [T; N] {
    const KIND: ShapeKind = ShapeKind::Sequence;

    fn absent() -> Result<Self> {
        let items = (0..N).map(|_| T::absent()).collect::<Result<Vec<T>>>()?;
        items
            .try_into()
            .map_err(|_| array_length_mismatch(N, 0))
    }

    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
        write_elements(self, w)
    }

    fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
        let items = read_elements::<T, Vec<T>>(payload, r)?;
        let found = items.len();
        items
            .try_into()
            .map_err(|_| array_length_mismatch(N, found))
    }
}

fn array_length_mismatch(expected: usize, found: usize) -> CodecError {
    CodecError::ShapeMismatch(format!(
        "{}: expected {expected}, found {found}",
        constants::ERR_ARRAY_LENGTH
    ))
}

// Map entries are framed as two-field records (key, value).
fn write_entries<'v, K, V, I>(entries: I, w: &mut FrameWriter<'_>) -> Result<()>
where
    K: Shape,
    V: Shape,
    I: IntoIterator<Item = (&'v K, &'v V)>,
{
    for (key, value) in entries {
        w.write_nested(|w| {
            w.write_value(key)?;
            w.write_value(value)
        })?;
    }
    Ok(())
}

fn read_entries<K, V, C>(payload: &[u8], r: &mut FrameReader<'_>) -> Result<C>
where
    K: Shape,
    V: Shape,
    C: FromIterator<(K, V)>,
{
    frames(payload)
        .map(|frame| {
            let frame = frame?;
            r.read_nested(|r| {
                let (key, value) = pair_frames(frame)?;
                Ok((r.read_value::<K>(key)?, r.read_value::<V>(value)?))
            })
        })
        .collect()
}

fn pair_frames(payload: &[u8]) -> Result<(&[u8], &[u8])> {
    let parts = crate::core::frame::split_frames(payload)?;
    check_frame_count("map entry", 2, parts.len())?;
    Ok((parts[0], parts[1]))
}

impl<K: Shape + Eq + Hash, V: Shape> Shape for HashMap<K, V> {
    const KIND: ShapeKind = ShapeKind::Sequence;

    fn absent() -> Result<Self> {
        Ok(HashMap::new())
    }

    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
        write_entries(self, w)
    }

    fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
        read_entries::<K, V, _>(payload, r)
    }
}

impl<K: Shape + Ord, V: Shape> Shape for BTreeMap<K, V> {
    const KIND: ShapeKind = ShapeKind::Sequence;

    fn absent() -> Result<Self> {
        Ok(BTreeMap::new())
    }

    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
        write_entries(self, w)
    }

    fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
        read_entries::<K, V, _>(payload, r)
    }
}

// ---------------------------------------------------------------------------
// Tuples (records whose field names are their positions)
// ---------------------------------------------------------------------------

macro_rules! tuple_shape {
    ($len:literal => $($name:ident : $idx:tt),+) => {
        impl<$($name: Shape),+> Shape for ($($name,)+) {
            const KIND: ShapeKind = ShapeKind::Record;

            fn absent() -> Result<Self> {
                Ok(($($name::absent()?,)+))
            }

            fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
                $(w.write_value(&self.$idx)?;)+
                Ok(())
            }

            fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
                let parts = crate::core::frame::split_frames(payload)?;
                check_frame_count(std::any::type_name::<Self>(), $len, parts.len())?;
                Ok(($(r.read_value::<$name>(parts[$idx])?,)+))
            }
        }
    };
}

tuple_shape!(1 => A: 0);
tuple_shape!(2 => A: 0, B: 1);
tuple_shape!(3 => A: 0, B: 1, C: 2);
tuple_shape!(4 => A: 0, B: 1, C: 2, D: 3);
tuple_shape!(5 => A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_shape!(6 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

// ---------------------------------------------------------------------------
// Transparent wrappers
// ---------------------------------------------------------------------------

impl<T: Shape> Shape for Option<T> {
    const KIND: ShapeKind = ShapeKind::Transparent;

    fn is_absent(&self) -> bool {
        self.is_none()
    }

    fn absent() -> Result<Self> {
        Ok(None)
    }

    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
        match self {
            Some(value) => w.write_value(value),
            None => w.write_value(&()),
        }
    }

    fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
        r.read_value::<T>(payload).map(Some)
    }
}

macro_rules! pointer_shape {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T: Shape> Shape for $ptr<T> {
                const KIND: ShapeKind = ShapeKind::Transparent;

                fn is_absent(&self) -> bool {
                    (**self).is_absent()
                }

                fn absent() -> Result<Self> {
                    T::absent().map($ptr::new)
                }

                fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
                    w.write_value::<T>(self)
                }

                fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
                    r.read_value::<T>(payload).map($ptr::new)
                }
            }
        )*
    };
}

pointer_shape!(Box, Arc);

// Shared cells allow cyclic graphs; the nesting ceiling is what stops them.
impl<T: Shape> Shape for Rc<RefCell<T>> {
    const KIND: ShapeKind = ShapeKind::Transparent;

    fn absent() -> Result<Self> {
        T::absent().map(|value| Rc::new(RefCell::new(value)))
    }

    fn write_payload(&self, w: &mut FrameWriter<'_>) -> Result<()> {
        let value = self.try_borrow().map_err(|_| {
            CodecError::UnsupportedValue(constants::ERR_CELL_BORROWED.to_string())
        })?;
        w.write_value::<T>(&value)
    }

    fn read_payload(payload: &[u8], r: &mut FrameReader<'_>) -> Result<Self> {
        r.read_value::<T>(payload)
            .map(|value| Rc::new(RefCell::new(value)))
    }
}

impl Shape for () {
    const KIND: ShapeKind = ShapeKind::Primitive;

    fn is_absent(&self) -> bool {
        true
    }

    fn absent() -> Result<Self> {
        Ok(())
    }

    fn write_payload(&self, _w: &mut FrameWriter<'_>) -> Result<()> {
        Ok(())
    }

    fn read_payload(payload: &[u8], _r: &mut FrameReader<'_>) -> Result<Self> {
        Err(width_mismatch::<()>(payload.len()))
    }
}
