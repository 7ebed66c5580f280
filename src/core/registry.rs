//! # Converter Registry
//!
//! Per-type overrides that replace the default primitive/sequence/record
//! framing with custom encode/decode functions.
//!
//! Converters are keyed by [`TypeId`], so an override applies to exactly one
//! concrete type (`Vec<u8>` and `Vec<i32>` are independent keys). Registering
//! a type twice replaces the earlier converter.
//!
//! The registry is owned by a [`Codec`](crate::core::codec::Codec) and mutated
//! only through `&mut` access, so it cannot change while an encode or decode
//! call borrows the codec. Callers that need to register while sharing a codec
//! across threads wrap it in a `RwLock`.

use crate::error::{constants, CodecError, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type EncodeFn = dyn Fn(&dyn Any) -> Result<Vec<u8>> + Send + Sync + 'static;
type DecodeFn = dyn Fn(&[u8]) -> Result<Box<dyn Any>> + Send + Sync + 'static;

/// Type-erased pair of converter functions
#[derive(Clone)]
struct Converter {
    type_name: &'static str,
    encode: Arc<EncodeFn>,
    decode: Arc<DecodeFn>,
}

/// Mapping from a runtime type to its converter functions
#[derive(Clone)]
pub struct Registry {
    converters: HashMap<TypeId, Converter>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with the default UTF-8 text converter for `String`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<String, _, _>(
            |text| Ok(text.as_bytes().to_vec()),
            |bytes| {
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| CodecError::ShapeMismatch(constants::ERR_INVALID_UTF8.to_string()))
            },
        );
        registry
    }

    /// Create a registry with no converters at all
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register a converter for `T`, replacing any earlier one.
    pub fn register<T, E, D>(&mut self, encode: E, decode: D)
    where
        T: Any,
        E: Fn(&T) -> Result<Vec<u8>> + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<T> + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();

        let encode = move |value: &dyn Any| match value.downcast_ref::<T>() {
            Some(value) => encode(value),
            None => Err(CodecError::UnsupportedValue(format!(
                "{}: expected {type_name}",
                constants::ERR_CONVERTER_TYPE
            ))),
        };
        let decode = move |bytes: &[u8]| decode(bytes).map(|value| Box::new(value) as Box<dyn Any>);

        let converter = Converter {
            type_name,
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        };

        if self.converters.insert(TypeId::of::<T>(), converter).is_some() {
            debug!(type_name, "Replaced converter");
        } else {
            debug!(type_name, "Registered converter");
        }
    }

    /// Copy every converter from `other`, overwriting on collision
    pub fn merge(&mut self, other: &Registry) {
        for (type_id, converter) in &other.converters {
            self.converters.insert(*type_id, converter.clone());
        }
        debug!(merged = other.converters.len(), total = self.converters.len(), "Merged converters");
    }

    /// Whether a converter is registered for `T`
    pub fn contains<T: Any>(&self) -> bool {
        self.converters.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered converters
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Whether no converters are registered
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Run the converter for `T` if one is registered
    pub(crate) fn encode<T: Any>(&self, value: &T) -> Option<Result<Vec<u8>>> {
        self.converters
            .get(&TypeId::of::<T>())
            .map(|converter| (converter.encode)(value))
    }

    /// Run the decoder for `T` if one is registered
    pub(crate) fn decode<T: Any>(&self, bytes: &[u8]) -> Option<Result<T>> {
        let converter = self.converters.get(&TypeId::of::<T>())?;
        let result = (converter.decode)(bytes).and_then(|value| {
            value.downcast::<T>().map(|value| *value).map_err(|_| {
                CodecError::UnsupportedValue(format!(
                    "{}: expected {}",
                    constants::ERR_CONVERTER_TYPE,
                    converter.type_name
                ))
            })
        });
        Some(result)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.converters.values().map(|c| c.type_name).collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("converters", &names).finish()
    }
}

/// Declare types that are framed only through a registered converter.
///
/// Encoding or decoding such a type on a codec without a converter for it
/// fails with `UnsupportedValue`. A zero-length frame decodes to
/// `Default::default()`, so each listed type must implement `Default`.
#[macro_export]
macro_rules! converted_shape {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::core::shape::Shape for $ty {
                const KIND: $crate::core::shape::ShapeKind = $crate::core::shape::ShapeKind::Primitive;

                fn absent() -> $crate::error::Result<Self> {
                    ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
                }

                fn write_payload(
                    &self,
                    _w: &mut $crate::core::shape::FrameWriter<'_>,
                ) -> $crate::error::Result<()> {
                    ::std::result::Result::Err($crate::error::CodecError::UnsupportedValue(
                        ::std::format!(
                            "{}: {}",
                            $crate::error::constants::ERR_NO_CONVERTER,
                            ::std::any::type_name::<Self>()
                        ),
                    ))
                }

                fn read_payload(
                    _payload: &[u8],
                    _r: &mut $crate::core::shape::FrameReader<'_>,
                ) -> $crate::error::Result<Self> {
                    ::std::result::Result::Err($crate::error::CodecError::UnsupportedValue(
                        ::std::format!(
                            "{}: {}",
                            $crate::error::constants::ERR_NO_CONVERTER,
                            ::std::any::type_name::<Self>()
                        ),
                    ))
                }
            }
        )+
    };
}
