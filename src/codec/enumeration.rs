//! Open enumerations.
//!
//! Enum fields are varint encoded `int32` values. Numbers that do not match a
//! known variant are kept as-is so they survive a decode and re-encode.

// Enum numbers are sign-extended to 64 bits on the wire, like `int32`.
#![allow(clippy::as_conversions)]

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use bytes::BufMut;

use super::{ProtoDecode, ProtoEncode, ProtoEq, ProtoType};
use crate::error::DecodeError;
use crate::leb128::varint_len;
use crate::reader::{ByteReader, Input};
use crate::wire::WireType;
use crate::writer::ByteWriter;

/// A Rust enum that mirrors a protobuf enum.
///
/// `Default` must be the variant numbered zero.
pub trait ProtoEnum: Copy + Default {
    fn to_i32(self) -> i32;
    fn from_i32(value: i32) -> Option<Self>;
}

/// The stored value of an enum field, known or not.
pub struct Enumeration<E> {
    raw: i32,
    _enum: PhantomData<fn() -> E>,
}

impl<E: ProtoEnum> Enumeration<E> {
    pub fn new(value: E) -> Self {
        Self::from_raw(value.to_i32())
    }

    pub const fn from_raw(raw: i32) -> Self {
        Enumeration {
            raw,
            _enum: PhantomData,
        }
    }

    /// The number as it appeared on the wire.
    pub const fn raw(&self) -> i32 {
        self.raw
    }

    /// The known variant, or `None` for a number this enum does not define.
    pub fn get(&self) -> Option<E> {
        E::from_i32(self.raw)
    }
}

impl<E> Clone for Enumeration<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Enumeration<E> {}

impl<E> PartialEq for Enumeration<E> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<E> Eq for Enumeration<E> {}

impl<E> Hash for Enumeration<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<E: ProtoEnum + fmt::Debug> fmt::Debug for Enumeration<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => value.fmt(f),
            None => write!(f, "Unknown({})", self.raw),
        }
    }
}

impl<E: ProtoEnum> Default for Enumeration<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}

impl<E: ProtoEnum> From<E> for Enumeration<E> {
    fn from(value: E) -> Self {
        Self::new(value)
    }
}

impl<E: ProtoEnum> ProtoType for Enumeration<E> {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl<E: ProtoEnum> ProtoDecode for Enumeration<E> {
    #[inline]
    fn decode_into<I: Input>(
        reader: &mut ByteReader<I>,
        dst: &mut Self,
    ) -> Result<(), DecodeError> {
        dst.raw = reader.read_varint32()? as i32;
        Ok(())
    }
}

impl<E: ProtoEnum> ProtoEncode for Enumeration<E> {
    #[inline]
    fn encode<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        writer.write_varint64(i64::from(self.raw) as u64);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        varint_len(i64::from(self.raw) as u64)
    }
}

impl<E> ProtoEq for Enumeration<E> {
    #[inline]
    fn proto_eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
