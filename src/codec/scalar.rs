//! Scalar protobuf types and their encoding/decoding implementations.

// Casts between signed and unsigned integers of the same width are the
// documented wire mapping for these types.
#![allow(clippy::as_conversions)]

use bytes::BufMut;

use super::packed::extend_from_le;
use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::error::DecodeError;
use crate::leb128::{
    decode_zigzag32, decode_zigzag64, encode_zigzag32, encode_zigzag64, varint_len,
};
use crate::reader::{ByteReader, Input};
use crate::wire::WireType;
use crate::writer::ByteWriter;

/// Implements the codec traits for a scalar.
///
/// `read` decodes a value from `$r`, `write` encodes `$v` through `$w`, `len`
/// sizes `$l`, and the optional `packed` arm converts one little-endian value
/// for the bulk packed path.
macro_rules! impl_scalar {
    (
        $ty:ty, $wire:expr, $fixed:expr,
        read = |$r:ident| $read:expr,
        write = |$v:ident, $w:ident| $write:expr,
        len = |$l:ident| $len:expr
        $(, packed = |$bytes:ident: [u8; $n:literal]| $convert:expr)? $(,)?
    ) => {
        impl ProtoType for $ty {
            const WIRE_TYPE: WireType = $wire;
            const FIXED_SIZE: Option<usize> = $fixed;
        }

        impl ProtoDecode for $ty {
            #[inline]
            fn decode_into<I: Input>(
                $r: &mut ByteReader<I>,
                dst: &mut Self,
            ) -> Result<(), DecodeError> {
                *dst = $read;
                Ok(())
            }

            $(
                #[inline]
                fn decode_packed_fixed(data: &[u8], dst: &mut Vec<Self>) -> bool {
                    extend_from_le::<$n, $ty>(data, dst, |$bytes| $convert)
                }
            )?
        }

        impl ProtoEncode for $ty {
            #[inline]
            fn encode<B: BufMut>(&self, $w: &mut ByteWriter<B>) {
                let $v = *self;
                $write;
            }

            #[inline]
            fn encoded_len(&self) -> usize {
                let $l = *self;
                $len
            }
        }
    };
}

impl_scalar!(
    u32, WireType::Varint, None,
    read = |r| r.read_varint32()?,
    write = |v, w| w.write_varint32(v),
    len = |v| varint_len(u64::from(v)),
);

impl_scalar!(
    u64, WireType::Varint, None,
    read = |r| r.read_varint64()?,
    write = |v, w| w.write_varint64(v),
    len = |v| varint_len(v),
);

// Negative int32 values are sign-extended to 64 bits, so they always take 10 bytes.
impl_scalar!(
    i32, WireType::Varint, None,
    read = |r| r.read_varint32()? as i32,
    write = |v, w| w.write_varint64(i64::from(v) as u64),
    len = |v| varint_len(i64::from(v) as u64),
);

impl_scalar!(
    i64, WireType::Varint, None,
    read = |r| r.read_varint64()? as i64,
    write = |v, w| w.write_varint64(v as u64),
    len = |v| varint_len(v as u64),
);

// Any non-zero varint decodes as `true`.
impl_scalar!(
    bool, WireType::Varint, Some(1),
    read = |r| r.read_varint64()? != 0,
    write = |v, w| w.write_varint32(u32::from(v)),
    len = |_v| 1,
);

impl_scalar!(
    f32, WireType::Fixed32, Some(4),
    read = |r| f32::from_bits(r.read_fixed32()?),
    write = |v, w| w.write_fixed32(v.to_bits()),
    len = |_v| 4,
    packed = |bytes: [u8; 4]| f32::from_le_bytes(bytes),
);

impl_scalar!(
    f64, WireType::Fixed64, Some(8),
    read = |r| f64::from_bits(r.read_fixed64()?),
    write = |v, w| w.write_fixed64(v.to_bits()),
    len = |_v| 8,
    packed = |bytes: [u8; 8]| f64::from_le_bytes(bytes),
);

macro_rules! wrapper {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl std::ops::Deref for $name {
            type Target = $inner;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                $name(value)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

wrapper!(
    /// Wrapper for protobuf `sint32` (zigzag-encoded signed 32-bit integer).
    Sint32(i32)
);
wrapper!(
    /// Wrapper for protobuf `sint64` (zigzag-encoded signed 64-bit integer).
    Sint64(i64)
);
wrapper!(
    /// Wrapper for protobuf `fixed32` (little-endian unsigned 32-bit integer).
    Fixed32(u32)
);
wrapper!(
    /// Wrapper for protobuf `fixed64` (little-endian unsigned 64-bit integer).
    Fixed64(u64)
);
wrapper!(
    /// Wrapper for protobuf `sfixed32` (little-endian signed 32-bit integer).
    Sfixed32(i32)
);
wrapper!(
    /// Wrapper for protobuf `sfixed64` (little-endian signed 64-bit integer).
    Sfixed64(i64)
);

impl_scalar!(
    Sint32, WireType::Varint, None,
    read = |r| Sint32(decode_zigzag32(r.read_varint32()?)),
    write = |v, w| w.write_varint32(encode_zigzag32(v.0)),
    len = |v| varint_len(u64::from(encode_zigzag32(v.0))),
);

impl_scalar!(
    Sint64, WireType::Varint, None,
    read = |r| Sint64(decode_zigzag64(r.read_varint64()?)),
    write = |v, w| w.write_varint64(encode_zigzag64(v.0)),
    len = |v| varint_len(encode_zigzag64(v.0)),
);

impl_scalar!(
    Fixed32, WireType::Fixed32, Some(4),
    read = |r| Fixed32(r.read_fixed32()?),
    write = |v, w| w.write_fixed32(v.0),
    len = |_v| 4,
    packed = |bytes: [u8; 4]| Fixed32(u32::from_le_bytes(bytes)),
);

impl_scalar!(
    Fixed64, WireType::Fixed64, Some(8),
    read = |r| Fixed64(r.read_fixed64()?),
    write = |v, w| w.write_fixed64(v.0),
    len = |_v| 8,
    packed = |bytes: [u8; 8]| Fixed64(u64::from_le_bytes(bytes)),
);

impl_scalar!(
    Sfixed32, WireType::Fixed32, Some(4),
    read = |r| Sfixed32(r.read_fixed32()? as i32),
    write = |v, w| w.write_fixed32(v.0 as u32),
    len = |_v| 4,
    packed = |bytes: [u8; 4]| Sfixed32(i32::from_le_bytes(bytes)),
);

impl_scalar!(
    Sfixed64, WireType::Fixed64, Some(8),
    read = |r| Sfixed64(r.read_fixed64()? as i64),
    write = |v, w| w.write_fixed64(v.0 as u64),
    len = |_v| 8,
    packed = |bytes: [u8; 8]| Sfixed64(i64::from_le_bytes(bytes)),
);
