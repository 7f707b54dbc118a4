//! Well-known wrapper types, such as `google.protobuf.Int32Value`.
//!
//! A wrapper field holds a nullable scalar. On the wire it is an embedded
//! message whose only field, number 1, carries the value. `None` is the
//! absent field, `Some(0)` is an empty embedded message.

use bytes::{BufMut, Bytes};

use super::{ProtoDecode, ProtoEncode, ProtoEq, ProtoType};
use crate::error::DecodeError;
use crate::leb128::varint_len;
use crate::reader::{ByteReader, Input};
use crate::util::CastFrom;
use crate::wire::{Tag, WireType};
use crate::writer::ByteWriter;

/// Field number of the value inside every wrapper message.
pub const WRAPPER_VALUE_FIELD: u32 = 1;

/// A scalar that has a well-known wrapper message.
pub trait WrapperValue: ProtoDecode + ProtoEncode + ProtoEq + Default {
    /// Tag of the value inside the wrapper message.
    const VALUE_TAG: Tag = Tag::new(WRAPPER_VALUE_FIELD, Self::WIRE_TYPE);
}

impl WrapperValue for bool {}
impl WrapperValue for i32 {}
impl WrapperValue for i64 {}
impl WrapperValue for u32 {}
impl WrapperValue for u64 {}
impl WrapperValue for f32 {}
impl WrapperValue for f64 {}
impl WrapperValue for String {}
impl WrapperValue for Vec<u8> {}
impl WrapperValue for Bytes {}

/// Size of the wrapper message body. A default value is not written.
#[inline]
fn body_len<T: WrapperValue>(value: &T) -> usize {
    if value.proto_eq(&T::default()) {
        0
    } else {
        T::VALUE_TAG.encoded_len() + value.encoded_len()
    }
}

impl<T: WrapperValue> ProtoType for Option<T> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
}

impl<T: WrapperValue> ProtoDecode for Option<T> {
    /// Replaces `dst` with the wrapped value. Fields other than the value are
    /// skipped, and an empty wrapper yields the default.
    fn decode_into<I: Input>(
        reader: &mut ByteReader<I>,
        dst: &mut Self,
    ) -> Result<(), DecodeError> {
        let len = reader.read_length()?;
        let previous = reader.push_limit(len)?;

        let mut value = T::default();
        while let Some(tag) = reader.read_tag()? {
            if tag == T::VALUE_TAG {
                T::decode_into(reader, &mut value)?;
            } else {
                reader.skip_field(tag)?;
            }
        }
        if !reader.is_reached_limit() {
            return Err(DecodeError::truncated());
        }
        reader.pop_limit(previous);

        *dst = Some(value);
        Ok(())
    }
}

impl<T: WrapperValue> ProtoEncode for Option<T> {
    /// Writes the wrapper message. `None` is written as an empty wrapper,
    /// callers leave it out through [`crate::FieldCodec::write_tag_and_value`].
    fn encode<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        let Some(value) = self else {
            writer.write_length(0);
            return;
        };
        let len = body_len(value);
        writer.write_length(len);
        if len > 0 {
            writer.write_tag(T::VALUE_TAG);
            value.encode(writer);
        }
    }

    fn encoded_len(&self) -> usize {
        let len = self.as_ref().map_or(0, body_len);
        varint_len(u64::cast_from(len)) + len
    }
}

impl<T: ProtoEq> ProtoEq for Option<T> {
    #[inline]
    fn proto_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.proto_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}
