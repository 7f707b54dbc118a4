//! Encoding and decoding traits for protobuf values, and the field level
//! codecs generated message code is written against.

mod delimited;
mod enumeration;
mod equality;
mod field;
mod map;
mod message;
mod packed;
mod repeated;
mod scalar;
mod unknown;
mod wrappers;

use bytes::BufMut;

use crate::error::DecodeError;
use crate::reader::{ByteReader, Input};
use crate::wire::WireType;
use crate::writer::ByteWriter;

pub trait ProtoType: Sized {
    /// The wire type values of this type are framed with.
    const WIRE_TYPE: WireType;

    /// Encoded size of every value, for types whose size does not depend on the value.
    const FIXED_SIZE: Option<usize> = None;

    /// Whether repeated fields of this type may use the packed encoding.
    const PACKABLE: bool = matches!(
        Self::WIRE_TYPE,
        WireType::Varint | WireType::Fixed32 | WireType::Fixed64
    );

    /// Whether a value is written even when it equals the field's default.
    ///
    /// Messages have explicit presence, an absent message is modelled with `Option`.
    const EXPLICIT_PRESENCE: bool = false;
}

/// A type that can be decoded from protobuf wire format.
///
/// The `decode_into` method follows protobuf merging semantics:
/// - Scalars: last value wins (overwrite)
/// - Embedded messages: recursive merge
pub trait ProtoDecode: ProtoType {
    /// Decodes one value, whose tag was already consumed, into `dst`.
    fn decode_into<I: Input>(reader: &mut ByteReader<I>, dst: &mut Self)
        -> Result<(), DecodeError>;

    /// Decodes a group body, whose start tag was already consumed, up to and
    /// including the end-group tag for `field_number`.
    fn decode_group_into<I: Input>(
        reader: &mut ByteReader<I>,
        dst: &mut Self,
        field_number: u32,
    ) -> Result<(), DecodeError> {
        let _ = (reader, dst, field_number);
        Err(DecodeError::invalid_wire_type(WireType::StartGroup.into_val()))
    }

    /// Appends every value of a packed run held contiguously in `data`.
    ///
    /// Returns `false`, leaving `dst` untouched, for types without a bulk path
    /// or when `data` is not a whole number of values.
    fn decode_packed_fixed(data: &[u8], dst: &mut Vec<Self>) -> bool {
        let _ = (data, dst);
        false
    }
}

/// A type that can be encoded to protobuf wire format.
pub trait ProtoEncode: ProtoType {
    /// Encode this value, without its tag.
    fn encode<B: BufMut>(&self, writer: &mut ByteWriter<B>);

    /// Returns the encoded length of this value, not including the tag.
    fn encoded_len(&self) -> usize;

    /// Encode this value as the body of a group.
    fn encode_group<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        self.encode(writer);
    }

    /// Returns the encoded length of this value as the body of a group.
    fn encoded_group_len(&self) -> usize {
        self.encoded_len()
    }
}

pub use delimited::string_from_utf8_lossy;
pub use enumeration::{Enumeration, ProtoEnum};
pub use equality::ProtoEq;
pub use field::FieldCodec;
pub use map::{MapCodec, MapField, ProtoMap, ProtoMapKey};
pub use message::Message;
pub use repeated::RepeatedField;
pub use scalar::{Fixed32, Fixed64, Sfixed32, Sfixed64, Sint32, Sint64};
pub use unknown::UnknownFields;
pub use wrappers::{WrapperValue, WRAPPER_VALUE_FIELD};
