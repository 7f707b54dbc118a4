//! Per-field codecs.
//!
//! A [`FieldCodec`] binds a value type to the tag it is framed with and the
//! field's default value. It is built once per field of a message type and
//! shared, read-only, by every parse and serialization of that type.

use bytes::BufMut;

use super::{Message, ProtoDecode, ProtoEncode, ProtoEq, ProtoType};
use crate::error::{ArgumentError, DecodeError};
use crate::reader::{ByteReader, Input};
use crate::wire::{Tag, WireType};
use crate::writer::ByteWriter;

/// Reads and writes one field of type `T`.
///
/// Group-encoded message fields carry an end tag. All other fields are framed
/// by a single tag.
#[derive(Debug, Clone)]
pub struct FieldCodec<T> {
    tag: Tag,
    end_tag: Option<Tag>,
    default_value: T,
    /// Encoded size of the tag, plus the end tag for groups.
    tag_size: usize,
}

impl<T> FieldCodec<T> {
    /// Creates a codec from its parts. Usable in `static` items.
    pub const fn from_parts(tag: Tag, end_tag: Option<Tag>, default_value: T) -> Self {
        let end_size = match end_tag {
            Some(end) => end.encoded_len(),
            None => 0,
        };
        FieldCodec {
            tag,
            end_tag,
            default_value,
            tag_size: tag.encoded_len() + end_size,
        }
    }

    #[inline(always)]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline(always)]
    pub fn end_tag(&self) -> Option<Tag> {
        self.end_tag
    }

    #[inline(always)]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    #[inline(always)]
    pub fn tag_size(&self) -> usize {
        self.tag_size
    }

    /// Replaces the value that singular writes treat as absent.
    pub fn with_default(mut self, default_value: T) -> Self {
        self.default_value = default_value;
        self
    }
}

impl<T: ProtoType> FieldCodec<T> {
    /// Encoded size of every value, if it does not depend on the value.
    #[inline(always)]
    pub fn fixed_size(&self) -> Option<usize> {
        T::FIXED_SIZE
    }

    /// Whether `tag` frames a packed run of `T` values.
    #[inline(always)]
    pub fn is_packed_repeated_field(&self, tag: Tag) -> bool {
        T::PACKABLE && tag.wire_type() == WireType::LengthDelimited
    }

    /// Whether this codec writes repeated values packed.
    #[inline(always)]
    pub fn is_packed(&self) -> bool {
        self.is_packed_repeated_field(self.tag)
    }
}

impl<T: ProtoType + Default> FieldCodec<T> {
    /// Creates a codec for `field_number` framed with the natural wire type of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `field_number` is outside the valid range.
    pub fn new(field_number: u32) -> Self {
        Self::from_parts(Tag::new(field_number, T::WIRE_TYPE), None, T::default())
    }

    /// Creates a codec that writes repeated values of `T` as one packed run.
    ///
    /// # Panics
    ///
    /// Panics if `T` cannot be packed or `field_number` is outside the valid range.
    pub fn packed(field_number: u32) -> Self {
        assert!(T::PACKABLE, "only scalar numeric types can be packed");
        Self::from_parts(
            Tag::new(field_number, WireType::LengthDelimited),
            None,
            T::default(),
        )
    }

    /// Creates a codec for an existing tag.
    ///
    /// The tag must use the natural wire type of `T`, or be length-delimited
    /// when `T` is packable.
    pub fn from_tag(tag: Tag) -> Result<Self, ArgumentError> {
        let wire_type = tag.wire_type();
        if wire_type != T::WIRE_TYPE && !(T::PACKABLE && wire_type == WireType::LengthDelimited) {
            return Err(ArgumentError::IncompatibleWireType {
                expected: T::WIRE_TYPE,
                actual: wire_type,
            });
        }
        Ok(Self::from_parts(tag, None, T::default()))
    }
}

impl<M: Message> FieldCodec<M> {
    /// Creates a codec for a message framed as a group.
    ///
    /// # Panics
    ///
    /// Panics if `field_number` is outside the valid range.
    pub fn for_group(field_number: u32) -> Self {
        Self::from_parts(
            Tag::new(field_number, WireType::StartGroup),
            Some(Tag::new(field_number, WireType::EndGroup)),
            M::default(),
        )
    }
}

impl<T: super::WrapperValue> FieldCodec<Option<T>> {
    /// Creates a codec for a well-known wrapper field, such as
    /// `google.protobuf.Int32Value`. `None` is the absent field.
    ///
    /// # Panics
    ///
    /// Panics if `field_number` is outside the valid range.
    pub const fn for_wrapper(field_number: u32) -> Self {
        Self::from_parts(Tag::new(field_number, WireType::LengthDelimited), None, None)
    }
}

macro_rules! const_constructors {
    ($($name:ident => $ty:ty = $default:expr;)+) => {$(
        impl FieldCodec<$ty> {
            #[doc = concat!("Const constructor for a `", stringify!($ty), "` field.")]
            pub const fn $name(field_number: u32) -> Self {
                Self::from_parts(
                    Tag::new(field_number, <$ty as ProtoType>::WIRE_TYPE),
                    None,
                    $default,
                )
            }
        }
    )+};
}

const_constructors! {
    for_int32 => i32 = 0;
    for_int64 => i64 = 0;
    for_uint32 => u32 = 0;
    for_uint64 => u64 = 0;
    for_sint32 => super::Sint32 = super::Sint32(0);
    for_sint64 => super::Sint64 = super::Sint64(0);
    for_fixed32 => super::Fixed32 = super::Fixed32(0);
    for_fixed64 => super::Fixed64 = super::Fixed64(0);
    for_sfixed32 => super::Sfixed32 = super::Sfixed32(0);
    for_sfixed64 => super::Sfixed64 = super::Sfixed64(0);
    for_float => f32 = 0.0;
    for_double => f64 = 0.0;
    for_bool => bool = false;
    for_string => String = String::new();
    for_bytes => Vec<u8> = Vec::new();
}

impl<T: ProtoDecode + Default> FieldCodec<T> {
    /// Reads one value. The tag must already have been consumed.
    #[inline]
    pub fn read<I: Input>(&self, reader: &mut ByteReader<I>) -> Result<T, DecodeError> {
        let mut value = T::default();
        self.merge(reader, &mut value)?;
        Ok(value)
    }

    /// Merges one value into `dst`. Scalars are overwritten, messages are merged.
    #[inline]
    pub fn merge<I: Input>(
        &self,
        reader: &mut ByteReader<I>,
        dst: &mut T,
    ) -> Result<(), DecodeError> {
        match self.end_tag {
            Some(_) => T::decode_group_into(reader, dst, self.tag.field_number()),
            None => T::decode_into(reader, dst),
        }
    }
}

impl<T: ProtoEncode> FieldCodec<T> {
    /// Writes `value` without its tag. Groups are followed by their end tag.
    #[inline]
    pub fn write_value<B: BufMut>(&self, writer: &mut ByteWriter<B>, value: &T) {
        match self.end_tag {
            Some(end_tag) => {
                value.encode_group(writer);
                writer.write_tag(end_tag);
            }
            None => value.encode(writer),
        }
    }

    /// Writes the tag and `value`, even when `value` is the default.
    ///
    /// Used for fields with explicit presence and for oneof members.
    #[inline]
    pub fn write_present<B: BufMut>(&self, writer: &mut ByteWriter<B>, value: &T) {
        writer.write_tag(self.tag);
        self.write_value(writer, value);
    }

    /// Writes the tag and value if `value` is set.
    #[inline]
    pub fn write_optional<B: BufMut>(&self, writer: &mut ByteWriter<B>, value: &Option<T>) {
        if let Some(value) = value {
            self.write_present(writer, value);
        }
    }

    /// Size of `value` without its tags. The end tag of a group is counted
    /// with the start tag, see [`FieldCodec::calculate_size_with_tag`].
    #[inline]
    pub fn calculate_value_size(&self, value: &T) -> usize {
        if let Some(size) = T::FIXED_SIZE {
            return size;
        }
        match self.end_tag {
            Some(_) => value.encoded_group_len(),
            None => value.encoded_len(),
        }
    }

    /// Size written by [`FieldCodec::write_present`].
    #[inline]
    pub fn calculate_present_size(&self, value: &T) -> usize {
        self.tag_size + self.calculate_value_size(value)
    }

    /// Size written by [`FieldCodec::write_optional`].
    #[inline]
    pub fn calculate_optional_size(&self, value: &Option<T>) -> usize {
        value
            .as_ref()
            .map_or(0, |value| self.calculate_present_size(value))
    }
}

impl<T: ProtoEncode + ProtoEq> FieldCodec<T> {
    #[inline(always)]
    fn is_default(&self, value: &T) -> bool {
        !T::EXPLICIT_PRESENCE && value.proto_eq(&self.default_value)
    }

    /// Writes the tag and value, unless `value` equals the default.
    #[inline]
    pub fn write_tag_and_value<B: BufMut>(&self, writer: &mut ByteWriter<B>, value: &T) {
        if !self.is_default(value) {
            self.write_present(writer, value);
        }
    }

    /// Size written by [`FieldCodec::write_tag_and_value`], 0 for the default.
    #[inline]
    pub fn calculate_size_with_tag(&self, value: &T) -> usize {
        if self.is_default(value) {
            0
        } else {
            self.calculate_present_size(value)
        }
    }
}
