//! Wire format framing for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev).
//!
//! Every field on the wire is prefixed with a tag, the varint
//! `(field_number << 3) | wire_type`.

use std::num::NonZeroU32;

use crate::error::{ArgumentError, DecodeError, InvalidReason};
use crate::leb128::varint_len;
use crate::util::unlikely;

/// Minimum value of a protobuf field number.
pub const MINIMUM_FIELD_NUMBER: u32 = 1;
/// Maximum value of a protobuf field number.
pub const MAXIMUM_FIELD_NUMBER: u32 = (1 << 29) - 1;
/// Field numbers reserved for the protobuf implementation itself.
pub const RESERVED_FIELD_NUMBERS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

const TAG_TYPE_BITS: u32 = 3;
const TAG_TYPE_MASK: u32 = (1 << TAG_TYPE_BITS) - 1;

/// Denotes how the payload following a tag is framed.
///
/// The [`WireType`] says how many bytes follow, never what they mean.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer.
    ///
    /// Used for: `int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`, `bool`, `enum`.
    Varint = 0,
    /// 64-bit little-endian value.
    ///
    /// Used for: `fixed64`, `sfixed64`, `double`.
    Fixed64 = 1,
    /// Varint length followed by that many bytes.
    ///
    /// Used for: `string`, `bytes`, `message`, packed `repeated` fields, map entries.
    LengthDelimited = 2,
    /// Group start (deprecated).
    StartGroup = 3,
    /// Group end (deprecated).
    EndGroup = 4,
    /// 32-bit little-endian value.
    ///
    /// Used for: `fixed32`, `sfixed32`, `float`.
    Fixed32 = 5,
}

static_assertions::assert_eq_size!(WireType, u8);

static_assertions::const_assert_eq!(WireType::Varint.into_val(), 0);
static_assertions::const_assert_eq!(WireType::Fixed64.into_val(), 1);
static_assertions::const_assert_eq!(WireType::LengthDelimited.into_val(), 2);
static_assertions::const_assert_eq!(WireType::StartGroup.into_val(), 3);
static_assertions::const_assert_eq!(WireType::EndGroup.into_val(), 4);
static_assertions::const_assert_eq!(WireType::Fixed32.into_val(), 5);

#[allow(clippy::as_conversions)]
impl WireType {
    /// Try to decode a [`WireType`] from the provided raw value.
    #[inline(always)]
    pub const fn from_val(value: u8) -> Option<Self> {
        match value {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    /// Return the raw value for this [`WireType`].
    #[inline(always)]
    pub const fn into_val(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, DecodeError> {
        WireType::from_val(value).ok_or_else(|| DecodeError::invalid_wire_type(value))
    }
}

/// Packs a field number and wire type into a raw tag value.
///
/// The field number is not validated, see [`Tag::try_new`] for that.
#[inline(always)]
#[allow(clippy::as_conversions)]
pub const fn make_tag(field_number: u32, wire_type: WireType) -> u32 {
    (field_number << TAG_TYPE_BITS) | wire_type.into_val() as u32
}

/// Returns the field number of a raw tag.
#[inline(always)]
pub const fn get_field_number(tag: u32) -> u32 {
    tag >> TAG_TYPE_BITS
}

/// Returns the wire type of a raw tag, or `None` for the unassigned values 6 and 7.
#[inline(always)]
#[allow(clippy::as_conversions)]
pub const fn get_wire_type(tag: u32) -> Option<WireType> {
    WireType::from_val((tag & TAG_TYPE_MASK) as u8)
}

/// A validated, non-zero field tag.
///
/// Stored as a [`NonZeroU32`] so `Option<Tag>` is the same size as a raw tag
/// and "no more fields" costs nothing to represent.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Tag(NonZeroU32);

static_assertions::assert_eq_size!(Option<Tag>, u32);

impl Tag {
    /// Creates a tag from a field number and wire type.
    ///
    /// # Panics
    ///
    /// Panics if `field_number` is 0 or exceeds [`MAXIMUM_FIELD_NUMBER`].
    /// Intended for tags known at compile time, use [`Tag::try_new`] otherwise.
    pub const fn new(field_number: u32, wire_type: WireType) -> Tag {
        assert!(
            field_number >= MINIMUM_FIELD_NUMBER && field_number <= MAXIMUM_FIELD_NUMBER,
            "field number out of range"
        );
        match NonZeroU32::new(make_tag(field_number, wire_type)) {
            Some(raw) => Tag(raw),
            None => panic!("field number out of range"),
        }
    }

    /// Creates a tag, checking the field number is valid for a schema.
    pub fn try_new(field_number: u32, wire_type: WireType) -> Result<Tag, ArgumentError> {
        if !(MINIMUM_FIELD_NUMBER..=MAXIMUM_FIELD_NUMBER).contains(&field_number) {
            return Err(ArgumentError::FieldNumberOutOfRange {
                value: field_number,
            });
        }
        if RESERVED_FIELD_NUMBERS.contains(&field_number) {
            return Err(ArgumentError::ReservedFieldNumber {
                value: field_number,
            });
        }
        Ok(Tag::new(field_number, wire_type))
    }

    /// Validates a raw tag read from the wire.
    ///
    /// Field number 0 and wire types 6 and 7 are rejected. Field numbers in the
    /// reserved range are accepted since they are only reserved for schemas.
    #[inline(always)]
    #[allow(clippy::as_conversions)]
    pub fn from_raw(raw: u32) -> Result<Tag, DecodeError> {
        if unlikely(get_wire_type(raw).is_none()) {
            return Err(DecodeError::invalid_wire_type((raw & TAG_TYPE_MASK) as u8));
        }
        match NonZeroU32::new(raw) {
            Some(raw) if get_field_number(raw.get()) != 0 => Ok(Tag(raw)),
            _ => Err(DecodeError::invalid(InvalidReason::InvalidTag)),
        }
    }

    /// Returns the raw `u32` value of this tag.
    #[inline(always)]
    pub const fn raw(self) -> u32 {
        self.0.get()
    }

    /// Returns the field number component of this tag.
    #[inline(always)]
    pub const fn field_number(self) -> u32 {
        get_field_number(self.0.get())
    }

    /// Returns the [`WireType`] component of this tag.
    #[inline(always)]
    pub const fn wire_type(self) -> WireType {
        match get_wire_type(self.0.get()) {
            Some(wire_type) => wire_type,
            // Every constructor validates the wire type.
            None => WireType::Varint,
        }
    }

    /// Returns this tag with the same field number and a different wire type.
    #[inline(always)]
    pub const fn with_wire_type(self, wire_type: WireType) -> Tag {
        Tag::new(self.field_number(), wire_type)
    }

    /// Number of bytes this tag occupies on the wire.
    #[inline(always)]
    #[allow(clippy::as_conversions)]
    pub const fn encoded_len(self) -> usize {
        varint_len(self.0.get() as u64)
    }
}

impl std::fmt::Debug for Tag {
    #[cold]
    #[inline(never)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tag")
            .field("field_number", &self.field_number())
            .field("wire_type", &self.wire_type())
            .finish()
    }
}
