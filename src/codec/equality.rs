//! Equality of protobuf values as the wire sees them.
//!
//! Floating point values compare by bit pattern, so a NaN equals itself and
//! `-0.0` differs from `0.0`. Two values are equal exactly when they encode
//! to the same bytes.

use bytes::Bytes;

use super::{Fixed32, Fixed64, Message, Sfixed32, Sfixed64, Sint32, Sint64};

/// Equality used for default checks and by field collections.
pub trait ProtoEq {
    fn proto_eq(&self, other: &Self) -> bool;
}

macro_rules! proto_eq_via_std {
    ($($ty:ty),+ $(,)?) => {$(
        impl ProtoEq for $ty {
            #[inline(always)]
            fn proto_eq(&self, other: &Self) -> bool {
                self == other
            }
        }
    )+};
}

proto_eq_via_std! {
    bool, i32, i64, u32, u64,
    Sint32, Sint64, Fixed32, Fixed64, Sfixed32, Sfixed64,
    String, Vec<u8>, Bytes,
}

impl ProtoEq for f32 {
    #[inline(always)]
    fn proto_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl ProtoEq for f64 {
    #[inline(always)]
    fn proto_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

// Messages compare with their own `PartialEq`, collections inside them compare bitwise.
impl<M: Message + PartialEq> ProtoEq for M {
    #[inline]
    fn proto_eq(&self, other: &Self) -> bool {
        self == other
    }
}
