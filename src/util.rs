//! Integer casts and branch hints shared by the codec.

/// Lossless conversion between integer types that `From` does not cover
/// because the width of `usize` depends on the platform.
pub(crate) trait CastFrom<T> {
    fn cast_from(from: T) -> Self;
}

macro_rules! cast_from {
    ($from:ty => $($to:ty),+) => {$(
        impl CastFrom<$from> for $to {
            #[inline(always)]
            #[allow(clippy::as_conversions)]
            fn cast_from(from: $from) -> $to {
                from as $to
            }
        }
    )+};
}

cast_from!(u8 => u32, u64, usize);
cast_from!(u32 => u64, usize);
cast_from!(usize => u64);

// `usize` to `u64` above is only lossless on targets with at most 64-bit pointers.
static_assertions::const_assert!(usize::BITS <= u64::BITS);
static_assertions::const_assert!(usize::BITS >= u32::BITS);

#[inline(always)]
#[cold]
fn cold_path() {}

/// "Annotation" to hint that a branch of an if-statement is likely to occur.
#[inline(always)]
pub(crate) fn likely(b: bool) -> bool {
    if b {
        true
    } else {
        cold_path();
        false
    }
}

/// "Annotation" to hint that a branch of an if-statement is _not likely_ to occur.
#[inline(always)]
pub(crate) fn unlikely(b: bool) -> bool {
    if b {
        cold_path();
        true
    } else {
        false
    }
}
