//! Bulk decoding of packed runs of fixed-width values.
//!
//! When a whole packed field sits in one chunk of the input, its values are
//! converted straight from the slice instead of one read call per element.
//! `chunks_exact` keeps the loop free of bounds checks so LLVM can vectorize it.

/// Appends every `N` byte little-endian value in `data` to `dst`.
///
/// Returns `false` without touching `dst` if `data` is not a whole number of values.
#[inline]
pub(crate) fn extend_from_le<const N: usize, T>(
    data: &[u8],
    dst: &mut Vec<T>,
    convert: impl Fn([u8; N]) -> T,
) -> bool {
    if data.len() % N != 0 {
        return false;
    }

    dst.reserve(data.len() / N);
    dst.extend(data.chunks_exact(N).map(|chunk| {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(chunk);
        convert(bytes)
    }));
    true
}
