//! Base-128 variable-length integers ("varints") and zigzag mapping.
//!
//! Varints carry 7 payload bits per byte, least significant group first, with
//! the high bit of each byte set when more bytes follow. Output is always the
//! minimal encoding, input may be padded up to the 10 byte ceiling.

// This module uses `as` casts which have been reviewed for truncation.
#![allow(clippy::as_conversions)]

use crate::error::DecodeError;

/// Maximum number of bytes a varint may occupy on the wire.
pub const MAX_VARINT_LEN: usize = 10;

/// Types that can be encoded to and decoded from a LEB128 varint.
pub trait LebCodec: Sized + Copy {
    /// Number of bytes that carry payload bits for this type.
    const MAX_LEB_BYTES: usize;

    /// Decodes a varint from the front of `data`.
    ///
    /// Returns `Ok(None)` when `data` ends before a terminating byte was seen,
    /// in which case the caller has to supply more input, and otherwise the
    /// value together with the number of bytes consumed.
    ///
    /// Fails with [`DecodeError::MalformedVarint`] if [`MAX_VARINT_LEN`] bytes
    /// are present without a terminating byte.
    fn decode_leb128(data: &[u8]) -> Result<Option<(Self, usize)>, DecodeError>;

    /// Encodes `self` as a minimal-length varint, returning the bytes written.
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize;

    /// Returns the number of bytes [`LebCodec::encode_leb128`] would write.
    fn encoded_leb128_len(self) -> usize;
}

impl LebCodec for u64 {
    const MAX_LEB_BYTES: usize = 10;

    #[inline]
    fn decode_leb128(data: &[u8]) -> Result<Option<(Self, usize)>, DecodeError> {
        match data.first() {
            None => return Ok(None),
            Some(&byte) if byte < 0x80 => return Ok(Some((u64::from(byte), 1))),
            Some(_) => (),
        }

        let mut value = 0u64;
        for (idx, &byte) in data.iter().take(Self::MAX_LEB_BYTES).enumerate() {
            // Payload bits of the tenth byte past bit 63 are dropped.
            value |= u64::from(byte & 0x7F) << (7 * idx);
            if byte < 0x80 {
                return Ok(Some((value, idx + 1)));
            }
        }

        if data.len() >= MAX_VARINT_LEN {
            Err(DecodeError::malformed_varint())
        } else {
            Ok(None)
        }
    }

    #[inline]
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize {
        if self < 0x80 {
            buf.put_u8(self as u8);
            return 1;
        }

        let mut scratch = [0u8; MAX_VARINT_LEN];
        let mut value = self;
        let mut len = 0;
        while value >= 0x80 {
            scratch[len] = (value as u8) | 0x80;
            value >>= 7;
            len += 1;
        }
        scratch[len] = value as u8;
        len += 1;

        buf.put_slice(&scratch[..len]);
        len
    }

    #[inline(always)]
    fn encoded_leb128_len(self) -> usize {
        varint_len(self)
    }
}

impl LebCodec for u32 {
    const MAX_LEB_BYTES: usize = 5;

    /// Values written by a 64-bit encoder (for example a sign-extended
    /// negative `int32`) occupy up to 10 bytes. Bytes past the fifth are
    /// consumed and their payload discarded.
    #[inline]
    fn decode_leb128(data: &[u8]) -> Result<Option<(Self, usize)>, DecodeError> {
        match data.first() {
            None => return Ok(None),
            Some(&byte) if byte < 0x80 => return Ok(Some((u32::from(byte), 1))),
            Some(_) => (),
        }

        let mut value = 0u32;
        for (idx, &byte) in data.iter().take(MAX_VARINT_LEN).enumerate() {
            if idx < Self::MAX_LEB_BYTES {
                value |= u32::from(byte & 0x7F) << (7 * idx);
            }
            if byte < 0x80 {
                return Ok(Some((value, idx + 1)));
            }
        }

        if data.len() >= MAX_VARINT_LEN {
            Err(DecodeError::malformed_varint())
        } else {
            Ok(None)
        }
    }

    #[inline]
    fn encode_leb128<B: bytes::BufMut>(self, buf: &mut B) -> usize {
        u64::from(self).encode_leb128(buf)
    }

    #[inline(always)]
    fn encoded_leb128_len(self) -> usize {
        varint_len(u64::from(self))
    }
}

/// Returns the encoded length of `value` as a varint.
///
/// `leading_zeros` lowers to a single instruction on most targets, and the
/// multiply-shift maps the highest set bit onto a byte count without a branch.
#[inline(always)]
pub const fn varint_len(value: u64) -> usize {
    let highest_bit = (value | 1).leading_zeros() ^ 63;
    ((highest_bit * 9 + 73) / 64) as usize
}

/// Maps a signed 32-bit integer onto an unsigned one so small magnitudes
/// encode to short varints.
#[inline(always)]
pub const fn encode_zigzag32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Inverse of [`encode_zigzag32`].
#[inline(always)]
pub const fn decode_zigzag32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ (-((n & 1) as i32))
}

/// Maps a signed 64-bit integer onto an unsigned one so small magnitudes
/// encode to short varints.
#[inline(always)]
pub const fn encode_zigzag64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`encode_zigzag64`].
#[inline(always)]
pub const fn decode_zigzag64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}
