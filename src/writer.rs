//! Writing the protobuf wire format into a [`BufMut`].

use bytes::BufMut;

use crate::config::WriterConfig;
use crate::leb128::LebCodec;
use crate::util::CastFrom;
use crate::wire::Tag;

/// A cursor that writes protobuf encoded data and counts the bytes written.
///
/// Writing never fails. Callers check the destination has room before they
/// start, see [`crate::codec::Message::encode_to_buf`].
pub struct ByteWriter<B> {
    buf: B,
    written: usize,
    config: WriterConfig,
}

impl<B: BufMut> ByteWriter<B> {
    pub fn new(buf: B) -> Self {
        Self::with_config(buf, WriterConfig::default())
    }

    pub fn with_config(buf: B, config: WriterConfig) -> Self {
        ByteWriter {
            buf,
            written: 0,
            config,
        }
    }

    /// Number of bytes written so far.
    #[inline(always)]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Whether map entries are written in key order.
    #[inline(always)]
    pub fn is_deterministic(&self) -> bool {
        self.config.deterministic
    }

    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    #[inline]
    pub fn write_varint32(&mut self, value: u32) {
        self.written += value.encode_leb128(&mut self.buf);
    }

    #[inline]
    pub fn write_varint64(&mut self, value: u64) {
        self.written += value.encode_leb128(&mut self.buf);
    }

    #[inline]
    pub fn write_fixed32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
        self.written += 4;
    }

    #[inline]
    pub fn write_fixed64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
        self.written += 8;
    }

    #[inline(always)]
    pub fn write_tag(&mut self, tag: Tag) {
        self.write_varint32(tag.raw());
    }

    /// Writes the length prefix of a length-delimited field.
    #[inline]
    pub fn write_length(&mut self, len: usize) {
        self.write_varint64(u64::cast_from(len));
    }

    /// Writes bytes with no framing.
    #[inline]
    pub fn write_raw_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
        self.written += bytes.len();
    }

    /// Writes a length prefix followed by `bytes`.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_length(bytes.len());
        self.write_raw_bytes(bytes);
    }

    #[inline]
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }
}
