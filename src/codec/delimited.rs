//! Length-delimited scalar types: `string` and `bytes`.

use bytes::{BufMut, Bytes};

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::error::DecodeError;
use crate::leb128::varint_len;
use crate::reader::{ByteReader, Input};
use crate::util::CastFrom;
use crate::wire::WireType;
use crate::writer::ByteWriter;

/// Converts raw bytes into a `String`, replacing invalid UTF-8 sequences with U+FFFD.
pub fn string_from_utf8_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

#[inline(always)]
fn delimited_len(len: usize) -> usize {
    varint_len(u64::cast_from(len)) + len
}

impl ProtoType for String {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
}

impl ProtoDecode for String {
    #[inline]
    fn decode_into<I: Input>(
        reader: &mut ByteReader<I>,
        dst: &mut Self,
    ) -> Result<(), DecodeError> {
        *dst = reader.read_string()?;
        Ok(())
    }
}

impl ProtoEncode for String {
    #[inline]
    fn encode<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        writer.write_string(self);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        delimited_len(self.len())
    }
}

impl ProtoType for Vec<u8> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
}

impl ProtoDecode for Vec<u8> {
    #[inline]
    fn decode_into<I: Input>(
        reader: &mut ByteReader<I>,
        dst: &mut Self,
    ) -> Result<(), DecodeError> {
        *dst = reader.read_bytes()?;
        Ok(())
    }
}

impl ProtoEncode for Vec<u8> {
    #[inline]
    fn encode<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        writer.write_bytes(self);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        delimited_len(self.len())
    }
}

impl ProtoType for Bytes {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
}

impl ProtoDecode for Bytes {
    #[inline]
    fn decode_into<I: Input>(
        reader: &mut ByteReader<I>,
        dst: &mut Self,
    ) -> Result<(), DecodeError> {
        *dst = Bytes::from(reader.read_bytes()?);
        Ok(())
    }
}

impl ProtoEncode for Bytes {
    #[inline]
    fn encode<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        writer.write_bytes(self);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        delimited_len(self.len())
    }
}
