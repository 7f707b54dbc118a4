//! Message-level types and helpers.

use std::io;

use bytes::{BufMut, Bytes};

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::config::{ReaderConfig, WriterConfig};
use crate::error::{DecodeError, EncodeError, InvalidReason};
use crate::leb128::varint_len;
use crate::reader::{ByteReader, Input, StreamInput};
use crate::util::CastFrom;
use crate::wire::{Tag, WireType};
use crate::writer::ByteWriter;

/// Trait for protobuf message types.
///
/// Implemented by generated (or hand-written) message structs. The three
/// required methods handle the message body. Framing, limits and recursion
/// tracking are provided on top of them.
///
/// `merge_field` dispatches on the tag: known fields are read through their
/// [`FieldCodec`](super::FieldCodec), anything else is skipped with
/// [`ByteReader::skip_field`] or kept in an [`UnknownFields`](super::UnknownFields).
/// `write_fields` must write exactly `calculate_size()` bytes.
pub trait Message: Default {
    /// Merges the value of one field whose `tag` was just read.
    fn merge_field<I: Input>(
        &mut self,
        tag: Tag,
        reader: &mut ByteReader<I>,
    ) -> Result<(), DecodeError>;

    /// Writes every field that is present, in field order.
    fn write_fields<B: BufMut>(&self, writer: &mut ByteWriter<B>);

    /// Number of bytes [`Message::write_fields`] writes.
    fn calculate_size(&self) -> usize;

    /// Merges fields until the current limit or the end of the input.
    fn merge_from<I: Input>(&mut self, reader: &mut ByteReader<I>) -> Result<(), DecodeError> {
        while let Some(tag) = reader.read_tag()? {
            self.merge_field(tag, reader)?;
        }
        Ok(())
    }

    /// Merges a whole buffer into this message.
    fn merge_from_slice(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        self.merge_from(&mut ByteReader::new(data))
    }

    /// Merges a message preceded by its length.
    ///
    /// Unlike an embedded message field this does not count as a nesting level.
    fn merge_length_delimited<I: Input>(
        &mut self,
        reader: &mut ByteReader<I>,
    ) -> Result<(), DecodeError> {
        let len = reader.read_length()?;
        let previous = reader.push_limit(len)?;
        self.merge_from(reader)?;
        if !reader.is_reached_limit() {
            return Err(DecodeError::truncated());
        }
        reader.pop_limit(previous);
        Ok(())
    }

    fn parse_from<I: Input>(reader: &mut ByteReader<I>) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        message.merge_from(reader)?;
        Ok(message)
    }

    fn parse_from_slice(data: &[u8]) -> Result<Self, DecodeError> {
        Self::parse_from(&mut ByteReader::new(data))
    }

    fn parse_from_bytes(data: Bytes) -> Result<Self, DecodeError> {
        Self::parse_from(&mut ByteReader::new(data))
    }

    /// Parses a message from a blocking reader, which is read to its end.
    fn parse_from_reader<R: io::Read>(source: R) -> Result<Self, DecodeError> {
        Self::parse_from(&mut ByteReader::new(StreamInput::new(source)))
    }

    fn parse_with_config<I: Input>(input: I, config: ReaderConfig) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::with_config(input, config)?;
        Self::parse_from(&mut reader)
    }

    /// Encodes this message into `buf`.
    ///
    /// Fails before writing anything if `buf` cannot hold the whole message.
    fn encode_to_buf<B: BufMut>(&self, buf: &mut B) -> Result<(), EncodeError> {
        self.encode_with_config(buf, WriterConfig::default())
    }

    fn encode_with_config<B: BufMut>(
        &self,
        buf: &mut B,
        config: WriterConfig,
    ) -> Result<(), EncodeError> {
        let required = self.calculate_size();
        let remaining = buf.remaining_mut();
        if required > remaining {
            return Err(EncodeError::InsufficientCapacity {
                required,
                remaining,
            });
        }

        let mut writer = ByteWriter::with_config(buf, config);
        self.write_fields(&mut writer);
        check_written(required, writer.written())
    }

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.calculate_size());
        let mut writer = ByteWriter::new(&mut buf);
        self.write_fields(&mut writer);
        debug_assert_eq!(writer.written(), self.calculate_size());
        buf
    }

    /// Encodes this message and writes it to `sink`.
    fn write_to<W: io::Write>(&self, mut sink: W) -> Result<(), EncodeError> {
        let mut buf = Vec::with_capacity(self.calculate_size());
        self.encode_to_buf(&mut buf)?;
        sink.write_all(&buf)?;
        Ok(())
    }

    /// Encodes this message preceded by its length.
    fn encode_length_delimited<B: BufMut>(&self, buf: &mut B) -> Result<(), EncodeError> {
        let size = self.calculate_size();
        let required = varint_len(u64::cast_from(size)) + size;
        let remaining = buf.remaining_mut();
        if required > remaining {
            return Err(EncodeError::InsufficientCapacity {
                required,
                remaining,
            });
        }

        let mut writer = ByteWriter::new(buf);
        writer.write_length(size);
        self.write_fields(&mut writer);
        check_written(required, writer.written())
    }
}

fn check_written(expected: usize, actual: usize) -> Result<(), EncodeError> {
    if expected != actual {
        tracing::error!(expected, actual, "message size does not match bytes written");
        return Err(EncodeError::SizeMismatch { expected, actual });
    }
    Ok(())
}

impl<I: Input> ByteReader<I> {
    /// Reads a length-delimited embedded message and merges it into `message`.
    ///
    /// The message must end exactly at its declared length. An empty message
    /// leaves `message` untouched and does not count against the recursion limit.
    pub fn read_message<M: Message>(&mut self, message: &mut M) -> Result<(), DecodeError> {
        let len = self.read_length()?;
        if len == 0 {
            return Ok(());
        }

        self.enter_nested()?;
        let previous = self.push_limit(len)?;
        message.merge_from(self)?;
        if !self.is_reached_limit() {
            return Err(DecodeError::truncated());
        }
        self.pop_limit(previous);
        self.exit_nested();
        Ok(())
    }

    /// Reads the body of a group, whose start tag for `field_number` was just
    /// read, and merges it into `message`.
    pub fn read_group<M: Message>(
        &mut self,
        field_number: u32,
        message: &mut M,
    ) -> Result<(), DecodeError> {
        self.enter_nested()?;
        loop {
            let Some(tag) = self.read_tag()? else {
                return Err(DecodeError::truncated());
            };
            if tag.wire_type() == WireType::EndGroup {
                if tag.field_number() != field_number {
                    return Err(DecodeError::invalid(InvalidReason::MismatchedEndGroup {
                        expected: field_number,
                        actual: tag.field_number(),
                    }));
                }
                break;
            }
            message.merge_field(tag, self)?;
        }
        self.exit_nested();
        Ok(())
    }
}

impl<M: Message> ProtoType for M {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const EXPLICIT_PRESENCE: bool = true;
}

impl<M: Message> ProtoDecode for M {
    #[inline]
    fn decode_into<I: Input>(
        reader: &mut ByteReader<I>,
        dst: &mut Self,
    ) -> Result<(), DecodeError> {
        reader.read_message(dst)
    }

    #[inline]
    fn decode_group_into<I: Input>(
        reader: &mut ByteReader<I>,
        dst: &mut Self,
        field_number: u32,
    ) -> Result<(), DecodeError> {
        reader.read_group(field_number, dst)
    }
}

impl<M: Message> ProtoEncode for M {
    #[inline]
    fn encode<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        writer.write_length(self.calculate_size());
        self.write_fields(writer);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        let size = self.calculate_size();
        varint_len(u64::cast_from(size)) + size
    }

    #[inline]
    fn encode_group<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        self.write_fields(writer);
    }

    #[inline]
    fn encoded_group_len(&self) -> usize {
        self.calculate_size()
    }
}
