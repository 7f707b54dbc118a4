//! Preserving fields a message does not recognise.

use bytes::BufMut;

use crate::error::{DecodeError, InvalidReason};
use crate::reader::{ByteReader, Input};
use crate::wire::{Tag, WireType};
use crate::writer::ByteWriter;

/// Fields kept verbatim so they survive a decode and re-encode.
///
/// A message that wants to round-trip fields from newer schemas holds one of
/// these and hands every unrecognised tag to [`UnknownFields::merge_field`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnknownFields {
    data: Vec<u8>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the field whose `tag` was just read, including whole groups.
    pub fn merge_field<I: Input>(
        &mut self,
        tag: Tag,
        reader: &mut ByteReader<I>,
    ) -> Result<(), DecodeError> {
        let mut writer = ByteWriter::new(&mut self.data);
        copy_field(tag, reader, &mut writer)
    }

    /// Writes the preserved fields.
    pub fn write_to<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        writer.write_raw_bytes(&self.data);
    }

    pub fn calculate_size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// The preserved fields, tags included, in the order they were read.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

fn copy_field<I: Input, B: BufMut>(
    tag: Tag,
    reader: &mut ByteReader<I>,
    writer: &mut ByteWriter<B>,
) -> Result<(), DecodeError> {
    match tag.wire_type() {
        WireType::Varint => {
            let value = reader.read_varint64()?;
            writer.write_tag(tag);
            writer.write_varint64(value);
        }
        WireType::Fixed64 => {
            let value = reader.read_fixed64()?;
            writer.write_tag(tag);
            writer.write_fixed64(value);
        }
        WireType::LengthDelimited => {
            let value = reader.read_bytes()?;
            writer.write_tag(tag);
            writer.write_bytes(&value);
        }
        WireType::StartGroup => {
            reader.enter_nested()?;
            writer.write_tag(tag);
            loop {
                let Some(inner) = reader.read_tag()? else {
                    return Err(DecodeError::truncated());
                };
                if inner.wire_type() == WireType::EndGroup {
                    if inner.field_number() != tag.field_number() {
                        return Err(DecodeError::invalid(InvalidReason::MismatchedEndGroup {
                            expected: tag.field_number(),
                            actual: inner.field_number(),
                        }));
                    }
                    writer.write_tag(inner);
                    break;
                }
                copy_field(inner, reader, writer)?;
            }
            reader.exit_nested();
        }
        WireType::EndGroup => {
            return Err(DecodeError::invalid(InvalidReason::UnexpectedEndGroup));
        }
        WireType::Fixed32 => {
            let value = reader.read_fixed32()?;
            writer.write_tag(tag);
            writer.write_fixed32(value);
        }
    }
    Ok(())
}
