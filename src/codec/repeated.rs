//! Repeated fields.
//!
//! Packable element types are read in either encoding, whatever the codec
//! writes: a length-delimited tag carries a packed run, the element's own wire
//! type carries one value per tag.

use std::ops::{Deref, DerefMut};

use bytes::BufMut;

use super::{FieldCodec, ProtoDecode, ProtoEncode, ProtoEq};
use crate::error::{DecodeError, InvalidReason};
use crate::leb128::varint_len;
use crate::reader::{ByteReader, Input};
use crate::util::CastFrom;
use crate::wire::Tag;
use crate::writer::ByteWriter;

/// The values of a repeated field, in wire order.
///
/// Equality compares elements with [`ProtoEq`], so float elements compare by
/// bit pattern.
#[derive(Debug, Clone)]
pub struct RepeatedField<T> {
    values: Vec<T>,
}

impl<T> RepeatedField<T> {
    pub fn new() -> Self {
        RepeatedField { values: Vec::new() }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T: ProtoDecode + Default> RepeatedField<T> {
    /// Appends the values of one occurrence of the field whose `tag` was just read.
    ///
    /// An unpacked occurrence also consumes every directly following value with
    /// the same tag.
    pub fn add_entries_from<I: Input>(
        &mut self,
        tag: Tag,
        reader: &mut ByteReader<I>,
        codec: &FieldCodec<T>,
    ) -> Result<(), DecodeError> {
        if codec.is_packed_repeated_field(tag) {
            return self.add_packed_entries(reader, codec);
        }

        loop {
            self.values.push(codec.read(reader)?);
            if !reader.maybe_consume_tag(tag)? {
                return Ok(());
            }
        }
    }

    fn add_packed_entries<I: Input>(
        &mut self,
        reader: &mut ByteReader<I>,
        codec: &FieldCodec<T>,
    ) -> Result<(), DecodeError> {
        let len = reader.read_length()?;
        if len == 0 {
            return Ok(());
        }
        // Checked before anything is appended so a bad run leaves no values behind.
        if let Some(element_size) = T::FIXED_SIZE {
            if len % element_size != 0 {
                return Err(DecodeError::invalid(InvalidReason::InvalidPackedLength {
                    element_size,
                    length: len,
                }));
            }
        }

        let previous = reader.push_limit(len)?;
        let decoded_in_bulk = match reader.peek_contiguous(len) {
            Some(data) => T::decode_packed_fixed(data, &mut self.values),
            None => false,
        };
        if decoded_in_bulk {
            reader.advance_contiguous(len);
        } else {
            // Only reserve for a claimed length once the bytes are known to exist.
            if let Some(element_size) = T::FIXED_SIZE {
                if reader.is_data_available(len) {
                    self.values.reserve(len / element_size);
                }
            }
            while !reader.is_reached_limit() {
                self.values.push(codec.read(reader)?);
            }
        }
        reader.pop_limit(previous);
        Ok(())
    }
}

impl<T: ProtoEncode> RepeatedField<T> {
    /// Writes every value, packed if `codec` is.
    pub fn write_to<B: BufMut>(&self, writer: &mut ByteWriter<B>, codec: &FieldCodec<T>) {
        if self.values.is_empty() {
            return;
        }
        if codec.is_packed() {
            writer.write_tag(codec.tag());
            writer.write_length(self.packed_data_size());
            for value in &self.values {
                value.encode(writer);
            }
        } else {
            for value in &self.values {
                codec.write_present(writer, value);
            }
        }
    }

    /// Number of bytes [`RepeatedField::write_to`] writes.
    pub fn calculate_size(&self, codec: &FieldCodec<T>) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        if codec.is_packed() {
            let data_size = self.packed_data_size();
            codec.tag_size() + varint_len(u64::cast_from(data_size)) + data_size
        } else {
            self.values
                .iter()
                .map(|value| codec.calculate_present_size(value))
                .sum()
        }
    }

    fn packed_data_size(&self) -> usize {
        match T::FIXED_SIZE {
            Some(size) => size * self.values.len(),
            None => self.values.iter().map(ProtoEncode::encoded_len).sum(),
        }
    }
}

impl<T> Default for RepeatedField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for RepeatedField<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.values
    }
}

impl<T> DerefMut for RepeatedField<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.values
    }
}

impl<T> From<Vec<T>> for RepeatedField<T> {
    fn from(values: Vec<T>) -> Self {
        RepeatedField { values }
    }
}

impl<T> FromIterator<T> for RepeatedField<T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        RepeatedField {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for RepeatedField<T> {
    fn extend<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        self.values.extend(iter);
    }
}

impl<T> IntoIterator for RepeatedField<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a RepeatedField<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T: ProtoEq> ProtoEq for RepeatedField<T> {
    fn proto_eq(&self, other: &Self) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.proto_eq(b))
    }
}

impl<T: ProtoEq> PartialEq for RepeatedField<T> {
    fn eq(&self, other: &Self) -> bool {
        self.proto_eq(other)
    }
}
