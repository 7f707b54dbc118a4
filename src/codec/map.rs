//! Protobuf map field support.
//!
//! Maps in protobuf are syntactic sugar for `repeated Entry { K key = 1; V value = 2; }`.
//! Each map entry is encoded as a length-delimited record with two fields.
//!
//! # Wire Format
//!
//! ```text
//! [field_tag, LEN] [entry_len] [key_tag=1, key_wire] [key_value] [value_tag=2, value_wire] [value_value]
//! ```
//!
//! # Valid Key Types
//!
//! Keys may be integral types, bool or string.
//! NOT valid: float, double, bytes, enum, messages.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::ops::{Deref, DerefMut};

use bytes::BufMut;
use indexmap::IndexMap;

use super::{FieldCodec, ProtoDecode, ProtoEncode, ProtoEq, ProtoType};
use crate::error::DecodeError;
use crate::leb128::varint_len;
use crate::reader::{ByteReader, Input};
use crate::util::CastFrom;
use crate::wire::{Tag, WireType};
use crate::writer::ByteWriter;

/// Marker trait for types that can be used as protobuf map keys.
pub trait ProtoMapKey:
    ProtoDecode + ProtoEncode + ProtoEq + Default + Clone + Eq + Hash + Ord
{
}

impl ProtoMapKey for i32 {}
impl ProtoMapKey for i64 {}
impl ProtoMapKey for u32 {}
impl ProtoMapKey for u64 {}
impl ProtoMapKey for bool {}
impl ProtoMapKey for super::Sint32 {}
impl ProtoMapKey for super::Sint64 {}
impl ProtoMapKey for super::Fixed32 {}
impl ProtoMapKey for super::Fixed64 {}
impl ProtoMapKey for super::Sfixed32 {}
impl ProtoMapKey for super::Sfixed64 {}
impl ProtoMapKey for String {}

/// A collection that can back a map field.
pub trait ProtoMap<K, V> {
    /// Inserts a decoded entry, replacing any value already stored for `key`.
    fn insert_entry(&mut self, key: K, value: V);

    fn entry_count(&self) -> usize;

    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a;
}

impl<K: Hash + Eq, V> ProtoMap<K, V> for MapField<K, V> {
    fn insert_entry(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }

    fn entry_count(&self) -> usize {
        self.map.len()
    }

    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.map.iter()
    }
}

impl<K: Ord, V> ProtoMap<K, V> for BTreeMap<K, V> {
    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ProtoMap<K, V> for HashMap<K, V, S> {
    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }
}

/// Reads and writes a map field as a sequence of entry messages.
#[derive(Debug, Clone)]
pub struct MapCodec<K, V> {
    key_codec: FieldCodec<K>,
    value_codec: FieldCodec<V>,
    map_tag: Tag,
}

impl<K, V> MapCodec<K, V> {
    /// Creates a codec from the entry's key codec (field 1), value codec
    /// (field 2), and the length-delimited tag of the map field.
    pub const fn new(key_codec: FieldCodec<K>, value_codec: FieldCodec<V>, map_tag: Tag) -> Self {
        MapCodec {
            key_codec,
            value_codec,
            map_tag,
        }
    }

    pub fn key_codec(&self) -> &FieldCodec<K> {
        &self.key_codec
    }

    pub fn value_codec(&self) -> &FieldCodec<V> {
        &self.value_codec
    }

    pub fn map_tag(&self) -> Tag {
        self.map_tag
    }
}

impl<K: ProtoType + Default, V: ProtoType + Default> MapCodec<K, V> {
    /// Creates a codec for map field `field_number` with default key and value codecs.
    ///
    /// # Panics
    ///
    /// Panics if `field_number` is outside the valid range.
    pub fn for_field(field_number: u32) -> Self {
        Self::new(
            FieldCodec::new(1),
            FieldCodec::new(2),
            Tag::new(field_number, WireType::LengthDelimited),
        )
    }
}

impl<K, V> MapCodec<K, V>
where
    K: ProtoMapKey,
    V: ProtoDecode + Default + Clone,
{
    /// Reads one entry. The map tag must already have been consumed.
    ///
    /// A missing key or value takes the codec's default, fields may come in
    /// either order, and unknown fields are skipped. An entry counts as one
    /// level of nesting.
    pub fn read_entry<I: Input>(&self, reader: &mut ByteReader<I>) -> Result<(K, V), DecodeError> {
        let len = reader.read_length()?;
        reader.enter_nested()?;
        let previous = reader.push_limit(len)?;

        let mut key = self.key_codec.default_value().clone();
        let mut value = self.value_codec.default_value().clone();
        while let Some(tag) = reader.read_tag()? {
            if tag == self.key_codec.tag() {
                self.key_codec.merge(reader, &mut key)?;
            } else if tag == self.value_codec.tag() {
                self.value_codec.merge(reader, &mut value)?;
            } else {
                reader.skip_field(tag)?;
            }
        }
        if !reader.is_reached_limit() {
            return Err(DecodeError::truncated());
        }

        reader.pop_limit(previous);
        reader.exit_nested();
        Ok((key, value))
    }

    /// Reads the entry whose map tag was just read, and every directly
    /// following entry of the same field, into `map`. Later entries replace
    /// earlier ones with the same key.
    pub fn add_entries_from<I, M>(
        &self,
        reader: &mut ByteReader<I>,
        map: &mut M,
    ) -> Result<(), DecodeError>
    where
        I: Input,
        M: ProtoMap<K, V>,
    {
        loop {
            let (key, value) = self.read_entry(reader)?;
            map.insert_entry(key, value);
            if !reader.maybe_consume_tag(self.map_tag)? {
                return Ok(());
            }
        }
    }
}

impl<K, V> MapCodec<K, V>
where
    K: ProtoEncode + ProtoEq + Ord,
    V: ProtoEncode + ProtoEq,
{
    /// Writes every entry of `map`, ordered by key when the writer is deterministic.
    pub fn write_to<B, M>(&self, writer: &mut ByteWriter<B>, map: &M)
    where
        B: BufMut,
        M: ProtoMap<K, V>,
    {
        if writer.is_deterministic() {
            let mut entries = Vec::with_capacity(map.entry_count());
            entries.extend(map.entries());
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in entries {
                self.write_entry(writer, key, value);
            }
        } else {
            for (key, value) in map.entries() {
                self.write_entry(writer, key, value);
            }
        }
    }

    /// Number of bytes [`MapCodec::write_to`] writes.
    pub fn calculate_size<M: ProtoMap<K, V>>(&self, map: &M) -> usize {
        map.entries()
            .map(|(key, value)| {
                let entry_size = self.entry_size(key, value);
                self.map_tag.encoded_len() + varint_len(u64::cast_from(entry_size)) + entry_size
            })
            .sum()
    }

    fn write_entry<B: BufMut>(&self, writer: &mut ByteWriter<B>, key: &K, value: &V) {
        writer.write_tag(self.map_tag);
        writer.write_length(self.entry_size(key, value));
        self.key_codec.write_tag_and_value(writer, key);
        self.value_codec.write_tag_and_value(writer, value);
    }

    #[inline]
    fn entry_size(&self, key: &K, value: &V) -> usize {
        self.key_codec.calculate_size_with_tag(key) + self.value_codec.calculate_size_with_tag(value)
    }
}

/// A map field that iterates in insertion order.
///
/// Values compare with [`ProtoEq`] and the order of entries does not affect equality.
#[derive(Debug, Clone)]
pub struct MapField<K, V> {
    map: IndexMap<K, V>,
}

impl<K, V> MapField<K, V> {
    pub fn new() -> Self {
        MapField {
            map: IndexMap::new(),
        }
    }

    pub fn into_inner(self) -> IndexMap<K, V> {
        self.map
    }
}

impl<K: Hash + Eq, V> MapField<K, V> {
    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.shift_remove(key)
    }
}

impl<K: ProtoMapKey, V: ProtoDecode + Default + Clone> MapField<K, V> {
    pub fn add_entries_from<I: Input>(
        &mut self,
        reader: &mut ByteReader<I>,
        codec: &MapCodec<K, V>,
    ) -> Result<(), DecodeError> {
        codec.add_entries_from(reader, self)
    }
}

impl<K: ProtoMapKey, V: ProtoEncode + ProtoEq> MapField<K, V> {
    pub fn write_to<B: BufMut>(&self, writer: &mut ByteWriter<B>, codec: &MapCodec<K, V>) {
        codec.write_to(writer, self);
    }

    pub fn calculate_size(&self, codec: &MapCodec<K, V>) -> usize {
        codec.calculate_size(self)
    }
}

impl<K, V> Default for MapField<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Deref for MapField<K, V> {
    type Target = IndexMap<K, V>;

    fn deref(&self) -> &IndexMap<K, V> {
        &self.map
    }
}

impl<K, V> DerefMut for MapField<K, V> {
    fn deref_mut(&mut self) -> &mut IndexMap<K, V> {
        &mut self.map
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for MapField<K, V> {
    fn from_iter<It: IntoIterator<Item = (K, V)>>(iter: It) -> Self {
        MapField {
            map: iter.into_iter().collect(),
        }
    }
}

impl<K: Hash + Eq, V: ProtoEq> ProtoEq for MapField<K, V> {
    fn proto_eq(&self, other: &Self) -> bool {
        self.map.len() == other.map.len()
            && self.map.iter().all(|(key, value)| {
                other
                    .map
                    .get(key)
                    .is_some_and(|other_value| value.proto_eq(other_value))
            })
    }
}

impl<K: Hash + Eq, V: ProtoEq> PartialEq for MapField<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.proto_eq(other)
    }
}
