//! Hand-written messages and helpers shared by the integration tests.

#![allow(dead_code)]

use std::io;

use bytes::{BufMut, Bytes};
use protowire::codec::{
    Enumeration, Fixed32, Fixed64, ProtoEnum, ProtoType, Sfixed32, Sfixed64, Sint32, Sint64,
};
use protowire::{
    ByteReader, ByteWriter, ChunkedInput, DecodeError, FieldCodec, Input, MapCodec, MapField,
    Message, ReaderConfig, RepeatedField, StreamInput, Tag, UnknownFields, WireType,
};

pub const BLOCK_SIZES: [usize; 5] = [1, 2, 4, 8, 16];

/// An [`io::Read`] that returns at most `block` bytes per call.
pub struct SmallBlockReader<'a> {
    data: &'a [u8],
    block: usize,
}

impl<'a> SmallBlockReader<'a> {
    pub fn new(data: &'a [u8], block: usize) -> Self {
        SmallBlockReader { data, block }
    }
}

impl io::Read for SmallBlockReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let cnt = self.block.min(buf.len()).min(self.data.len());
        buf[..cnt].copy_from_slice(&self.data[..cnt]);
        self.data = &self.data[cnt..];
        Ok(cnt)
    }
}

/// Parses `data` from a slice, from `Bytes`, and from streams and chunk
/// sequences of every block size.
pub fn parse_every_way<M: Message>(data: &[u8]) -> Vec<Result<M, DecodeError>> {
    parse_every_way_with(data, ReaderConfig::default())
}

pub fn parse_every_way_with<M: Message>(
    data: &[u8],
    config: ReaderConfig,
) -> Vec<Result<M, DecodeError>> {
    fn parse<M: Message, I: Input>(input: I, config: ReaderConfig) -> Result<M, DecodeError> {
        M::parse_with_config(input, config)
    }

    let mut results = vec![
        parse(data, config),
        parse(Bytes::copy_from_slice(data), config),
    ];
    for block in BLOCK_SIZES {
        let source = SmallBlockReader::new(data, block);
        results.push(parse(StreamInput::new(source), config));

        let chunks: Vec<Bytes> = data.chunks(block).map(Bytes::copy_from_slice).collect();
        results.push(parse(ChunkedInput::new(chunks), config));
    }
    results
}

/// Whether `tag` carries values of a repeated field read through `codec`, in
/// either the packed or the unpacked encoding.
pub fn is_repeated_tag<T: ProtoType>(codec: &FieldCodec<T>, tag: Tag) -> bool {
    tag.field_number() == codec.tag().field_number()
        && (tag.wire_type() == T::WIRE_TYPE || codec.is_packed_repeated_field(tag))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Unspecified,
    Red,
    Green,
}

impl ProtoEnum for Color {
    fn to_i32(self) -> i32 {
        match self {
            Color::Unspecified => 0,
            Color::Red => 1,
            Color::Green => 2,
        }
    }

    fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Color::Unspecified),
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            _ => None,
        }
    }
}

/// `message NestedMessage { int32 a = 1; string b = 2; }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedMessage {
    pub a: i32,
    pub b: String,
}

impl NestedMessage {
    pub const EMPTY: NestedMessage = NestedMessage {
        a: 0,
        b: String::new(),
    };
}

static NESTED_A: FieldCodec<i32> = FieldCodec::for_int32(1);
static NESTED_B: FieldCodec<String> = FieldCodec::for_string(2);

impl Message for NestedMessage {
    fn merge_field<I: Input>(
        &mut self,
        tag: Tag,
        reader: &mut ByteReader<I>,
    ) -> Result<(), DecodeError> {
        match tag {
            t if t == NESTED_A.tag() => NESTED_A.merge(reader, &mut self.a),
            t if t == NESTED_B.tag() => NESTED_B.merge(reader, &mut self.b),
            _ => reader.skip_field(tag),
        }
    }

    fn write_fields<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        NESTED_A.write_tag_and_value(writer, &self.a);
        NESTED_B.write_tag_and_value(writer, &self.b);
    }

    fn calculate_size(&self) -> usize {
        NESTED_A.calculate_size_with_tag(&self.a) + NESTED_B.calculate_size_with_tag(&self.b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    Text(String),
    Nested(NestedMessage),
    Number(u32),
}

/// A message with a field of every kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestAllTypes {
    pub single_int32: i32,
    pub single_int64: i64,
    pub single_uint32: u32,
    pub single_uint64: u64,
    pub single_sint32: Sint32,
    pub single_sint64: Sint64,
    pub single_fixed32: Fixed32,
    pub single_fixed64: Fixed64,
    pub single_sfixed32: Sfixed32,
    pub single_sfixed64: Sfixed64,
    pub single_float: f32,
    pub single_double: f64,
    pub single_bool: bool,
    pub single_string: String,
    pub single_bytes: Vec<u8>,
    pub single_nested: Option<NestedMessage>,
    pub single_color: Enumeration<Color>,
    pub packed_int32: RepeatedField<i32>,
    pub repeated_string: RepeatedField<String>,
    pub packed_double: RepeatedField<f64>,
    pub unpacked_sint64: RepeatedField<Sint64>,
    pub string_to_int: MapField<String, i32>,
    pub int_to_nested: MapField<i32, NestedMessage>,
    pub choice: Option<Choice>,
    pub unknown: UnknownFields,
}

pub static INT32: FieldCodec<i32> = FieldCodec::for_int32(1);
pub static INT64: FieldCodec<i64> = FieldCodec::for_int64(2);
pub static UINT32: FieldCodec<u32> = FieldCodec::for_uint32(3);
pub static UINT64: FieldCodec<u64> = FieldCodec::for_uint64(4);
pub static SINT32: FieldCodec<Sint32> = FieldCodec::for_sint32(5);
pub static SINT64: FieldCodec<Sint64> = FieldCodec::for_sint64(6);
pub static FIXED32: FieldCodec<Fixed32> = FieldCodec::for_fixed32(7);
pub static FIXED64: FieldCodec<Fixed64> = FieldCodec::for_fixed64(8);
pub static SFIXED32: FieldCodec<Sfixed32> = FieldCodec::for_sfixed32(9);
pub static SFIXED64: FieldCodec<Sfixed64> = FieldCodec::for_sfixed64(10);
pub static FLOAT: FieldCodec<f32> = FieldCodec::for_float(11);
pub static DOUBLE: FieldCodec<f64> = FieldCodec::for_double(12);
pub static BOOL: FieldCodec<bool> = FieldCodec::for_bool(13);
pub static STRING: FieldCodec<String> = FieldCodec::for_string(14);
pub static BYTES: FieldCodec<Vec<u8>> = FieldCodec::for_bytes(15);
pub static NESTED: FieldCodec<NestedMessage> = FieldCodec::from_parts(
    Tag::new(16, WireType::LengthDelimited),
    None,
    NestedMessage::EMPTY,
);
pub static COLOR: FieldCodec<Enumeration<Color>> =
    FieldCodec::from_parts(Tag::new(17, WireType::Varint), None, Enumeration::from_raw(0));
pub static PACKED_INT32: FieldCodec<i32> =
    FieldCodec::from_parts(Tag::new(18, WireType::LengthDelimited), None, 0);
pub static REPEATED_STRING: FieldCodec<String> = FieldCodec::for_string(19);
pub static PACKED_DOUBLE: FieldCodec<f64> =
    FieldCodec::from_parts(Tag::new(20, WireType::LengthDelimited), None, 0.0);
pub static UNPACKED_SINT64: FieldCodec<Sint64> = FieldCodec::for_sint64(21);
pub static STRING_TO_INT: MapCodec<String, i32> = MapCodec::new(
    FieldCodec::for_string(1),
    FieldCodec::for_int32(2),
    Tag::new(22, WireType::LengthDelimited),
);
pub static INT_TO_NESTED: MapCodec<i32, NestedMessage> = MapCodec::new(
    FieldCodec::for_int32(1),
    FieldCodec::from_parts(
        Tag::new(2, WireType::LengthDelimited),
        None,
        NestedMessage::EMPTY,
    ),
    Tag::new(23, WireType::LengthDelimited),
);
pub static ONEOF_STRING: FieldCodec<String> = FieldCodec::for_string(24);
pub static ONEOF_NESTED: FieldCodec<NestedMessage> = FieldCodec::from_parts(
    Tag::new(25, WireType::LengthDelimited),
    None,
    NestedMessage::EMPTY,
);
pub static ONEOF_UINT32: FieldCodec<u32> = FieldCodec::for_uint32(26);

impl Message for TestAllTypes {
    fn merge_field<I: Input>(
        &mut self,
        tag: Tag,
        reader: &mut ByteReader<I>,
    ) -> Result<(), DecodeError> {
        match tag {
            t if t == INT32.tag() => INT32.merge(reader, &mut self.single_int32),
            t if t == INT64.tag() => INT64.merge(reader, &mut self.single_int64),
            t if t == UINT32.tag() => UINT32.merge(reader, &mut self.single_uint32),
            t if t == UINT64.tag() => UINT64.merge(reader, &mut self.single_uint64),
            t if t == SINT32.tag() => SINT32.merge(reader, &mut self.single_sint32),
            t if t == SINT64.tag() => SINT64.merge(reader, &mut self.single_sint64),
            t if t == FIXED32.tag() => FIXED32.merge(reader, &mut self.single_fixed32),
            t if t == FIXED64.tag() => FIXED64.merge(reader, &mut self.single_fixed64),
            t if t == SFIXED32.tag() => SFIXED32.merge(reader, &mut self.single_sfixed32),
            t if t == SFIXED64.tag() => SFIXED64.merge(reader, &mut self.single_sfixed64),
            t if t == FLOAT.tag() => FLOAT.merge(reader, &mut self.single_float),
            t if t == DOUBLE.tag() => DOUBLE.merge(reader, &mut self.single_double),
            t if t == BOOL.tag() => BOOL.merge(reader, &mut self.single_bool),
            t if t == STRING.tag() => STRING.merge(reader, &mut self.single_string),
            t if t == BYTES.tag() => BYTES.merge(reader, &mut self.single_bytes),
            t if t == NESTED.tag() => {
                NESTED.merge(reader, self.single_nested.get_or_insert_with(Default::default))
            }
            t if t == COLOR.tag() => COLOR.merge(reader, &mut self.single_color),
            t if is_repeated_tag(&PACKED_INT32, t) => {
                self.packed_int32.add_entries_from(tag, reader, &PACKED_INT32)
            }
            t if t == REPEATED_STRING.tag() => {
                self.repeated_string
                    .add_entries_from(tag, reader, &REPEATED_STRING)
            }
            t if is_repeated_tag(&PACKED_DOUBLE, t) => {
                self.packed_double.add_entries_from(tag, reader, &PACKED_DOUBLE)
            }
            t if is_repeated_tag(&UNPACKED_SINT64, t) => {
                self.unpacked_sint64
                    .add_entries_from(tag, reader, &UNPACKED_SINT64)
            }
            t if t == STRING_TO_INT.map_tag() => {
                self.string_to_int.add_entries_from(reader, &STRING_TO_INT)
            }
            t if t == INT_TO_NESTED.map_tag() => {
                self.int_to_nested.add_entries_from(reader, &INT_TO_NESTED)
            }
            t if t == ONEOF_STRING.tag() => {
                self.choice = Some(Choice::Text(ONEOF_STRING.read(reader)?));
                Ok(())
            }
            t if t == ONEOF_NESTED.tag() => {
                let mut nested = match self.choice.take() {
                    Some(Choice::Nested(nested)) => nested,
                    _ => NestedMessage::default(),
                };
                ONEOF_NESTED.merge(reader, &mut nested)?;
                self.choice = Some(Choice::Nested(nested));
                Ok(())
            }
            t if t == ONEOF_UINT32.tag() => {
                self.choice = Some(Choice::Number(ONEOF_UINT32.read(reader)?));
                Ok(())
            }
            _ => self.unknown.merge_field(tag, reader),
        }
    }

    fn write_fields<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        INT32.write_tag_and_value(writer, &self.single_int32);
        INT64.write_tag_and_value(writer, &self.single_int64);
        UINT32.write_tag_and_value(writer, &self.single_uint32);
        UINT64.write_tag_and_value(writer, &self.single_uint64);
        SINT32.write_tag_and_value(writer, &self.single_sint32);
        SINT64.write_tag_and_value(writer, &self.single_sint64);
        FIXED32.write_tag_and_value(writer, &self.single_fixed32);
        FIXED64.write_tag_and_value(writer, &self.single_fixed64);
        SFIXED32.write_tag_and_value(writer, &self.single_sfixed32);
        SFIXED64.write_tag_and_value(writer, &self.single_sfixed64);
        FLOAT.write_tag_and_value(writer, &self.single_float);
        DOUBLE.write_tag_and_value(writer, &self.single_double);
        BOOL.write_tag_and_value(writer, &self.single_bool);
        STRING.write_tag_and_value(writer, &self.single_string);
        BYTES.write_tag_and_value(writer, &self.single_bytes);
        NESTED.write_optional(writer, &self.single_nested);
        COLOR.write_tag_and_value(writer, &self.single_color);
        self.packed_int32.write_to(writer, &PACKED_INT32);
        self.repeated_string.write_to(writer, &REPEATED_STRING);
        self.packed_double.write_to(writer, &PACKED_DOUBLE);
        self.unpacked_sint64.write_to(writer, &UNPACKED_SINT64);
        self.string_to_int.write_to(writer, &STRING_TO_INT);
        self.int_to_nested.write_to(writer, &INT_TO_NESTED);
        match &self.choice {
            Some(Choice::Text(text)) => ONEOF_STRING.write_present(writer, text),
            Some(Choice::Nested(nested)) => ONEOF_NESTED.write_present(writer, nested),
            Some(Choice::Number(number)) => ONEOF_UINT32.write_present(writer, number),
            None => {}
        }
        self.unknown.write_to(writer);
    }

    fn calculate_size(&self) -> usize {
        let choice = match &self.choice {
            Some(Choice::Text(text)) => ONEOF_STRING.calculate_present_size(text),
            Some(Choice::Nested(nested)) => ONEOF_NESTED.calculate_present_size(nested),
            Some(Choice::Number(number)) => ONEOF_UINT32.calculate_present_size(number),
            None => 0,
        };

        INT32.calculate_size_with_tag(&self.single_int32)
            + INT64.calculate_size_with_tag(&self.single_int64)
            + UINT32.calculate_size_with_tag(&self.single_uint32)
            + UINT64.calculate_size_with_tag(&self.single_uint64)
            + SINT32.calculate_size_with_tag(&self.single_sint32)
            + SINT64.calculate_size_with_tag(&self.single_sint64)
            + FIXED32.calculate_size_with_tag(&self.single_fixed32)
            + FIXED64.calculate_size_with_tag(&self.single_fixed64)
            + SFIXED32.calculate_size_with_tag(&self.single_sfixed32)
            + SFIXED64.calculate_size_with_tag(&self.single_sfixed64)
            + FLOAT.calculate_size_with_tag(&self.single_float)
            + DOUBLE.calculate_size_with_tag(&self.single_double)
            + BOOL.calculate_size_with_tag(&self.single_bool)
            + STRING.calculate_size_with_tag(&self.single_string)
            + BYTES.calculate_size_with_tag(&self.single_bytes)
            + NESTED.calculate_optional_size(&self.single_nested)
            + COLOR.calculate_size_with_tag(&self.single_color)
            + self.packed_int32.calculate_size(&PACKED_INT32)
            + self.repeated_string.calculate_size(&REPEATED_STRING)
            + self.packed_double.calculate_size(&PACKED_DOUBLE)
            + self.unpacked_sint64.calculate_size(&UNPACKED_SINT64)
            + self.string_to_int.calculate_size(&STRING_TO_INT)
            + self.int_to_nested.calculate_size(&INT_TO_NESTED)
            + choice
            + self.unknown.calculate_size()
    }
}

/// A message with every field set to a value other than its default.
pub fn sample_all_types() -> TestAllTypes {
    TestAllTypes {
        single_int32: -42,
        single_int64: i64::MIN,
        single_uint32: u32::MAX,
        single_uint64: 300,
        single_sint32: Sint32(-1),
        single_sint64: Sint64(i64::MAX),
        single_fixed32: Fixed32(0xDEAD_BEEF),
        single_fixed64: Fixed64(u64::MAX),
        single_sfixed32: Sfixed32(i32::MIN),
        single_sfixed64: Sfixed64(-2),
        single_float: 1.5,
        single_double: f64::from_bits(0x7FF8_0000_0000_0001),
        single_bool: true,
        single_string: "héllo wörld".to_string(),
        single_bytes: vec![0x00, 0xFF, 0x80],
        single_nested: Some(NestedMessage {
            a: 7,
            b: "nested".to_string(),
        }),
        single_color: Color::Green.into(),
        packed_int32: vec![0, -1, 300, i32::MAX].into(),
        repeated_string: vec![String::new(), "x".to_string()].into(),
        packed_double: vec![0.0, -0.0, f64::NAN, 2.25].into(),
        unpacked_sint64: vec![Sint64(-3), Sint64(0), Sint64(3)].into(),
        string_to_int: [("one".to_string(), 1), ("zero".to_string(), 0)]
            .into_iter()
            .collect(),
        int_to_nested: [
            (
                5,
                NestedMessage {
                    a: 1,
                    b: "five".to_string(),
                },
            ),
            (-1, NestedMessage::default()),
        ]
        .into_iter()
        .collect(),
        choice: Some(Choice::Nested(NestedMessage {
            a: 0,
            b: "chosen".to_string(),
        })),
        unknown: UnknownFields::default(),
    }
}

/// `message RecursiveMessage { RecursiveMessage child = 1; int32 value = 2; }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecursiveMessage {
    pub child: Option<Box<RecursiveMessage>>,
    pub value: i32,
}

static RECURSIVE_CHILD: FieldCodec<RecursiveMessage> = FieldCodec::from_parts(
    Tag::new(1, WireType::LengthDelimited),
    None,
    RecursiveMessage {
        child: None,
        value: 0,
    },
);
static RECURSIVE_VALUE: FieldCodec<i32> = FieldCodec::for_int32(2);

impl Message for RecursiveMessage {
    fn merge_field<I: Input>(
        &mut self,
        tag: Tag,
        reader: &mut ByteReader<I>,
    ) -> Result<(), DecodeError> {
        match tag {
            t if t == RECURSIVE_CHILD.tag() => {
                RECURSIVE_CHILD.merge(reader, self.child.get_or_insert_with(Box::default))
            }
            t if t == RECURSIVE_VALUE.tag() => RECURSIVE_VALUE.merge(reader, &mut self.value),
            _ => reader.skip_field(tag),
        }
    }

    fn write_fields<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        if let Some(child) = &self.child {
            RECURSIVE_CHILD.write_present(writer, child);
        }
        RECURSIVE_VALUE.write_tag_and_value(writer, &self.value);
    }

    fn calculate_size(&self) -> usize {
        self.child
            .as_ref()
            .map_or(0, |child| RECURSIVE_CHILD.calculate_present_size(child))
            + RECURSIVE_VALUE.calculate_size_with_tag(&self.value)
    }
}

/// A message with `depth` levels of non-empty messages nested below it.
pub fn recursive_message(depth: usize) -> RecursiveMessage {
    let mut message = RecursiveMessage {
        child: None,
        value: 1,
    };
    for _ in 0..depth {
        message = RecursiveMessage {
            child: Some(Box::new(message)),
            value: 1,
        };
    }
    message
}

/// `message RecursiveGroup { int32 value = 1; group Child = 2 { ... } }`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecursiveGroup {
    pub value: i32,
    pub child: Option<Box<RecursiveGroup>>,
}

static GROUP_VALUE: FieldCodec<i32> = FieldCodec::for_int32(1);
pub static GROUP_CHILD: FieldCodec<RecursiveGroup> = FieldCodec::from_parts(
    Tag::new(2, WireType::StartGroup),
    Some(Tag::new(2, WireType::EndGroup)),
    RecursiveGroup {
        value: 0,
        child: None,
    },
);

impl Message for RecursiveGroup {
    fn merge_field<I: Input>(
        &mut self,
        tag: Tag,
        reader: &mut ByteReader<I>,
    ) -> Result<(), DecodeError> {
        match tag {
            t if t == GROUP_VALUE.tag() => GROUP_VALUE.merge(reader, &mut self.value),
            t if t == GROUP_CHILD.tag() => {
                GROUP_CHILD.merge(reader, self.child.get_or_insert_with(Box::default))
            }
            _ => reader.skip_field(tag),
        }
    }

    fn write_fields<B: BufMut>(&self, writer: &mut ByteWriter<B>) {
        GROUP_VALUE.write_tag_and_value(writer, &self.value);
        if let Some(child) = &self.child {
            GROUP_CHILD.write_present(writer, child);
        }
    }

    fn calculate_size(&self) -> usize {
        GROUP_VALUE.calculate_size_with_tag(&self.value)
            + self
                .child
                .as_ref()
                .map_or(0, |child| GROUP_CHILD.calculate_present_size(child))
    }
}

/// A message with `depth` groups nested below it.
pub fn recursive_group(depth: usize) -> RecursiveGroup {
    let mut message = RecursiveGroup::default();
    for level in 0..depth {
        message = RecursiveGroup {
            value: i32::try_from(level).unwrap_or(i32::MAX),
            child: Some(Box::new(message)),
        };
    }
    message
}
