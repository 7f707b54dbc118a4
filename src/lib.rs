//! A codec for the protocol buffers wire format.
//!
//! The crate provides the pieces generated message code is written against:
//! varint and tag primitives, a [`ByteReader`] that enforces nesting and size
//! limits over buffers or streams, a [`ByteWriter`], per-field
//! [`FieldCodec`]s, and the repeated and map field collections.

#![deny(clippy::as_conversions)]

pub mod codec;
pub mod config;
pub mod error;
// Publically export `leb128` because the functions are useful on their own.
pub mod leb128;
pub mod reader;
pub mod wire;
pub mod writer;

mod util;

pub use codec::{FieldCodec, MapCodec, MapField, Message, RepeatedField, UnknownFields};
pub use config::{ReaderConfig, WriterConfig};
pub use error::{ArgumentError, DecodeError, EncodeError, InvalidReason};
pub use reader::{ByteReader, ChunkedInput, Input, StreamInput};
pub use wire::{Tag, WireType};
pub use writer::ByteWriter;
