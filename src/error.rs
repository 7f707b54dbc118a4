//! Errors produced while decoding or encoding the protobuf wire format.

use std::io;

use thiserror::Error;

use crate::wire::WireType;

/// Error returned when decoding protobuf wire data fails.
///
/// Every variant is terminal for the parse that produced it. The destination
/// message may have been partially populated and should be discarded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A varint ran past its maximum byte count without terminating.
    #[error("malformed varint: no terminating byte within the maximum length")]
    MalformedVarint,
    /// The input ended, or a pushed limit was reached, before a complete
    /// value could be read.
    #[error("truncated message: input ended in the middle of a field")]
    TruncatedMessage,
    /// The input is structurally invalid.
    #[error("invalid protocol buffer: {0}")]
    InvalidProtocolBuffer(InvalidReason),
    /// The underlying stream failed.
    #[error("i/o error while reading input: {0}")]
    Io(#[from] io::Error),
    /// The reader was built with invalid arguments, no input was parsed.
    #[error("invalid reader arguments: {0}")]
    Argument(#[from] ArgumentError),
}

/// Why an input was rejected as [`DecodeError::InvalidProtocolBuffer`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("tag has field number 0")]
    InvalidTag,
    #[error("invalid wire type {value}")]
    InvalidWireType { value: u8 },
    #[error("length prefix {value} is negative or too large")]
    NegativeSize { value: u64 },
    #[error("message exceeds the configured size limit of {limit} bytes")]
    SizeLimitExceeded { limit: u64 },
    #[error("message nesting exceeds the recursion limit of {limit}")]
    RecursionLimitExceeded { limit: u32 },
    #[error("length-delimited field claims {requested} bytes but only {available} remain")]
    PushedLimitExceeded { requested: u64, available: u64 },
    #[error("end-group tag for field {actual} does not match start-group field {expected}")]
    MismatchedEndGroup { expected: u32, actual: u32 },
    #[error("end-group tag without a matching start-group")]
    UnexpectedEndGroup,
    #[error("packed field length {length} is not a multiple of {element_size}")]
    InvalidPackedLength { element_size: usize, length: usize },
}

impl DecodeError {
    #[cold]
    #[inline(never)]
    pub(crate) fn malformed_varint() -> Self {
        tracing::debug!("rejecting varint longer than 10 bytes");
        DecodeError::MalformedVarint
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn truncated() -> Self {
        DecodeError::TruncatedMessage
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn invalid(reason: InvalidReason) -> Self {
        tracing::debug!(%reason, "rejecting invalid protocol buffer");
        DecodeError::InvalidProtocolBuffer(reason)
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn invalid_wire_type(value: u8) -> Self {
        Self::invalid(InvalidReason::InvalidWireType { value })
    }

    /// Returns the [`InvalidReason`] if this is an `InvalidProtocolBuffer` error.
    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        match self {
            DecodeError::InvalidProtocolBuffer(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// A precondition violated while constructing a reader, writer or codec.
///
/// These are raised eagerly, before any input is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("range {offset}..{offset}+{length} is outside a buffer of {buffer_len} bytes")]
    OutOfRange {
        offset: usize,
        length: usize,
        buffer_len: usize,
    },
    #[error("{name} must be positive")]
    NotPositive { name: &'static str },
    #[error("field number {value} is outside the valid range")]
    FieldNumberOutOfRange { value: u32 },
    #[error("field number {value} is in the reserved range 19000..=19999")]
    ReservedFieldNumber { value: u32 },
    #[error("tag wire type {actual:?} is incompatible with a value of wire type {expected:?}")]
    IncompatibleWireType { expected: WireType, actual: WireType },
}

/// Error returned when encoding a message fails.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The destination buffer cannot hold the encoded message.
    #[error("insufficient buffer capacity: need {required} bytes, {remaining} remaining")]
    InsufficientCapacity { required: usize, remaining: usize },
    /// The bytes written differ from the computed size, which indicates a
    /// bug in a message's `write_fields` or `calculate_size`.
    #[error("message wrote {actual} bytes but calculated {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    /// The destination sink failed.
    #[error("i/o error while writing output: {0}")]
    Io(#[from] io::Error),
}
