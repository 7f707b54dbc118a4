//! Reading the protobuf wire format from buffers and streams.
//!
//! A [`ByteReader`] is a cursor over an [`Input`]. Besides the position it
//! tracks a stack of limits for length-delimited regions, the current nesting
//! depth, and the configured size limit. None of the reads assume that a
//! varint, tag or length prefix lies within a single chunk of the input.

use std::io;

use bytes::{Buf, Bytes};

use crate::codec::string_from_utf8_lossy;
use crate::config::{ReaderConfig, DEFAULT_STREAM_BUFFER_SIZE};
use crate::error::{ArgumentError, DecodeError, InvalidReason};
use crate::leb128::{LebCodec, MAX_VARINT_LEN};
use crate::util::{likely, CastFrom};
use crate::wire::{Tag, WireType};

/// Limit used when the total length of the input is not known up front.
const NO_LIMIT: u64 = u64::MAX;

/// A source of bytes for a [`ByteReader`].
///
/// Bytes are exposed one contiguous chunk at a time. Chunk boundaries carry no
/// meaning and may fall anywhere, including in the middle of a varint.
pub trait Input {
    /// Returns the bytes available without pulling from the source.
    fn chunk(&self) -> &[u8];

    /// Consumes `cnt` bytes from the front of [`Input::chunk`].
    fn advance(&mut self, cnt: usize);

    /// Pulls more bytes from the source once the current chunk is exhausted.
    ///
    /// Returns `Ok(false)` when the source has no more bytes.
    fn fill(&mut self) -> Result<bool, DecodeError>;

    /// Total number of bytes left, when known without reading the source.
    fn remaining_hint(&self) -> Option<u64> {
        None
    }
}

impl Input for &[u8] {
    #[inline(always)]
    fn chunk(&self) -> &[u8] {
        self
    }

    #[inline(always)]
    fn advance(&mut self, cnt: usize) {
        *self = &self[cnt..];
    }

    fn fill(&mut self) -> Result<bool, DecodeError> {
        Ok(false)
    }

    fn remaining_hint(&self) -> Option<u64> {
        Some(u64::cast_from(self.len()))
    }
}

impl Input for Bytes {
    #[inline(always)]
    fn chunk(&self) -> &[u8] {
        self
    }

    #[inline(always)]
    fn advance(&mut self, cnt: usize) {
        Buf::advance(self, cnt);
    }

    fn fill(&mut self) -> Result<bool, DecodeError> {
        Ok(false)
    }

    fn remaining_hint(&self) -> Option<u64> {
        Some(u64::cast_from(self.len()))
    }
}

/// An [`Input`] that reads from a blocking [`io::Read`] through a fixed buffer.
///
/// Short reads are expected and `Interrupted` errors are retried.
pub struct StreamInput<R> {
    source: R,
    buf: Box<[u8]>,
    pos: usize,
    len: usize,
}

impl<R: io::Read> StreamInput<R> {
    pub fn new(source: R) -> Self {
        StreamInput {
            source,
            buf: vec![0; DEFAULT_STREAM_BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            len: 0,
        }
    }

    /// Creates a [`StreamInput`] that reads at most `capacity` bytes per call.
    pub fn with_capacity(source: R, capacity: usize) -> Result<Self, ArgumentError> {
        if capacity == 0 {
            return Err(ArgumentError::NotPositive { name: "capacity" });
        }
        Ok(StreamInput {
            source,
            buf: vec![0; capacity].into_boxed_slice(),
            pos: 0,
            len: 0,
        })
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Returns the underlying source. Bytes buffered but not yet consumed are lost.
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R: io::Read> Input for StreamInput<R> {
    #[inline(always)]
    fn chunk(&self) -> &[u8] {
        &self.buf[self.pos..self.len]
    }

    #[inline(always)]
    fn advance(&mut self, cnt: usize) {
        debug_assert!(self.pos + cnt <= self.len);
        self.pos += cnt;
    }

    fn fill(&mut self) -> Result<bool, DecodeError> {
        self.pos = 0;
        self.len = 0;
        loop {
            match self.source.read(&mut self.buf) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.len = n;
                    return Ok(true);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// An [`Input`] fed by caller-supplied chunks of any size.
pub struct ChunkedInput<S> {
    chunks: S,
    current: Bytes,
}

impl<S: Iterator<Item = Bytes>> ChunkedInput<S> {
    pub fn new<C>(chunks: C) -> Self
    where
        C: IntoIterator<IntoIter = S, Item = Bytes>,
    {
        ChunkedInput {
            chunks: chunks.into_iter(),
            current: Bytes::new(),
        }
    }
}

impl<S: Iterator<Item = Bytes>> Input for ChunkedInput<S> {
    #[inline(always)]
    fn chunk(&self) -> &[u8] {
        &self.current
    }

    #[inline(always)]
    fn advance(&mut self, cnt: usize) {
        Buf::advance(&mut self.current, cnt);
    }

    fn fill(&mut self) -> Result<bool, DecodeError> {
        for chunk in self.chunks.by_ref() {
            if !chunk.is_empty() {
                self.current = chunk;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A cursor for reading protobuf encoded data from an [`Input`].
pub struct ByteReader<I> {
    input: I,
    /// Number of bytes consumed so far.
    position: u64,
    /// Absolute position reads must stop at.
    limit: u64,
    /// Current nesting depth of messages and groups.
    depth: u32,
    /// A tag read ahead by [`ByteReader::peek_tag`].
    next_tag: Option<Tag>,
    last_tag: Option<Tag>,
    config: ReaderConfig,
}

impl<I: Input> ByteReader<I> {
    /// Creates a reader with the default [`ReaderConfig`].
    pub fn new(input: I) -> Self {
        Self::build(input, ReaderConfig::default())
    }

    /// Creates a reader with the provided limits.
    pub fn with_config(input: I, config: ReaderConfig) -> Result<Self, ArgumentError> {
        config.validate()?;
        Ok(Self::build(input, config))
    }

    fn build(input: I, config: ReaderConfig) -> Self {
        // A fully buffered input bounds the outermost region, so an oversized
        // length prefix fails when it is pushed rather than when the bytes run out.
        let limit = input.remaining_hint().unwrap_or(NO_LIMIT);
        ByteReader {
            input,
            position: 0,
            limit,
            depth: 0,
            next_tag: None,
            last_tag: None,
            config,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Number of bytes consumed from the input.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Current nesting depth of messages, groups and map entries.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The most recent tag returned by [`ByteReader::read_tag`].
    pub fn last_tag(&self) -> Option<Tag> {
        self.last_tag
    }

    /// Finishes reading, returning the input if the reader was configured with
    /// [`ReaderConfig::leave_open`]. Otherwise the input is dropped.
    pub fn close(self) -> Option<I> {
        if self.config.leave_open {
            Some(self.input)
        } else {
            None
        }
    }

    // ---- limits ----

    /// Bounds reads to the next `byte_count` bytes, returning the previous limit
    /// to hand back to [`ByteReader::pop_limit`].
    pub fn push_limit(&mut self, byte_count: usize) -> Result<u64, DecodeError> {
        let requested = u64::cast_from(byte_count);
        let new_limit = self.position.saturating_add(requested);

        if new_limit > self.limit {
            return Err(DecodeError::invalid(InvalidReason::PushedLimitExceeded {
                requested,
                available: self.limit - self.position,
            }));
        }
        if new_limit > self.config.size_limit {
            tracing::debug!(
                position = self.position,
                requested,
                size_limit = self.config.size_limit,
                "length-delimited field exceeds size limit"
            );
            return Err(DecodeError::invalid(InvalidReason::SizeLimitExceeded {
                limit: self.config.size_limit,
            }));
        }

        Ok(std::mem::replace(&mut self.limit, new_limit))
    }

    /// Restores the limit returned by the matching [`ByteReader::push_limit`].
    pub fn pop_limit(&mut self, previous_limit: u64) {
        debug_assert!(previous_limit >= self.limit);
        self.limit = previous_limit;
    }

    /// Returns `true` once every byte before the current limit has been consumed.
    pub fn is_reached_limit(&self) -> bool {
        self.next_tag.is_none() && self.position >= self.limit
    }

    /// Bytes left before the current limit, if one is in effect.
    pub fn bytes_until_limit(&self) -> Option<u64> {
        (self.limit != NO_LIMIT).then(|| self.limit - self.position)
    }

    /// Returns `true` when `len` bytes can be read without pulling from the source.
    pub fn is_data_available(&self, len: usize) -> bool {
        self.visible().len() >= len
    }

    /// Returns `true` when no bytes remain before the limit or in the input.
    pub fn is_at_end(&mut self) -> Result<bool, DecodeError> {
        Ok(self.next_tag.is_none() && !self.ensure_byte()?)
    }

    /// Increments the nesting depth, failing past the recursion limit.
    pub fn enter_nested(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.config.recursion_limit {
            tracing::debug!(
                depth = self.depth,
                position = self.position,
                "nesting exceeds recursion limit"
            );
            return Err(DecodeError::invalid(
                InvalidReason::RecursionLimitExceeded {
                    limit: self.config.recursion_limit,
                },
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Undoes a successful [`ByteReader::enter_nested`].
    pub fn exit_nested(&mut self) {
        debug_assert!(self.depth > 0);
        self.depth = self.depth.saturating_sub(1);
    }

    // ---- buffer management ----

    /// The position reads must stop at, whichever of the two limits is closer.
    #[inline(always)]
    fn end(&self) -> u64 {
        self.limit.min(self.config.size_limit)
    }

    /// The part of the current chunk that lies before the limit.
    #[inline(always)]
    fn visible(&self) -> &[u8] {
        let chunk = self.input.chunk();
        let allowed = usize::try_from(self.end() - self.position).unwrap_or(usize::MAX);
        &chunk[..allowed.min(chunk.len())]
    }

    #[inline(always)]
    fn consume(&mut self, cnt: usize) {
        self.input.advance(cnt);
        self.position += u64::cast_from(cnt);
    }

    /// Makes at least one byte visible. Returns `false` at the limit or the end
    /// of the input, and fails if the next byte lies past the size limit.
    #[inline]
    fn ensure_byte(&mut self) -> Result<bool, DecodeError> {
        if self.position >= self.limit {
            return Ok(false);
        }
        while self.input.chunk().is_empty() {
            if !self.input.fill()? {
                return Ok(false);
            }
        }
        if self.position >= self.config.size_limit {
            return Err(self.overrun_error(self.position.saturating_add(1)));
        }
        Ok(true)
    }

    /// Error for a read that needs the bytes up to `wanted_end`.
    #[cold]
    #[inline(never)]
    fn overrun_error(&self, wanted_end: u64) -> DecodeError {
        let size_limit = self.config.size_limit;
        if wanted_end > size_limit && size_limit < self.limit {
            tracing::debug!(position = self.position, size_limit, "read exceeds size limit");
            DecodeError::invalid(InvalidReason::SizeLimitExceeded { limit: size_limit })
        } else {
            DecodeError::truncated()
        }
    }

    /// Fails unless `len` more bytes fit before the limit.
    #[inline]
    fn check_available(&self, len: usize) -> Result<(), DecodeError> {
        let wanted_end = self.position.saturating_add(u64::cast_from(len));
        if wanted_end > self.end() {
            return Err(self.overrun_error(wanted_end));
        }
        Ok(())
    }

    /// Returns the next `len` bytes if they are contiguous in the current chunk.
    pub(crate) fn peek_contiguous(&self, len: usize) -> Option<&[u8]> {
        let visible = self.visible();
        (visible.len() >= len).then(|| &visible[..len])
    }

    /// Consumes bytes previously returned by [`ByteReader::peek_contiguous`].
    pub(crate) fn advance_contiguous(&mut self, len: usize) {
        self.consume(len);
    }

    // ---- primitives ----

    #[inline]
    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        if !self.ensure_byte()? {
            return Err(self.overrun_error(self.position.saturating_add(1)));
        }
        let byte = match self.input.chunk().first() {
            Some(byte) => *byte,
            None => return Err(DecodeError::truncated()),
        };
        self.consume(1);
        Ok(byte)
    }

    /// Reads a varint that is expected to fit in 32 bits.
    ///
    /// Up to 10 bytes are accepted, bits past the 32nd are discarded.
    #[inline]
    pub fn read_varint32(&mut self) -> Result<u32, DecodeError> {
        let decoded = u32::decode_leb128(self.visible())?;
        match decoded {
            Some((value, len)) => {
                self.consume(len);
                Ok(value)
            }
            None => self.read_varint32_slow(),
        }
    }

    #[cold]
    fn read_varint32_slow(&mut self) -> Result<u32, DecodeError> {
        let mut value = 0u32;
        for idx in 0..MAX_VARINT_LEN {
            let byte = self.read_byte()?;
            if idx < u32::MAX_LEB_BYTES {
                value |= u32::from(byte & 0x7F) << (7 * idx);
            }
            if byte < 0x80 {
                return Ok(value);
            }
        }
        Err(DecodeError::malformed_varint())
    }

    /// Reads a varint of up to 64 bits.
    #[inline]
    pub fn read_varint64(&mut self) -> Result<u64, DecodeError> {
        let decoded = u64::decode_leb128(self.visible())?;
        match decoded {
            Some((value, len)) => {
                self.consume(len);
                Ok(value)
            }
            None => self.read_varint64_slow(),
        }
    }

    #[cold]
    fn read_varint64_slow(&mut self) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        for idx in 0..MAX_VARINT_LEN {
            let byte = self.read_byte()?;
            value |= u64::from(byte & 0x7F) << (7 * idx);
            if byte < 0x80 {
                return Ok(value);
            }
        }
        Err(DecodeError::malformed_varint())
    }

    /// Reads a little-endian 32-bit value.
    #[inline]
    pub fn read_fixed32(&mut self) -> Result<u32, DecodeError> {
        let mut bytes = [0u8; 4];
        self.read_exact(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads a little-endian 64-bit value.
    #[inline]
    pub fn read_fixed64(&mut self) -> Result<u64, DecodeError> {
        let mut bytes = [0u8; 8];
        self.read_exact(&mut bytes)?;
        Ok(u64::from_le_bytes(bytes))
    }

    #[inline]
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<(), DecodeError> {
        let visible = self.visible();
        if likely(visible.len() >= dst.len()) {
            dst.copy_from_slice(&visible[..dst.len()]);
            self.consume(dst.len());
            return Ok(());
        }

        self.check_available(dst.len())?;
        let mut filled = 0;
        while filled < dst.len() {
            if !self.ensure_byte()? {
                return Err(DecodeError::truncated());
            }
            let visible = self.visible();
            let cnt = visible.len().min(dst.len() - filled);
            dst[filled..filled + cnt].copy_from_slice(&visible[..cnt]);
            self.consume(cnt);
            filled += cnt;
        }
        Ok(())
    }

    /// Reads a length prefix.
    ///
    /// Lengths are 32-bit on the wire, values of 2^31 and above are rejected.
    #[inline]
    pub fn read_length(&mut self) -> Result<usize, DecodeError> {
        let value = self.read_varint32()?;
        if value > 0x7FFF_FFFF {
            return Err(DecodeError::invalid(InvalidReason::NegativeSize {
                value: u64::from(value),
            }));
        }
        Ok(usize::cast_from(value))
    }

    /// Reads exactly `len` raw bytes.
    ///
    /// The destination grows with the bytes actually read, a large `len` on a
    /// stream never causes a large allocation up front.
    pub fn read_raw_bytes(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        if let Some(bytes) = self.peek_contiguous(len) {
            let out = bytes.to_vec();
            self.consume(len);
            return Ok(out);
        }

        self.check_available(len)?;
        let mut out = Vec::new();
        while out.len() < len {
            if !self.ensure_byte()? {
                return Err(DecodeError::truncated());
            }
            let visible = self.visible();
            let cnt = visible.len().min(len - out.len());
            out.extend_from_slice(&visible[..cnt]);
            self.consume(cnt);
        }
        Ok(out)
    }

    /// Discards exactly `len` bytes.
    pub fn skip_raw_bytes(&mut self, len: usize) -> Result<(), DecodeError> {
        self.check_available(len)?;
        let mut remaining = len;
        while remaining > 0 {
            if !self.ensure_byte()? {
                return Err(DecodeError::truncated());
            }
            let cnt = self.visible().len().min(remaining);
            self.consume(cnt);
            remaining -= cnt;
        }
        Ok(())
    }

    /// Reads a length-delimited run of bytes.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_length()?;
        self.read_raw_bytes(len)
    }

    /// Reads a length-delimited string.
    ///
    /// Invalid UTF-8 is not an error, each invalid sequence is replaced with
    /// U+FFFD.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        self.read_bytes().map(string_from_utf8_lossy)
    }

    // ---- tags ----

    /// Reads the next field tag.
    ///
    /// Returns `None` at the current limit or the end of the input. A tag with
    /// field number 0 is an error.
    #[inline]
    pub fn read_tag(&mut self) -> Result<Option<Tag>, DecodeError> {
        if let Some(tag) = self.next_tag.take() {
            self.last_tag = Some(tag);
            return Ok(Some(tag));
        }
        if !self.ensure_byte()? {
            self.last_tag = None;
            return Ok(None);
        }
        let tag = Tag::from_raw(self.read_varint32()?)?;
        self.last_tag = Some(tag);
        Ok(Some(tag))
    }

    /// Returns the next tag without consuming it.
    pub fn peek_tag(&mut self) -> Result<Option<Tag>, DecodeError> {
        if self.next_tag.is_none() {
            if !self.ensure_byte()? {
                return Ok(None);
            }
            self.next_tag = Some(Tag::from_raw(self.read_varint32()?)?);
        }
        Ok(self.next_tag)
    }

    /// Consumes the next tag if it equals `tag`.
    pub fn maybe_consume_tag(&mut self, tag: Tag) -> Result<bool, DecodeError> {
        if self.peek_tag()? == Some(tag) {
            self.next_tag = None;
            self.last_tag = Some(tag);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ---- skipping ----

    /// Skips the value of a field whose `tag` was just read.
    ///
    /// A start-group tag skips the whole group, including nested groups, up to
    /// its matching end-group tag.
    pub fn skip_field(&mut self, tag: Tag) -> Result<(), DecodeError> {
        match tag.wire_type() {
            WireType::Varint => {
                self.read_varint64()?;
            }
            WireType::Fixed64 => self.skip_raw_bytes(8)?,
            WireType::LengthDelimited => {
                let len = self.read_length()?;
                self.skip_raw_bytes(len)?;
            }
            WireType::StartGroup => self.skip_group(tag)?,
            WireType::EndGroup => {
                return Err(DecodeError::invalid(InvalidReason::UnexpectedEndGroup));
            }
            WireType::Fixed32 => self.skip_raw_bytes(4)?,
        }
        Ok(())
    }

    /// Skips the value of the field whose tag was returned last.
    pub fn skip_last_field(&mut self) -> Result<(), DecodeError> {
        match self.last_tag {
            Some(tag) => self.skip_field(tag),
            None => Err(DecodeError::invalid(InvalidReason::InvalidTag)),
        }
    }

    fn skip_group(&mut self, start: Tag) -> Result<(), DecodeError> {
        self.enter_nested()?;
        loop {
            let Some(tag) = self.read_tag()? else {
                return Err(DecodeError::truncated());
            };
            if tag.wire_type() == WireType::EndGroup {
                if tag.field_number() != start.field_number() {
                    return Err(DecodeError::invalid(InvalidReason::MismatchedEndGroup {
                        expected: start.field_number(),
                        actual: tag.field_number(),
                    }));
                }
                break;
            }
            self.skip_field(tag)?;
        }
        self.exit_nested();
        Ok(())
    }
}

impl<'a> ByteReader<&'a [u8]> {
    /// Creates a reader over `buf[offset..offset + length]`.
    pub fn from_slice_range(
        buf: &'a [u8],
        offset: usize,
        length: usize,
    ) -> Result<Self, ArgumentError> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= buf.len())
            .ok_or(ArgumentError::OutOfRange {
                offset,
                length,
                buffer_len: buf.len(),
            })?;
        Ok(ByteReader::new(&buf[offset..end]))
    }
}
