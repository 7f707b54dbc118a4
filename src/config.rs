//! Tunable limits for readers and writers.

use crate::error::ArgumentError;

/// Default maximum nesting depth of messages and groups.
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;
/// Default maximum number of bytes a single parse may consume.
pub const DEFAULT_SIZE_LIMIT: u64 = 0x7FFF_FFFF;
/// Default capacity of the buffer used by [`crate::reader::StreamInput`].
pub const DEFAULT_STREAM_BUFFER_SIZE: usize = 4096;

/// Limits applied by a [`crate::reader::ByteReader`].
///
/// ```
/// use protowire::config::ReaderConfig;
///
/// let config = ReaderConfig::default().with_recursion_limit(16).with_size_limit(1 << 20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Maximum depth of nested messages, groups and map entries.
    pub recursion_limit: u32,
    /// Maximum number of bytes read from the input, across all nesting levels.
    pub size_limit: u64,
    /// Whether [`crate::reader::ByteReader::close`] hands the input back.
    pub leave_open: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            size_limit: DEFAULT_SIZE_LIMIT,
            leave_open: false,
        }
    }
}

impl ReaderConfig {
    pub fn with_recursion_limit(mut self, recursion_limit: u32) -> Self {
        self.recursion_limit = recursion_limit;
        self
    }

    pub fn with_size_limit(mut self, size_limit: u64) -> Self {
        self.size_limit = size_limit;
        self
    }

    pub fn with_leave_open(mut self, leave_open: bool) -> Self {
        self.leave_open = leave_open;
        self
    }

    /// Checks that both limits are positive.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if self.recursion_limit == 0 {
            return Err(ArgumentError::NotPositive {
                name: "recursion_limit",
            });
        }
        if self.size_limit == 0 {
            return Err(ArgumentError::NotPositive { name: "size_limit" });
        }
        Ok(())
    }
}

/// Options applied by a [`crate::writer::ByteWriter`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Emit map entries ordered by key so equal messages produce equal bytes.
    pub deterministic: bool,
}

impl WriterConfig {
    pub fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }
}
