use thiserror::Error;

use crate::cache::{CachedTag, ResourceHandle, StringId, TagGroup};

#[derive(Debug, Error)]
pub enum RdbErr {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad header")]
    BadHeader,
    #[error("file too small")]
    TooSmall,
    #[error("entry '{0}' not found")]
    MissingEntry(String),
    #[error("entry '{name}' has type tag {found:#010X}, expected {expected:#010X}")]
    TypeMismatch {
        name: String,
        expected: u32,
        found: u32,
    },
    #[error("entry name '{0}' does not fit the entry table")]
    NameTooLong(String),
    #[error("codec failure: {0}")]
    Codec(#[from] bincode::Error),
}

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error(transparent)]
    RDBFileError(#[from] RdbErr),
    #[error("json failure: {0}")]
    JSONError(#[from] serde_json::Error),
    #[error("i/o failure: {0}")]
    IOFailure(#[from] std::io::Error),
    #[error("tag handle {0:?} is not part of this cache")]
    InvalidTag(CachedTag),
    #[error("tag '{name}' is a '{found}' tag, expected '{expected}'")]
    GroupMismatch {
        name: String,
        expected: TagGroup,
        found: TagGroup,
    },
    #[error("resource {0:?} is not part of this cache")]
    MissingResource(ResourceHandle),
    #[error("string id {0} is not part of this cache")]
    UnknownStringId(StringId),
    #[error("tag '{0}' was allocated but never defined")]
    UndefinedTag(String),
    #[error("tag reference '{0}' is not set")]
    NullReference(&'static str),
    #[error("{table} index {index} out of range (len {len})")]
    IndexOutOfRange {
        table: &'static str,
        index: i64,
        len: usize,
    },
    #[error("{table} grew past the largest block index ({len} entries)")]
    IndexOverflow { table: &'static str, len: usize },
    #[error("invalid layout: {0}")]
    Layout(String),
}

/// Looks up `index` in a tag block, surfacing a bad index as `IndexOutOfRange`.
pub fn block_element<'a, T>(
    block: &'a [T],
    index: impl Into<i64>,
    table: &'static str,
) -> Result<&'a T, ForgeError> {
    let index = index.into();
    usize::try_from(index)
        .ok()
        .and_then(|i| block.get(i))
        .ok_or(ForgeError::IndexOutOfRange {
            table,
            index,
            len: block.len(),
        })
}

/// Narrows a local table position to the 16-bit index tag blocks store.
pub fn block_index(position: usize, table: &'static str) -> Result<i16, ForgeError> {
    i16::try_from(position).map_err(|_| ForgeError::IndexOverflow {
        table,
        len: position + 1,
    })
}
