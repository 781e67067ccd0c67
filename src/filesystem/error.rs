//! Error types for FAT32 volume interpretation.
//!
//! Every parsing and traversal failure in this crate is reported through
//! [`FsError`]. The library never prints; rendering user-facing messages is
//! the command layer's job.

use std::io;
use thiserror::Error;

/// Errors produced while opening, navigating and reading a FAT32 volume.
#[derive(Error, Debug)]
pub enum FsError {
    /// The operation requires an open volume image.
    #[error("No volume image is open")]
    VolumeNotOpen,

    /// `open` was attempted while another image is active. One session owns
    /// at most one open image.
    #[error("A volume image is already open")]
    AlreadyOpen,

    /// The boot sector could not be read or one of its fields is invalid.
    #[error("Malformed volume: {0}")]
    MalformedVolume(String),

    /// A short filename is composed of at most 8 characters for the base and
    /// 3 for the extension.
    #[error("Name `{0}` does not fit the 8.3 short name format")]
    NameTooLong(String),

    /// The name (or index) does not match any entry in the current directory.
    #[error("Entry not found: `{0}`")]
    EntryNotFound(String),

    /// The change-directory target exists but is not a subdirectory.
    #[error("`{0}` is not a directory")]
    NotADirectory(String),

    /// The FAT chain revisited a cluster, or grew past the volume's cluster
    /// count. Either way the table is corrupt.
    #[error("FAT chain cycles back through cluster {0}")]
    ChainCycle(u32),

    /// The cluster chain ended while file bytes were still expected.
    #[error("Cluster chain ended with {remaining} bytes left to read")]
    TruncatedFile { remaining: u64 },

    /// A byte-range request reaches past the end of the file.
    #[error("Range {offset}+{length} exceeds the file size of {size} bytes")]
    OutOfRange { offset: u64, length: u64, size: u32 },

    /// Underlying I/O failure. When this surfaces from the primary image
    /// handle the session falls back to the not-open state.
    #[error("IO Error: `{0}`")]
    IOError(#[from] io::Error),

    /// Structure parsing failed.
    #[error("BinRead Error: `{0}`")]
    BinReadError(#[from] binread::Error),
}
