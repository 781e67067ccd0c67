//!
//! fat-explorer: a library and CLI for navigating FAT32 volume images.
//!
//! This crate provides tools for:
//! - Parsing and validating the boot parameter block of a FAT32 image
//! - Resolving short (8.3) filenames against directory entries
//! - Following cluster chains through the File Allocation Table
//! - Streaming file content and byte ranges out of the image
//! - Driving all of the above through one interactive navigation session
//!
//! The volume is treated as read-mostly: delete and undelete mutate only the
//! in-memory directory view and are never written back to the image.
//!
//! # Re-exports
//! - [`Session`]: the navigation session owning the open image
//! - [`FsError`]: the typed error surface
//! - [`VolumeGeometry`]: derived byte layout of one volume

pub mod commands;
pub mod filesystem;
pub mod session;

/// Typed error surface (see [`filesystem::error::FsError`]).
pub use crate::filesystem::error::FsError;
/// Derived volume layout (see [`filesystem::geometry::VolumeGeometry`]).
pub use crate::filesystem::geometry::VolumeGeometry;
/// Navigation session (see [`session::Session`]).
pub use crate::session::Session;
