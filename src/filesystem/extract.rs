//! File content extraction.
//!
//! Reads the bytes of a file out of the image, driven by the entry's
//! recorded size and first cluster. The chain cursor always comes from the
//! FAT walk, never from a stale loop variable, so every cluster boundary is
//! crossed through the table.

use std::io::{Read, Seek, SeekFrom, Write};

use super::chain::ClusterChain;
use super::dir_entry::DirEntry;
use super::error::FsError;
use super::geometry::VolumeGeometry;

/// Streams the whole content of `entry` into `sink` and returns the number
/// of bytes written.
///
/// Whole clusters are copied until fewer than `bytes_per_cluster` bytes
/// remain; the final cluster is read partially. The byte count is the
/// entry's recorded size.
///
/// # Errors
/// - `FsError::TruncatedFile` if the chain ends while bytes remain.
/// - `FsError::ChainCycle` / `FsError::IOError` from the underlying walk.
pub fn extract<R: Read + Seek, W: Write>(
    reader: &mut R,
    geometry: &VolumeGeometry,
    entry: &DirEntry,
    sink: &mut W,
) -> Result<u64, FsError> {
    let clusters = ClusterChain::collect_chain(reader, geometry, entry.first_cluster())?;

    let mut remaining = u64::from(entry.file_size());
    let mut buf = vec![0u8; geometry.bytes_per_cluster() as usize];

    for cluster in clusters {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(u64::from(geometry.bytes_per_cluster())) as usize;

        reader.seek(SeekFrom::Start(geometry.cluster_offset(cluster)))?;
        reader.read_exact(&mut buf[..take])?;
        sink.write_all(&buf[..take])?;

        remaining -= take as u64;
    }

    if remaining > 0 {
        return Err(FsError::TruncatedFile { remaining });
    }

    Ok(u64::from(entry.file_size()))
}

/// Reads `length` bytes starting `offset` bytes into the file, crossing
/// cluster boundaries as needed.
///
/// # Errors
/// - `FsError::OutOfRange` if `offset + length` exceeds the entry's size.
/// - `FsError::TruncatedFile` if the chain is shorter than the range needs.
pub fn read_range<R: Read + Seek>(
    reader: &mut R,
    geometry: &VolumeGeometry,
    entry: &DirEntry,
    offset: u64,
    length: u64,
) -> Result<Vec<u8>, FsError> {
    if offset + length > u64::from(entry.file_size()) {
        return Err(FsError::OutOfRange {
            offset,
            length,
            size: entry.file_size(),
        });
    }
    if length == 0 {
        return Ok(vec![]);
    }

    let clusters = ClusterChain::collect_chain(reader, geometry, entry.first_cluster())?;
    let bytes_per_cluster = u64::from(geometry.bytes_per_cluster());

    let mut out = Vec::with_capacity(length as usize);
    // Position of the range start within its cluster; zero from the second
    // cluster on.
    let mut pos = offset % bytes_per_cluster;
    let mut remaining = length;

    for cluster in clusters
        .into_iter()
        .skip((offset / bytes_per_cluster) as usize)
    {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(bytes_per_cluster - pos) as usize;
        let mut chunk = vec![0u8; take];

        reader.seek(SeekFrom::Start(geometry.cluster_offset(cluster) + pos))?;
        reader.read_exact(&mut chunk)?;
        out.extend_from_slice(&chunk);

        remaining -= take as u64;
        pos = 0;
    }

    if remaining > 0 {
        return Err(FsError::TruncatedFile { remaining });
    }

    Ok(out)
}
