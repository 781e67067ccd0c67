//! FAT chain traversal.
//!
//! A file or directory occupies a chain of clusters. The chain starts at the
//! entry's first cluster; each following cluster is read from the FAT entry
//! of the current one. The walker below is lazy, restartable (walking the
//! same start twice over an unmodified FAT yields the same sequence) and
//! refuses to loop forever over a corrupt table.

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};

use super::error::FsError;
use super::geometry::VolumeGeometry;

/// FAT32 table entries carry 28 significant bits.
pub const FAT_ENTRY_MASK: u32 = 0x0FFF_FFFF;
/// Masked values at or above this mark the end of a chain.
pub const END_OF_CHAIN: u32 = 0x0FFF_FFF8;

/// Iterator over the clusters of one FAT chain.
///
/// Yields the current cluster before advancing, so a chain whose FAT entry
/// is free or end-of-chain still yields its first cluster. Start values
/// below 2 produce an empty chain.
pub struct ClusterChain<'a, R> {
    reader: &'a mut R,
    geometry: &'a VolumeGeometry,
    current: Option<u32>,
    visited: HashSet<u32>,
}

impl<'a, R: Read + Seek> ClusterChain<'a, R> {
    /// Starts a walk at `start`.
    pub fn walk(reader: &'a mut R, geometry: &'a VolumeGeometry, start: u32) -> Self {
        ClusterChain {
            reader,
            geometry,
            current: (start >= 2).then_some(start & FAT_ENTRY_MASK),
            visited: HashSet::new(),
        }
    }

    /// Collects the whole chain up front. Convenience for callers that need
    /// to interleave chain positions with reads on the same handle.
    pub fn collect_chain(
        reader: &'a mut R,
        geometry: &'a VolumeGeometry,
        start: u32,
    ) -> Result<Vec<u32>, FsError> {
        Self::walk(reader, geometry, start).collect()
    }

    /// Reads the FAT entry for `cluster`, masked to 28 bits.
    fn next_in_fat(&mut self, cluster: u32) -> Result<u32, FsError> {
        let offset = self.geometry.fat_region_offset() + 4 * u64::from(cluster);
        let mut raw = [0u8; 4];

        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.read_exact(&mut raw)?;

        Ok(u32::from_le_bytes(raw) & FAT_ENTRY_MASK)
    }
}

impl<R: Read + Seek> Iterator for ClusterChain<'_, R> {
    type Item = Result<u32, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        let cluster = self.current.take()?;

        if !self.visited.insert(cluster) {
            return Some(Err(FsError::ChainCycle(cluster)));
        }
        if self.visited.len() > self.geometry.cluster_count() as usize {
            // Longer than the volume holds clusters: the table is corrupt
            // even if no value repeated yet.
            return Some(Err(FsError::ChainCycle(cluster)));
        }

        match self.next_in_fat(cluster) {
            // Values below 2 are free or reserved; either ends the chain,
            // as does the end-of-chain range.
            Ok(next) if (2..END_OF_CHAIN).contains(&next) => {
                self.current = Some(next);
                Some(Ok(cluster))
            }
            Ok(_) => Some(Ok(cluster)),
            Err(err) => Some(Err(err)),
        }
    }
}
