//! Synthetic FAT32 images for tests.
//!
//! Builds a minimal but well-formed volume image in memory: boot sector,
//! mirrored FATs and a data region. Directories and files are placed on
//! consecutive clusters with their chains written into every FAT copy.
//! Intended for unit and integration tests only.

use std::collections::BTreeMap;
use std::io::Cursor;

const END_OF_CHAIN: u32 = 0x0FFF_FFFF;

/// Builds one 32-byte directory record.
pub fn dir_record(name: &[u8; 11], attr: u8, first_cluster: u32, size: u32) -> [u8; 32] {
    let mut record = [0u8; 32];
    record[0..11].copy_from_slice(name);
    record[11] = attr;
    record[20..22].copy_from_slice(&((first_cluster >> 16) as u16).to_le_bytes());
    record[26..28].copy_from_slice(&((first_cluster & 0xFFFF) as u16).to_le_bytes());
    record[28..32].copy_from_slice(&size.to_le_bytes());
    record
}

/// Deterministic non-repeating-per-cluster content of `len` bytes.
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Assembles a FAT32 volume image in memory.
pub struct ImageBuilder {
    bytes_per_sector: u16,
    sectors_per_cluster: u8,
    reserved_sectors: u16,
    fat_count: u8,
    sectors_per_fat: u32,
    data_clusters: u32,
    fat: Vec<u32>,
    clusters: BTreeMap<u32, Vec<u8>>,
}

impl ImageBuilder {
    pub fn new(
        bytes_per_sector: u16,
        sectors_per_cluster: u8,
        reserved_sectors: u16,
        fat_count: u8,
        sectors_per_fat: u32,
        data_clusters: u32,
    ) -> ImageBuilder {
        let fat_entries =
            (sectors_per_fat as usize * bytes_per_sector as usize) / 4;
        let mut fat = vec![0u32; fat_entries];
        // Media and end-of-chain markers occupy the two reserved slots.
        fat[0] = 0x0FFF_FFF8;
        fat[1] = END_OF_CHAIN;

        ImageBuilder {
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            fat_count,
            sectors_per_fat,
            data_clusters,
            fat,
            clusters: BTreeMap::new(),
        }
    }

    fn bytes_per_cluster(&self) -> usize {
        self.bytes_per_sector as usize * self.sectors_per_cluster as usize
    }

    /// Sets one raw FAT entry.
    pub fn fat_entry(mut self, cluster: u32, value: u32) -> ImageBuilder {
        self.fat[cluster as usize] = value;
        self
    }

    /// Links the given clusters into one chain, terminating after the last.
    pub fn chain(mut self, clusters: &[u32]) -> ImageBuilder {
        for pair in clusters.windows(2) {
            self.fat[pair[0] as usize] = pair[1];
        }
        if let Some(last) = clusters.last() {
            self.fat[*last as usize] = END_OF_CHAIN;
        }
        self
    }

    /// Places `content` on consecutive clusters starting at `start` and
    /// chains them.
    pub fn file(mut self, start: u32, content: &[u8]) -> ImageBuilder {
        let bytes_per_cluster = self.bytes_per_cluster();
        let needed = content.len().div_ceil(bytes_per_cluster).max(1) as u32;

        for i in 0..needed {
            let cluster = start + i;
            self.fat[cluster as usize] = if i + 1 == needed {
                END_OF_CHAIN
            } else {
                cluster + 1
            };

            let from = i as usize * bytes_per_cluster;
            let to = content.len().min(from + bytes_per_cluster);
            if from < content.len() {
                self.clusters.insert(cluster, content[from..to].to_vec());
            }
        }

        self
    }

    /// Places the given records as a directory starting at `start`,
    /// spilling over consecutive clusters when they do not fit in one.
    pub fn directory(self, start: u32, records: &[[u8; 32]]) -> ImageBuilder {
        let mut content = Vec::with_capacity(records.len() * 32);
        for record in records {
            content.extend_from_slice(record);
        }
        self.file(start, &content)
    }

    /// Assembles the image.
    pub fn build(self) -> Cursor<Vec<u8>> {
        let bytes_per_sector = self.bytes_per_sector as usize;
        let bytes_per_cluster = self.bytes_per_cluster();
        let fat_bytes = self.sectors_per_fat as usize * bytes_per_sector;
        let fat_offset = self.reserved_sectors as usize * bytes_per_sector;
        let data_offset = fat_offset + self.fat_count as usize * fat_bytes;
        let total_sectors = u32::from(self.reserved_sectors)
            + u32::from(self.fat_count) * self.sectors_per_fat
            + self.data_clusters * u32::from(self.sectors_per_cluster);

        let mut image = vec![0u8; data_offset + self.data_clusters as usize * bytes_per_cluster];

        // Boot sector.
        image[0] = 0xEB;
        image[1] = 0x3C;
        image[2] = 0x90;
        image[3..11].copy_from_slice(b"MSDOS5.0");
        image[11..13].copy_from_slice(&self.bytes_per_sector.to_le_bytes());
        image[13] = self.sectors_per_cluster;
        image[14..16].copy_from_slice(&self.reserved_sectors.to_le_bytes());
        image[16] = self.fat_count;
        image[21] = 0xF8;
        image[32..36].copy_from_slice(&total_sectors.to_le_bytes());
        image[36..40].copy_from_slice(&self.sectors_per_fat.to_le_bytes());
        image[44..48].copy_from_slice(&2u32.to_le_bytes());
        image[510] = 0x55;
        image[511] = 0xAA;

        // Every FAT copy gets the same table.
        for copy in 0..self.fat_count as usize {
            let base = fat_offset + copy * fat_bytes;
            for (i, entry) in self.fat.iter().enumerate() {
                image[base + i * 4..base + i * 4 + 4].copy_from_slice(&entry.to_le_bytes());
            }
        }

        // Data region.
        for (cluster, content) in &self.clusters {
            let from = data_offset + (*cluster as usize - 2) * bytes_per_cluster;
            image[from..from + content.len()].copy_from_slice(content);
        }

        Cursor::new(image)
    }
}
