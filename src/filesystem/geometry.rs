//! Boot sector parsing and volume geometry.
//!
//! The geometry is computed once when an image is opened and stays immutable
//! until it is closed. Every other component derives its byte offsets from
//! it: the FAT region, the data region and the cluster-to-offset mapping.

use binread::{BinRead, BinReaderExt};
use getset::CopyGetters;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use super::error::FsError;

/// Raw little-endian BIOS Parameter Block layout, up to and including the
/// FAT32 root cluster field. Field order mirrors the on-disk boot sector, so
/// the documented offsets (bytes-per-sector at 11, sectors-per-cluster at 13,
/// reserved sectors at 14, FAT count at 16, sectors-per-FAT32 at 36, root
/// cluster at 44) fall out of the layout.
#[derive(BinRead, Debug)]
#[br(little)]
struct BootSector {
    _jmp: [u8; 3],
    _oem_name: [u8; 8],
    bytes_per_sec: u16,
    sec_per_clus: u8,
    rsvd_sec_cnt: u16,
    num_fats: u8,
    root_ent_cnt: u16,
    tot_sec_16: u16,
    _media: u8,
    fat_sz_16: u16,
    _sec_per_trk: u16,
    _num_heads: u16,
    _hidd_sec: u32,
    tot_sec_32: u32,
    fat_sz_32: u32,
    _ext_flags: u16,
    _fs_ver: u16,
    root_clus: u32,
}

/// Derived layout of one FAT32 volume image.
///
/// All offsets are byte positions from the start of the image. Invariant:
/// `bytes_per_cluster = sectors_per_cluster * bytes_per_sector > 0`.
#[derive(Debug, Clone, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct VolumeGeometry {
    /// Bytes per sector (512, 1024, 2048 or 4096).
    bytes_per_sector: u16,
    /// Sectors per allocation unit, a power of two.
    sectors_per_cluster: u8,
    /// Sectors preceding the first FAT.
    reserved_sectors: u16,
    /// Number of FAT copies on the volume.
    fat_count: u8,
    /// Sectors occupied by one FAT.
    sectors_per_fat: u32,
    /// First cluster of the root directory, 2 by convention.
    root_cluster: u32,
    /// Number of clusters in the data region.
    cluster_count: u32,
    /// Byte offset of the first FAT.
    fat_region_offset: u64,
    /// Byte offset of the data region (cluster 2).
    data_region_offset: u64,
    /// Size in bytes of one cluster.
    bytes_per_cluster: u32,
}

const VALID_BYTES_PER_SEC: [u16; 4] = [512, 1024, 2048, 4096];
const VALID_SEC_PER_CLUS: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

impl VolumeGeometry {
    /// Parses the boot sector at the start of `reader` and derives the
    /// region offsets.
    ///
    /// # Errors
    /// - `FsError::MalformedVolume` if the image is too short for the boot
    ///   sector, a field is invalid, or the volume is not FAT32.
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<VolumeGeometry, FsError> {
        reader.seek(SeekFrom::Start(0))?;
        let boot: BootSector = reader
            .read_le()
            .map_err(|err| FsError::MalformedVolume(format!("unreadable boot sector: {err}")))?;

        boot.validate()?;

        let bytes_per_sec = u64::from(boot.bytes_per_sec);
        let fat_region_offset = u64::from(boot.rsvd_sec_cnt) * bytes_per_sec;
        let data_region_offset = fat_region_offset
            + u64::from(boot.num_fats) * u64::from(boot.fat_sz_32) * bytes_per_sec;

        Ok(VolumeGeometry {
            bytes_per_sector: boot.bytes_per_sec,
            sectors_per_cluster: boot.sec_per_clus,
            reserved_sectors: boot.rsvd_sec_cnt,
            fat_count: boot.num_fats,
            sectors_per_fat: boot.fat_sz_32,
            root_cluster: boot.root_clus,
            cluster_count: boot.cluster_count(),
            fat_region_offset,
            data_region_offset,
            bytes_per_cluster: u32::from(boot.bytes_per_sec) * u32::from(boot.sec_per_clus),
        })
    }

    /// Byte offset of cluster `n` within the image. Cluster numbering starts
    /// at 2, the first cluster of the data region.
    pub fn cluster_offset(&self, cluster: u32) -> u64 {
        debug_assert!(cluster >= 2);
        self.data_region_offset
            + u64::from(cluster - 2) * u64::from(self.bytes_per_cluster)
    }
}

impl BootSector {
    /// Number of clusters in the data region. `root_ent_cnt` is zero on
    /// FAT32, so the root directory region contributes no sectors.
    fn cluster_count(&self) -> u32 {
        let root_dir_sectors =
            (u32::from(self.root_ent_cnt) * 32).div_ceil(u32::from(self.bytes_per_sec));
        let overhead = u32::from(self.rsvd_sec_cnt)
            + u32::from(self.num_fats) * self.fat_sz_32
            + root_dir_sectors;

        self.tot_sec_32.saturating_sub(overhead) / u32::from(self.sec_per_clus)
    }

    fn validate(&self) -> Result<(), FsError> {
        if !VALID_BYTES_PER_SEC.contains(&self.bytes_per_sec) {
            return Err(FsError::MalformedVolume(format!(
                "invalid count of bytes per sector: `{}`, legal values: 512, 1024, 2048, 4096",
                self.bytes_per_sec
            )));
        }
        if !VALID_SEC_PER_CLUS.contains(&self.sec_per_clus) {
            return Err(FsError::MalformedVolume(format!(
                "invalid number of sectors per cluster: `{}`, legal values: powers of two up to 128",
                self.sec_per_clus
            )));
        }
        let cluster_size = u32::from(self.bytes_per_sec) * u32::from(self.sec_per_clus);
        if cluster_size > 32 * 1024 {
            return Err(FsError::MalformedVolume(format!(
                "invalid cluster size: `{cluster_size}`, any value greater than 32K is invalid"
            )));
        }
        if self.rsvd_sec_cnt == 0 {
            return Err(FsError::MalformedVolume(
                "the count of reserved sectors should be greater than 0".to_string(),
            ));
        }
        if self.num_fats == 0 {
            return Err(FsError::MalformedVolume(
                "the volume should carry at least one FAT".to_string(),
            ));
        }
        // FAT12/16 layouts store the FAT size and root directory bounds in
        // the 16-bit fields; a FAT32 volume leaves them zero.
        if self.fat_sz_16 != 0 || self.root_ent_cnt != 0 || self.tot_sec_16 != 0 {
            return Err(FsError::MalformedVolume(
                "not a FAT32 volume: 16-bit layout fields are in use".to_string(),
            ));
        }
        if self.fat_sz_32 == 0 {
            return Err(FsError::MalformedVolume(
                "sectors per FAT should be greater than 0".to_string(),
            ));
        }
        if self.tot_sec_32 == 0 {
            return Err(FsError::MalformedVolume(
                "total sector count should be greater than 0".to_string(),
            ));
        }
        if self.root_clus < 2 {
            return Err(FsError::MalformedVolume(format!(
                "invalid root directory cluster: `{}`, the data area starts at cluster 2",
                self.root_clus
            )));
        }

        Ok(())
    }
}

impl fmt::Display for VolumeGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<24}{:>12}{:>14}", "Parameter", "Decimal", "Hex")?;
        writeln!(f, "{}", "-".repeat(50))?;

        macro_rules! row {
            ($name:expr, $val:expr) => {
                writeln!(
                    f,
                    "{:<24}{:>12}{:>14}",
                    $name,
                    $val,
                    format!("0x{:X}", $val)
                )?;
            };
        }

        row!("bytes per sector", self.bytes_per_sector);
        row!("sectors per cluster", self.sectors_per_cluster);
        row!("reserved sectors", self.reserved_sectors);
        row!("FAT count", self.fat_count);
        row!("sectors per FAT", self.sectors_per_fat);
        row!("root cluster", self.root_cluster);
        row!("cluster count", self.cluster_count);
        row!("bytes per cluster", self.bytes_per_cluster);
        row!("FAT region offset", self.fat_region_offset);
        row!("data region offset", self.data_region_offset);

        Ok(())
    }
}
