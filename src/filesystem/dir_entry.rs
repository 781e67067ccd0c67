//! On-disk directory entry records.
//!
//! Each record is exactly 32 bytes: an 11-byte short name, an attribute
//! byte, a timestamp region this crate does not interpret, the first-cluster
//! number split into high and low 16-bit halves, and the file size.

use binread::{BinRead, BinReaderExt};
use getset::CopyGetters;
use std::io;

use super::error::FsError;
use super::short_name::ShortName;

/// Read-only file.
pub const ATTR_READ_ONLY: u8 = 0x01;
/// Hidden entry. Doubles as the in-memory deleted marker: deletion never
/// reaches the image, so the flag only has to hide the entry from listings.
pub const ATTR_HIDDEN: u8 = 0x02;
/// Operating system file.
pub const ATTR_SYSTEM: u8 = 0x04;
/// Volume label pseudo-entry in the root directory.
pub const ATTR_VOLUME_ID: u8 = 0x08;
/// Subdirectory.
pub const ATTR_DIRECTORY: u8 = 0x10;
/// File modified since last backup.
pub const ATTR_ARCHIVE: u8 = 0x20;
/// Marker combination used by long-filename fragment entries.
pub const ATTR_LONG_NAME: u8 = ATTR_READ_ONLY | ATTR_HIDDEN | ATTR_SYSTEM | ATTR_VOLUME_ID;

const ATTR_LONG_NAME_MASK: u8 = 0x3F;

/// First name byte of an entry erased on disk.
const FREE_ENTRY_MARKER: u8 = 0xE5;

/// One 32-byte directory record.
#[derive(BinRead, Debug, Clone, CopyGetters)]
#[br(little)]
pub struct DirEntry {
    name: [u8; 11],
    /// File attribute bit set.
    #[getset(get_copy = "pub")]
    attr: u8,
    _nt_res: u8,
    _crt_time_tenth: u8,
    _crt_time: u16,
    _crt_date: u16,
    _lst_acc_date: u16,
    fst_clus_hi: u16,
    _wrt_time: u16,
    _wrt_date: u16,
    fst_clus_lo: u16,
    /// File size in bytes, 0 for directories.
    #[getset(get_copy = "pub")]
    file_size: u32,
}

impl DirEntry {
    /// Parses one record from a 32-byte slice.
    pub fn from_slice(buf: &[u8]) -> Result<DirEntry, FsError> {
        let mut reader = io::Cursor::new(buf);
        reader.read_le().map_err(FsError::from)
    }

    /// The entry's fixed 11-byte short name.
    pub fn short_name(&self) -> ShortName {
        ShortName::from_bytes(self.name)
    }

    /// The human-readable form of the short name.
    pub fn display_name(&self) -> String {
        self.short_name().decode()
    }

    /// The first cluster of the entry's data, reassembled from the high and
    /// low halves.
    pub fn first_cluster(&self) -> u32 {
        (u32::from(self.fst_clus_hi) << 16) | u32::from(self.fst_clus_lo)
    }

    /// Whether the directory attribute bit is set.
    pub fn is_dir(&self) -> bool {
        self.attr & ATTR_DIRECTORY != 0
    }

    /// Whether this record is a fragment of a long filename, carried in a
    /// reserved attribute combination.
    pub fn is_long_name(&self) -> bool {
        self.attr & ATTR_LONG_NAME_MASK == ATTR_LONG_NAME
    }

    /// Whether this record is the root directory's volume label.
    pub fn is_volume_label(&self) -> bool {
        !self.is_long_name() && self.attr & ATTR_VOLUME_ID != 0
    }

    /// Whether the record was erased on disk (first name byte 0xE5).
    pub fn is_erased(&self) -> bool {
        self.name[0] == FREE_ENTRY_MARKER
    }

    /// Whether the entry shows up in a directory listing: a live file,
    /// read-only file or subdirectory, not a label, a long-name fragment,
    /// or anything carrying the deleted marker.
    pub fn is_visible(&self) -> bool {
        if self.is_erased() || self.is_long_name() || self.is_volume_label() {
            return false;
        }
        self.attr & (ATTR_READ_ONLY | ATTR_DIRECTORY | ATTR_ARCHIVE) != 0
            && self.attr & ATTR_HIDDEN == 0
    }

    pub(super) fn set_attr(&mut self, attr: u8) {
        self.attr = attr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::test_support::dir_record;

    #[test]
    fn parses_a_32_byte_record() {
        let raw = dir_record(b"FOO     TXT", ATTR_ARCHIVE, 0x0004_0007, 1234);
        let entry = DirEntry::from_slice(&raw).unwrap();

        assert_eq!(entry.display_name(), "FOO.TXT");
        assert_eq!(entry.attr(), ATTR_ARCHIVE);
        assert_eq!(entry.file_size(), 1234);
    }

    #[test]
    fn reassembles_first_cluster_from_halves() {
        let raw = dir_record(b"BIG     BIN", ATTR_ARCHIVE, 0x0004_0007, 0);
        let entry = DirEntry::from_slice(&raw).unwrap();

        assert_eq!(entry.first_cluster(), 0x0004_0007);
    }

    #[test]
    fn classifies_attributes() {
        let dir = DirEntry::from_slice(&dir_record(b"SUB        ", ATTR_DIRECTORY, 3, 0)).unwrap();
        let label =
            DirEntry::from_slice(&dir_record(b"MYVOLUME   ", ATTR_VOLUME_ID, 0, 0)).unwrap();
        let fragment =
            DirEntry::from_slice(&dir_record(b"AFRAGMENT  ", ATTR_LONG_NAME, 0, 0)).unwrap();

        assert!(dir.is_dir() && dir.is_visible());
        assert!(label.is_volume_label() && !label.is_visible());
        assert!(fragment.is_long_name() && !fragment.is_visible());
    }

    #[test]
    fn erased_records_are_not_visible() {
        let mut raw = dir_record(b"GONE    TXT", ATTR_ARCHIVE, 9, 10);
        raw[0] = 0xE5;
        let entry = DirEntry::from_slice(&raw).unwrap();

        assert!(entry.is_erased());
        assert!(!entry.is_visible());
    }
}
