//! In-memory view of one directory.
//!
//! A view is loaded from the image by walking the directory's whole cluster
//! chain, so directories spanning several clusters are read in full. The
//! view is replaced wholesale on every navigation; delete and undelete
//! mutate only the view and are never written back to the image.

use std::io::{Read, Seek, SeekFrom};

use super::chain::ClusterChain;
use super::dir_entry::{ATTR_HIDDEN, DirEntry};
use super::error::FsError;
use super::geometry::VolumeGeometry;
use super::short_name::ShortName;

const DIR_RECORD_SIZE: usize = 32;

/// One slot of the view. `prior_attr` holds the attribute the entry carried
/// before an in-view delete, so undelete restores it exactly.
#[derive(Debug, Clone)]
struct ViewSlot {
    entry: DirEntry,
    prior_attr: Option<u8>,
}

/// Ordered list of the entries of one directory.
#[derive(Debug, Clone)]
pub struct DirectoryView {
    start_cluster: u32,
    slots: Vec<ViewSlot>,
}

impl DirectoryView {
    /// Loads the directory starting at `start_cluster`, chaining reads
    /// across all of its clusters. Parsing stops at the first all-zero
    /// record, the end-of-directory marker.
    pub fn load<R: Read + Seek>(
        reader: &mut R,
        geometry: &VolumeGeometry,
        start_cluster: u32,
    ) -> Result<DirectoryView, FsError> {
        let clusters = ClusterChain::collect_chain(reader, geometry, start_cluster)?;

        let mut slots = vec![];
        let mut buf = vec![0u8; geometry.bytes_per_cluster() as usize];

        'clusters: for cluster in clusters {
            reader.seek(SeekFrom::Start(geometry.cluster_offset(cluster)))?;
            reader.read_exact(&mut buf)?;

            for record in buf.chunks_exact(DIR_RECORD_SIZE) {
                if record[0] == 0 {
                    break 'clusters;
                }
                slots.push(ViewSlot {
                    entry: DirEntry::from_slice(record)?,
                    prior_attr: None,
                });
            }
        }

        Ok(DirectoryView {
            start_cluster,
            slots,
        })
    }

    /// The cluster this view was loaded from.
    pub fn start_cluster(&self) -> u32 {
        self.start_cluster
    }

    /// Number of entries held by the view.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Finds the first entry matching `name`, compared in the encoded
    /// 11-byte form so the match is case-insensitive. Long-name fragments
    /// are skipped. Entries deleted in this view keep their name and stay
    /// findable, which is what undelete-by-name relies on.
    pub fn find(&self, name: &str) -> Result<Option<usize>, FsError> {
        let target = ShortName::encode(name)?;

        Ok(self
            .slots
            .iter()
            .position(|slot| !slot.entry.is_long_name() && slot.entry.short_name() == target))
    }

    /// The entry at `index`.
    pub fn entry(&self, index: usize) -> Result<&DirEntry, FsError> {
        self.slots
            .get(index)
            .map(|slot| &slot.entry)
            .ok_or_else(|| FsError::EntryNotFound(format!("index {index}")))
    }

    /// Flags the entry at `index` as deleted, remembering its attribute.
    /// Deleting an already-deleted entry is a no-op; the remembered
    /// attribute is kept for the eventual restore.
    pub fn mark_deleted(&mut self, index: usize) -> Result<(), FsError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or_else(|| FsError::EntryNotFound(format!("index {index}")))?;

        if slot.prior_attr.is_none() {
            slot.prior_attr = Some(slot.entry.attr());
            slot.entry.set_attr(ATTR_HIDDEN);
        }

        Ok(())
    }

    /// Restores the entry at `index` to the attribute it carried before
    /// deletion. Restoring a live entry is a no-op.
    pub fn mark_restored(&mut self, index: usize) -> Result<(), FsError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or_else(|| FsError::EntryNotFound(format!("index {index}")))?;

        if let Some(attr) = slot.prior_attr.take() {
            slot.entry.set_attr(attr);
        }

        Ok(())
    }

    /// Display names and attributes of the visible entries, in directory
    /// order. Deleted entries, volume labels, long-name fragments and
    /// on-disk erased records are excluded.
    pub fn list(&self) -> Vec<(String, u8)> {
        self.slots
            .iter()
            .filter(|slot| slot.entry.is_visible())
            .map(|slot| (slot.entry.display_name(), slot.entry.attr()))
            .collect()
    }

    /// The cluster of this directory's parent, resolved through the
    /// directory's own `..` record. A first-cluster of 0 in that record
    /// denotes the root, as does the absence of the record (the root
    /// directory has no dot entries).
    pub fn parent_cluster(&self, geometry: &VolumeGeometry) -> u32 {
        self.slots
            .iter()
            .find(|slot| slot.entry.is_dir() && slot.entry.short_name() == ShortName::DOTDOT)
            .map(|slot| match slot.entry.first_cluster() {
                0 | 1 => geometry.root_cluster(),
                cluster => cluster,
            })
            .unwrap_or_else(|| geometry.root_cluster())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::dir_entry::{
        ATTR_ARCHIVE, ATTR_DIRECTORY, ATTR_LONG_NAME, ATTR_READ_ONLY, ATTR_VOLUME_ID,
    };
    use crate::filesystem::test_support::{ImageBuilder, dir_record};

    fn sample_image() -> std::io::Cursor<Vec<u8>> {
        let mut erased = dir_record(b"OLD     TXT", ATTR_ARCHIVE, 9, 40);
        erased[0] = 0xE5;

        ImageBuilder::new(512, 1, 4, 1, 2, 32)
            .directory(
                2,
                &[
                    dir_record(b"MYVOLUME   ", ATTR_VOLUME_ID, 0, 0),
                    dir_record(b"FOO     TXT", ATTR_ARCHIVE, 5, 1000),
                    dir_record(b"NOTES      ", ATTR_READ_ONLY, 6, 52),
                    dir_record(b"FRAGMENT   ", ATTR_LONG_NAME, 0, 0),
                    dir_record(b"SUB        ", ATTR_DIRECTORY, 7, 0),
                    erased,
                ],
            )
            .build()
    }

    fn load_root(image: &mut std::io::Cursor<Vec<u8>>) -> (VolumeGeometry, DirectoryView) {
        let geometry = VolumeGeometry::parse(image).unwrap();
        let view = DirectoryView::load(image, &geometry, geometry.root_cluster()).unwrap();
        (geometry, view)
    }

    #[test]
    fn loads_all_records_up_to_the_end_marker() {
        let mut image = sample_image();
        let (_, view) = load_root(&mut image);

        assert_eq!(view.len(), 6);
    }

    #[test]
    fn spans_a_directory_over_multiple_clusters() {
        // 16 records fit in one 512-byte cluster; 20 force a second one.
        let records: Vec<[u8; 32]> = (0..20)
            .map(|i| {
                let mut name = *b"FILE00  TXT";
                name[4] = b'0' + i / 10;
                name[5] = b'0' + i % 10;
                dir_record(&name, ATTR_ARCHIVE, 10 + u32::from(i), 1)
            })
            .collect();

        let mut image = ImageBuilder::new(512, 1, 4, 1, 2, 32)
            .directory(2, &records)
            .build();
        let (_, view) = load_root(&mut image);

        assert_eq!(view.len(), 20);
        assert_eq!(view.find("file19.txt").unwrap(), Some(19));
    }

    #[test]
    fn finds_entries_case_insensitively() {
        let mut image = sample_image();
        let (_, view) = load_root(&mut image);

        assert_eq!(view.find("foo.txt").unwrap(), Some(1));
        assert_eq!(view.find("FOO.TXT").unwrap(), Some(1));
        assert_eq!(view.find("sub").unwrap(), Some(4));
        assert_eq!(view.find("missing.txt").unwrap(), None);
    }

    #[test]
    fn find_rejects_oversized_names() {
        let mut image = sample_image();
        let (_, view) = load_root(&mut image);

        assert!(matches!(
            view.find("far-too-long-name.txt"),
            Err(FsError::NameTooLong(_))
        ));
    }

    #[test]
    fn listing_shows_only_visible_entries() {
        let mut image = sample_image();
        let (_, view) = load_root(&mut image);

        let names: Vec<String> = view.list().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["FOO.TXT", "NOTES", "SUB"]);
    }

    #[test]
    fn delete_then_undelete_restores_name_and_attribute() {
        let mut image = sample_image();
        let (_, mut view) = load_root(&mut image);
        let index = view.find("notes").unwrap().unwrap();
        let before = view.entry(index).unwrap().attr();

        view.mark_deleted(index).unwrap();
        assert!(!view.list().iter().any(|(name, _)| name == "NOTES"));

        view.mark_restored(index).unwrap();
        let listed = view.list();
        let restored = listed.iter().find(|(name, _)| name == "NOTES").unwrap();
        assert_eq!(restored.1, before);
    }

    #[test]
    fn double_delete_is_idempotent() {
        let mut image = sample_image();
        let (_, mut view) = load_root(&mut image);
        let index = view.find("foo.txt").unwrap().unwrap();
        let before = view.entry(index).unwrap().attr();

        view.mark_deleted(index).unwrap();
        view.mark_deleted(index).unwrap();
        assert!(!view.list().iter().any(|(name, _)| name == "FOO.TXT"));

        view.mark_restored(index).unwrap();
        assert_eq!(view.entry(index).unwrap().attr(), before);
    }

    #[test]
    fn deleted_entries_remain_findable() {
        let mut image = sample_image();
        let (_, mut view) = load_root(&mut image);
        let index = view.find("foo.txt").unwrap().unwrap();

        view.mark_deleted(index).unwrap();
        assert_eq!(view.find("foo.txt").unwrap(), Some(index));
    }

    #[test]
    fn out_of_range_index_is_entry_not_found() {
        let mut image = sample_image();
        let (_, mut view) = load_root(&mut image);

        assert!(matches!(
            view.mark_deleted(99),
            Err(FsError::EntryNotFound(_))
        ));
        assert!(matches!(
            view.mark_restored(99),
            Err(FsError::EntryNotFound(_))
        ));
    }

    #[test]
    fn parent_cluster_follows_the_dotdot_record() {
        let mut image = ImageBuilder::new(512, 1, 4, 1, 2, 32)
            .directory(
                5,
                &[
                    dir_record(b".          ", ATTR_DIRECTORY, 5, 0),
                    dir_record(b"..         ", ATTR_DIRECTORY, 3, 0),
                ],
            )
            .build();
        let geometry = VolumeGeometry::parse(&mut image).unwrap();
        let view = DirectoryView::load(&mut image, &geometry, 5).unwrap();

        assert_eq!(view.parent_cluster(&geometry), 3);
    }

    #[test]
    fn parent_of_a_first_level_directory_is_the_root() {
        // Directories directly under the root store 0 in their `..` record.
        let mut image = ImageBuilder::new(512, 1, 4, 1, 2, 32)
            .directory(
                5,
                &[
                    dir_record(b".          ", ATTR_DIRECTORY, 5, 0),
                    dir_record(b"..         ", ATTR_DIRECTORY, 0, 0),
                ],
            )
            .build();
        let geometry = VolumeGeometry::parse(&mut image).unwrap();
        let view = DirectoryView::load(&mut image, &geometry, 5).unwrap();

        assert_eq!(view.parent_cluster(&geometry), geometry.root_cluster());
    }
}
