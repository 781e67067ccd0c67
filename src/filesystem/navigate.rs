//! Directory navigation.
//!
//! Resolves a name in the active view to a subdirectory and loads the
//! replacement view. The caller swaps its active view for the returned one;
//! `.` returns nothing so an unmodified view (including any in-memory
//! deletions) stays in place.

use std::io::{Read, Seek};

use super::directory::DirectoryView;
use super::error::FsError;
use super::geometry::VolumeGeometry;

/// Resolves `name` within `view` and loads the target directory.
///
/// - `.` is a no-op and returns `None`.
/// - `..` loads the parent, resolved through the view's own `..` record
///   (the root when there is none).
/// - Any other name must match a subdirectory entry.
///
/// # Errors
/// - `FsError::EntryNotFound` if the name matches nothing.
/// - `FsError::NotADirectory` if the match is not a subdirectory.
pub fn change_directory<R: Read + Seek>(
    reader: &mut R,
    geometry: &VolumeGeometry,
    view: &DirectoryView,
    name: &str,
) -> Result<Option<DirectoryView>, FsError> {
    match name {
        "." => Ok(None),
        ".." => {
            let parent = view.parent_cluster(geometry);
            DirectoryView::load(reader, geometry, parent).map(Some)
        }
        _ => {
            let index = view
                .find(name)?
                .ok_or_else(|| FsError::EntryNotFound(name.to_string()))?;
            let entry = view.entry(index)?;

            if !entry.is_dir() {
                return Err(FsError::NotADirectory(name.to_string()));
            }

            // Defensive mapping for stray records: a directory entry whose
            // first cluster is unset points back at the root.
            let target = match entry.first_cluster() {
                0 | 1 => geometry.root_cluster(),
                cluster => cluster,
            };

            DirectoryView::load(reader, geometry, target).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::dir_entry::{ATTR_ARCHIVE, ATTR_DIRECTORY};
    use crate::filesystem::test_support::{ImageBuilder, dir_record};
    use std::io::Cursor;

    /// Root (cluster 2) holds `docs` (cluster 5) which holds `deep`
    /// (cluster 6) and a file.
    fn nested_image() -> Cursor<Vec<u8>> {
        ImageBuilder::new(512, 1, 4, 1, 2, 32)
            .directory(
                2,
                &[
                    dir_record(b"DOCS       ", ATTR_DIRECTORY, 5, 0),
                    dir_record(b"ROOT    TXT", ATTR_ARCHIVE, 9, 3),
                ],
            )
            .directory(
                5,
                &[
                    dir_record(b".          ", ATTR_DIRECTORY, 5, 0),
                    dir_record(b"..         ", ATTR_DIRECTORY, 0, 0),
                    dir_record(b"DEEP       ", ATTR_DIRECTORY, 6, 0),
                    dir_record(b"GUIDE   TXT", ATTR_ARCHIVE, 10, 4),
                ],
            )
            .directory(
                6,
                &[
                    dir_record(b".          ", ATTR_DIRECTORY, 6, 0),
                    dir_record(b"..         ", ATTR_DIRECTORY, 5, 0),
                ],
            )
            .build()
    }

    fn setup(image: &mut Cursor<Vec<u8>>) -> (VolumeGeometry, DirectoryView) {
        let geometry = VolumeGeometry::parse(image).unwrap();
        let view = DirectoryView::load(image, &geometry, geometry.root_cluster()).unwrap();
        (geometry, view)
    }

    #[test]
    fn descends_into_a_subdirectory() {
        let mut image = nested_image();
        let (geometry, root) = setup(&mut image);

        let docs = change_directory(&mut image, &geometry, &root, "docs")
            .unwrap()
            .unwrap();

        assert_eq!(docs.start_cluster(), 5);
        assert!(docs.find("guide.txt").unwrap().is_some());
    }

    #[test]
    fn dot_leaves_the_view_untouched() {
        let mut image = nested_image();
        let (geometry, root) = setup(&mut image);

        assert!(change_directory(&mut image, &geometry, &root, ".")
            .unwrap()
            .is_none());
    }

    #[test]
    fn dotdot_from_a_first_level_directory_reaches_the_root() {
        let mut image = nested_image();
        let (geometry, root) = setup(&mut image);

        let docs = change_directory(&mut image, &geometry, &root, "docs")
            .unwrap()
            .unwrap();
        let back = change_directory(&mut image, &geometry, &docs, "..")
            .unwrap()
            .unwrap();

        assert_eq!(back.start_cluster(), geometry.root_cluster());
        assert_eq!(back.list(), root.list());
    }

    #[test]
    fn dotdot_tracks_multiple_levels() {
        let mut image = nested_image();
        let (geometry, root) = setup(&mut image);

        let docs = change_directory(&mut image, &geometry, &root, "docs")
            .unwrap()
            .unwrap();
        let deep = change_directory(&mut image, &geometry, &docs, "deep")
            .unwrap()
            .unwrap();
        let back = change_directory(&mut image, &geometry, &deep, "..")
            .unwrap()
            .unwrap();

        assert_eq!(back.start_cluster(), 5);
        assert_eq!(back.list(), docs.list());
    }

    #[test]
    fn dotdot_at_the_root_stays_at_the_root() {
        let mut image = nested_image();
        let (geometry, root) = setup(&mut image);

        let still_root = change_directory(&mut image, &geometry, &root, "..")
            .unwrap()
            .unwrap();

        assert_eq!(still_root.start_cluster(), geometry.root_cluster());
    }

    #[test]
    fn refuses_to_enter_a_file() {
        let mut image = nested_image();
        let (geometry, root) = setup(&mut image);

        assert!(matches!(
            change_directory(&mut image, &geometry, &root, "root.txt"),
            Err(FsError::NotADirectory(_))
        ));
    }

    #[test]
    fn unknown_name_is_entry_not_found() {
        let mut image = nested_image();
        let (geometry, root) = setup(&mut image);

        assert!(matches!(
            change_directory(&mut image, &geometry, &root, "nowhere"),
            Err(FsError::EntryNotFound(_))
        ));
    }
}
