//! Navigation session over one FAT32 image.
//!
//! All mutable state (the open image handle, its geometry and the active
//! directory view) lives in one [`Session`] value passed to every
//! operation; there are no process-wide singletons. A session owns at most
//! one open image, and opening a second one while the first is active is
//! rejected.
//!
//! Delete and undelete mutate only the in-memory view. Nothing is ever
//! written back to the image: the changes vanish when the view is reloaded
//! (`cd`) or the image is closed.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::filesystem::directory::DirectoryView;
use crate::filesystem::error::FsError;
use crate::filesystem::extract;
use crate::filesystem::geometry::VolumeGeometry;
use crate::filesystem::navigate;

/// Field projection of one directory entry, as reported by `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    /// Attribute bit set.
    pub attribute: u8,
    /// File size in bytes, 0 for directories.
    pub size: u32,
    /// First cluster of the entry's data.
    pub first_cluster: u32,
}

struct OpenVolume {
    file: File,
    geometry: VolumeGeometry,
    view: DirectoryView,
}

/// One interactive session: at most one open volume image and its active
/// directory view.
#[derive(Default)]
pub struct Session {
    volume: Option<OpenVolume>,
}

impl Session {
    pub fn new() -> Session {
        Session { volume: None }
    }

    /// Whether a volume image is currently open.
    pub fn is_open(&self) -> bool {
        self.volume.is_some()
    }

    /// Opens a volume image, parses its geometry and loads the root
    /// directory view.
    ///
    /// # Errors
    /// - `FsError::AlreadyOpen` if an image is already active.
    /// - `FsError::MalformedVolume` if the boot sector is invalid.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), FsError> {
        if self.volume.is_some() {
            return Err(FsError::AlreadyOpen);
        }

        let mut file = File::open(path)?;
        let geometry = VolumeGeometry::parse(&mut file)?;
        let view = DirectoryView::load(&mut file, &geometry, geometry.root_cluster())?;

        self.volume = Some(OpenVolume {
            file,
            geometry,
            view,
        });

        Ok(())
    }

    /// Releases the image handle and drops the active view.
    pub fn close(&mut self) -> Result<(), FsError> {
        match self.volume.take() {
            Some(_) => Ok(()),
            None => Err(FsError::VolumeNotOpen),
        }
    }

    /// The geometry of the open volume.
    pub fn geometry(&self) -> Result<&VolumeGeometry, FsError> {
        self.volume
            .as_ref()
            .map(|vol| &vol.geometry)
            .ok_or(FsError::VolumeNotOpen)
    }

    /// Display names and attributes of the visible entries of the current
    /// directory.
    pub fn list(&self) -> Result<Vec<(String, u8)>, FsError> {
        self.volume
            .as_ref()
            .map(|vol| vol.view.list())
            .ok_or(FsError::VolumeNotOpen)
    }

    /// Attribute, size and first cluster of the named entry.
    pub fn stat(&self, name: &str) -> Result<EntryStat, FsError> {
        let vol = self.volume.as_ref().ok_or(FsError::VolumeNotOpen)?;
        let index = vol
            .view
            .find(name)?
            .ok_or_else(|| FsError::EntryNotFound(name.to_string()))?;
        let entry = vol.view.entry(index)?;

        Ok(EntryStat {
            attribute: entry.attr(),
            size: entry.file_size(),
            first_cluster: entry.first_cluster(),
        })
    }

    /// Replaces the active view with the named subdirectory's. `.` keeps
    /// the current view, including any in-memory deletions.
    pub fn change_directory(&mut self, name: &str) -> Result<(), FsError> {
        let result = match self.volume.as_mut() {
            Some(vol) => vol.change_directory(name),
            None => return Err(FsError::VolumeNotOpen),
        };
        result.map_err(|err| self.drop_volume_on_io(err))
    }

    /// Streams the named file's content into `sink` and returns the byte
    /// count, a byte-identical copy of the file.
    pub fn retrieve<W: Write>(&mut self, name: &str, sink: &mut W) -> Result<u64, FsError> {
        let result = match self.volume.as_mut() {
            Some(vol) => vol.retrieve(name, sink),
            None => return Err(FsError::VolumeNotOpen),
        };
        result.map_err(|err| self.drop_volume_on_io(err))
    }

    /// Reads `length` bytes of the named file starting at `offset`.
    pub fn read_range(&mut self, name: &str, offset: u64, length: u64) -> Result<Vec<u8>, FsError> {
        let result = match self.volume.as_mut() {
            Some(vol) => vol.read_range(name, offset, length),
            None => return Err(FsError::VolumeNotOpen),
        };
        result.map_err(|err| self.drop_volume_on_io(err))
    }

    /// Flags the named entry as deleted in the active view only.
    pub fn delete(&mut self, name: &str) -> Result<(), FsError> {
        let vol = self.volume.as_mut().ok_or(FsError::VolumeNotOpen)?;
        let index = vol
            .view
            .find(name)?
            .ok_or_else(|| FsError::EntryNotFound(name.to_string()))?;
        vol.view.mark_deleted(index)
    }

    /// Restores the named entry to its pre-deletion attribute.
    pub fn undelete(&mut self, name: &str) -> Result<(), FsError> {
        let vol = self.volume.as_mut().ok_or(FsError::VolumeNotOpen)?;
        let index = vol
            .view
            .find(name)?
            .ok_or_else(|| FsError::EntryNotFound(name.to_string()))?;
        vol.view.mark_restored(index)
    }

    /// An I/O failure on the primary image handle is the one error that is
    /// fatal to the session: it forces the not-open state.
    fn drop_volume_on_io(&mut self, err: FsError) -> FsError {
        if matches!(err, FsError::IOError(_)) {
            self.volume = None;
        }
        err
    }
}

impl OpenVolume {
    fn change_directory(&mut self, name: &str) -> Result<(), FsError> {
        if let Some(view) =
            navigate::change_directory(&mut self.file, &self.geometry, &self.view, name)?
        {
            self.view = view;
        }
        Ok(())
    }

    fn retrieve<W: Write>(&mut self, name: &str, sink: &mut W) -> Result<u64, FsError> {
        let index = self
            .view
            .find(name)?
            .ok_or_else(|| FsError::EntryNotFound(name.to_string()))?;
        let entry = self.view.entry(index)?;

        extract::extract(&mut self.file, &self.geometry, entry, sink)
    }

    fn read_range(&mut self, name: &str, offset: u64, length: u64) -> Result<Vec<u8>, FsError> {
        let index = self
            .view
            .find(name)?
            .ok_or_else(|| FsError::EntryNotFound(name.to_string()))?;
        let entry = self.view.entry(index)?;

        extract::read_range(&mut self.file, &self.geometry, entry, offset, length)
    }
}
