//! 8.3 short name encoding and decoding.
//!
//! On disk a name is a fixed 11-byte field: 8 characters for the base and 3
//! for the extension, upper-case, space-padded, no separator. `foo.txt`
//! becomes `FOO     TXT`.

use std::fmt;

use super::error::FsError;

/// A fixed 11-byte on-disk short name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortName([u8; 11]);

impl ShortName {
    /// The literal on-disk form of the current-directory entry.
    pub const DOT: ShortName = ShortName(*b".          ");
    /// The literal on-disk form of the parent-directory entry.
    pub const DOTDOT: ShortName = ShortName(*b"..         ");

    /// Wraps the raw name field of a directory entry.
    pub fn from_bytes(raw: [u8; 11]) -> ShortName {
        ShortName(raw)
    }

    /// Encodes a human-typed name into its on-disk form.
    ///
    /// The name is split on the last `.`; base and extension are upper-cased
    /// and space-padded to 8 and 3 bytes. A name without a `.` gets an
    /// all-space extension field. `.` and `..` pass through as their literal
    /// on-disk forms rather than being split.
    ///
    /// # Errors
    /// - `FsError::NameTooLong` if the base exceeds 8 characters or the
    ///   extension exceeds 3.
    pub fn encode(display: &str) -> Result<ShortName, FsError> {
        if display == "." {
            return Ok(Self::DOT);
        }
        if display == ".." {
            return Ok(Self::DOTDOT);
        }

        let (base, ext) = match display.rsplit_once('.') {
            Some((base, ext)) => (base, ext),
            None => (display, ""),
        };

        if base.len() > 8 || ext.len() > 3 {
            return Err(FsError::NameTooLong(display.to_string()));
        }

        let padded = format!(
            "{:<8}{:<3}",
            base.to_ascii_uppercase(),
            ext.to_ascii_uppercase()
        );
        let mut raw = [0u8; 11];
        raw.copy_from_slice(padded.as_bytes());

        Ok(ShortName(raw))
    }

    /// Decodes the on-disk form back into a display name, trimming the space
    /// padding and re-inserting the separator only when an extension exists.
    pub fn decode(&self) -> String {
        let base = String::from_utf8_lossy(&self.0[0..8]);
        let ext = String::from_utf8_lossy(&self.0[8..11]);
        let base = base.trim_end();
        let ext = ext.trim_end();

        if ext.is_empty() {
            base.to_string()
        } else {
            format!("{base}.{ext}")
        }
    }

    /// The raw 11-byte on-disk form.
    pub fn as_bytes(&self) -> &[u8; 11] {
        &self.0
    }
}

impl fmt::Display for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.decode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_name_with_extension() {
        let name = ShortName::encode("foo.txt").unwrap();
        assert_eq!(name.as_bytes(), b"FOO     TXT");
    }

    #[test]
    fn encodes_name_without_extension() {
        let name = ShortName::encode("folder").unwrap();
        assert_eq!(name.as_bytes(), b"FOLDER     ");
    }

    #[test]
    fn splits_on_the_last_dot() {
        let name = ShortName::encode("ar.tar").unwrap();
        assert_eq!(name.as_bytes(), b"AR      TAR");

        // The base absorbs everything before the last separator.
        assert!(matches!(
            ShortName::encode("archive.tar.gz"),
            Err(FsError::NameTooLong(_))
        ));
    }

    #[test]
    fn dot_names_pass_through() {
        assert_eq!(ShortName::encode(".").unwrap(), ShortName::DOT);
        assert_eq!(ShortName::encode("..").unwrap(), ShortName::DOTDOT);
        assert_eq!(ShortName::DOT.decode(), ".");
        assert_eq!(ShortName::DOTDOT.decode(), "..");
    }

    #[test]
    fn rejects_long_base_and_extension() {
        assert!(matches!(
            ShortName::encode("overlongname.txt"),
            Err(FsError::NameTooLong(_))
        ));
        assert!(matches!(
            ShortName::encode("foo.text"),
            Err(FsError::NameTooLong(_))
        ));
    }

    #[test]
    fn round_trip_upper_cases_the_input() {
        for name in ["foo.txt", "FOO.TXT", "a.b", "noext", "deadbeef.bin", "x"] {
            let encoded = ShortName::encode(name).unwrap();
            assert_eq!(encoded.decode(), name.to_ascii_uppercase());
        }
    }

    #[test]
    fn exact_length_components_fit() {
        let name = ShortName::encode("exactly8.txt").unwrap();
        assert_eq!(name.as_bytes(), b"EXACTLY8TXT");
        assert_eq!(name.decode(), "EXACTLY8.TXT");
    }
}
