//! Loading and saving worksheet files.
//!
//! A file holds the source text only. Saving writes a temporary file next
//! to the destination and renames it over the destination, so a failed
//! save leaves the old file intact.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::Worksheet;
use crate::errors::FileError;
use crate::text::Position;

impl Worksheet {
    /// Replace the worksheet with the contents of `path`.
    pub fn load(&mut self, path: &Path) -> Result<(), FileError> {
        self.check_idle()?;
        let bytes = fs::read(path).map_err(|source| FileError::Read {
            path: path.to_owned(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| FileError::Encoding {
            path: path.to_owned(),
        })?;
        debug!(path = %path.display(), len = text.len(), "loading worksheet");

        self.freeze();
        self.delete_all();
        self.insert_source(Position::new(0, 0), &text);
        self.thaw();
        self.undo.clear();
        self.set_filename(Some(path.to_owned()));
        self.set_code_modified(false);
        Ok(())
    }

    /// Write the source text to `path`, or to the current filename. An
    /// unmodified worksheet is not rewritten to the file it came from.
    pub fn save(&mut self, path: Option<&Path>) -> Result<(), FileError> {
        let path: PathBuf = match (path, &self.filename) {
            (Some(path), _) => path.to_owned(),
            (None, Some(current)) => current.clone(),
            (None, None) => return Err(FileError::NoFilename),
        };
        if !self.code_modified && self.filename.as_ref() == Some(&path) {
            debug!(path = %path.display(), "worksheet unmodified, not saving");
            return Ok(());
        }

        write_atomic(&path, self.public_text(None, None).as_bytes()).map_err(|source| {
            FileError::Write {
                path: path.clone(),
                source,
            }
        })?;
        debug!(path = %path.display(), "worksheet saved");
        self.set_filename(Some(path));
        self.set_code_modified(false);
        Ok(())
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
