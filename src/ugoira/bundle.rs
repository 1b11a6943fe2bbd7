use std::io::{Cursor, Read};

use zip::{ZipArchive, result::ZipError};

use crate::foundation::error::{RelayError, RelayResult};

/// Random-access view over a zip bundle of frame images.
pub struct FrameBundle<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    max_entry_bytes: u64,
}

impl<'a> FrameBundle<'a> {
    /// Open `bytes` as a zip archive. Reads only the central directory.
    pub fn open(bytes: &'a [u8], max_entry_bytes: u64) -> RelayResult<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| RelayError::malformed_bundle(format!("open zip: {e}")))?;
        Ok(Self {
            archive,
            max_entry_bytes,
        })
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// `true` when the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Read the full contents of the entry called `name`.
    pub fn extract(&mut self, name: &str) -> RelayResult<Vec<u8>> {
        let max = self.max_entry_bytes;
        let mut entry = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => {
                RelayError::malformed_bundle(format!("frame '{name}' missing from bundle"))
            }
            other => RelayError::malformed_bundle(format!("read entry '{name}': {other}")),
        })?;

        let declared = entry.size();
        if declared > max {
            return Err(RelayError::limit(format!(
                "entry '{name}' declares {declared} bytes, limit is {max}"
            )));
        }

        // Declared sizes can lie; cap the actual read as well.
        let mut out = Vec::with_capacity(declared as usize);
        (&mut entry)
            .take(max.saturating_add(1))
            .read_to_end(&mut out)
            .map_err(|e| RelayError::malformed_bundle(format!("inflate entry '{name}': {e}")))?;
        if out.len() as u64 > max {
            return Err(RelayError::limit(format!(
                "entry '{name}' inflates past the limit of {max} bytes"
            )));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ugoira/bundle.rs"]
mod tests;
