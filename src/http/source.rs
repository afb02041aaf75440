//! Zero-copy access to the served file.

use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The single file behind `/`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the file on disk.
    pub fn len(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    /// Maps `[start, end)` of the file read-only.
    ///
    /// Fails with `InvalidInput` when the span is reversed or runs past the
    /// end of the file, and with the usual I/O errors when the file cannot
    /// be opened.
    pub fn map(&self, start: u64, end: u64) -> io::Result<MappedRegion> {
        let file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();

        if start > end || end > file_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("span {start}..{end} outside file of {file_len} bytes"),
            ));
        }

        let len = usize::try_from(end - start)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        if len == 0 {
            return Ok(MappedRegion { map: None, start });
        }

        // SAFETY: the file is opened read-only and never written by this
        // process, and the span was checked against its length above.
        let map = unsafe { MmapOptions::new().offset(start).len(len).map(&file)? };

        Ok(MappedRegion {
            map: Some(Arc::new(map)),
            start,
        })
    }
}

/// A read-only mapping of part of the served file.
///
/// Clones share the same mapping; it is unmapped when the last clone drops.
#[derive(Debug, Clone)]
pub struct MappedRegion {
    map: Option<Arc<Mmap>>,
    start: u64,
}

impl MappedRegion {
    /// File offset of the first mapped byte.
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().map(|map| &map[..]).unwrap_or_default()
    }
}

impl Deref for MappedRegion {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for MappedRegion {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
