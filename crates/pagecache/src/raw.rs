//! Abstraction over the host OS file primitives the cache builds on.
//!
//! Kept as a narrow capability trait — positioned read, positioned write,
//! size query, cursor sync — rather than a direct dependency on
//! `std::fs::File`, so the page store and clock policy can be exercised
//! against an in-memory fake in tests.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::os::unix::fs::FileExt;
use std::path::Path;

/// The host-OS file operations the page store drives directly.
pub trait RawFile: std::fmt::Debug + Send + Sync {
    /// Reads into `buf` starting at `offset`, without disturbing the file's
    /// own cursor. May return fewer bytes than `buf.len()` at end-of-file.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes `buf` starting at `offset`, without disturbing the file's own
    /// cursor.
    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<usize>;

    /// Current length of the file, in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Synchronizes the OS-level file cursor to `pos`. Not authoritative
    /// for reads/writes (those always use `read_at`/`write_at`), but kept
    /// in step so a caller reaching past this abstraction observes the
    /// same position `seek` reports.
    fn seek_to(&self, pos: u64) -> io::Result<()>;
}

/// `RawFile` backed by a real `std::fs::File`, opened read-write,
/// created if missing.
#[derive(Debug)]
pub struct OsFile {
    file: File,
}

impl OsFile {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self { file })
    }
}

impl RawFile for OsFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read_at(offset, buf)
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<usize> {
        self.file.write_at(offset, buf)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn seek_to(&self, pos: u64) -> io::Result<()> {
        let mut cursor = &self.file;
        cursor.seek(SeekFrom::Start(pos))?;
        Ok(())
    }
}
