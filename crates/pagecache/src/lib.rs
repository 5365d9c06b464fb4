//! A user-space page cache layered above raw OS file I/O.
//!
//! Replaces the host page cache for callers that want control over their
//! own caching policy: a fixed-size, fixed-page in-process cache per open
//! file, evicted with a second-chance (clock) algorithm, reachable through
//! a small POSIX-style file API (open/close/read/write/seek/fsync).
//!
//! Two ways to use it:
//!
//! - An explicit [`Cache`] context — no process-wide state, any number of
//!   independent instances.
//! - The free functions ([`open`], [`close`], [`read`], [`write`],
//!   [`seek`], [`fsync`]) operating on one lazily-initialized process-wide
//!   `Cache`, for callers that want the plain integer-descriptor API shown
//!   in the original C interface this crate reimplements.
//!
//! # Example
//!
//! ```no_run
//! use pagecache::{Cache, Whence};
//! use common::CacheConfig;
//!
//! let cache = Cache::new(CacheConfig::default());
//! let fd = cache.open("/tmp/example.bin").unwrap();
//! cache.write(fd, b"hello").unwrap();
//! cache.seek(fd, 0, Whence::Set).unwrap();
//! let mut buf = [0u8; 5];
//! cache.read(fd, &mut buf).unwrap();
//! assert_eq!(&buf, b"hello");
//! cache.close(fd).unwrap();
//! ```

mod descriptor;
mod file;
mod page;
mod raw;
mod store;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::{Arc, OnceLock};

pub use common::{CacheConfig, CacheError, CacheResult};
pub use descriptor::Fd;
pub use file::Whence;
pub use page::Page;
pub use raw::{OsFile, RawFile};
pub use store::PageStore;

use descriptor::DescriptorTable;
use file::FileHandle;

/// An explicit library context: one descriptor table and the config new
/// file handles are created with. Multiple `Cache` instances may coexist;
/// none of them share state.
pub struct Cache {
    config: CacheConfig,
    table: DescriptorTable,
}

impl Cache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            table: DescriptorTable::new(config.max_open),
            config,
        }
    }

    /// Opens (creating if missing) `path` for read-write access and
    /// installs it in the descriptor table.
    pub fn open(&self, path: impl AsRef<Path>) -> CacheResult<Fd> {
        let raw = OsFile::open(path)?;
        let handle = Arc::new(FileHandle::new(Box::new(raw), self.config));
        self.table.install(handle)
    }

    /// Performs an implicit `fsync`, then releases the descriptor. The
    /// descriptor is destroyed even if the implicit fsync fails; the
    /// failure is still surfaced to the caller.
    pub fn close(&self, fd: Fd) -> CacheResult<()> {
        let handle = self.table.release(fd)?;
        handle.fsync()
    }

    pub fn read(&self, fd: Fd, buf: &mut [u8]) -> CacheResult<usize> {
        self.table.lookup(fd)?.read(buf)
    }

    pub fn write(&self, fd: Fd, buf: &[u8]) -> CacheResult<usize> {
        self.table.lookup(fd)?.write(buf)
    }

    pub fn seek(&self, fd: Fd, offset: i64, whence: Whence) -> CacheResult<u64> {
        self.table.lookup(fd)?.seek(offset, whence)
    }

    pub fn fsync(&self, fd: Fd) -> CacheResult<()> {
        self.table.lookup(fd)?.fsync()
    }
}

static GLOBAL: OnceLock<Cache> = OnceLock::new();

fn global() -> &'static Cache {
    GLOBAL.get_or_init(|| Cache::new(CacheConfig::default()))
}

/// Opens `path`, returning a descriptor `>= 0`, or `-1` on error.
pub fn open(path: impl AsRef<Path>) -> Fd {
    global().open(path).unwrap_or(-1)
}

/// Closes `fd` (implicit fsync), returning `0` on success or `-1` on error.
pub fn close(fd: Fd) -> i32 {
    match global().close(fd) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// Reads `buf.len()` bytes, returning the count delivered or `-1`.
pub fn read(fd: Fd, buf: &mut [u8]) -> i64 {
    match global().read(fd, buf) {
        Ok(n) => n as i64,
        Err(_) => -1,
    }
}

/// Writes `buf`, returning the count accepted or `-1`.
pub fn write(fd: Fd, buf: &[u8]) -> i64 {
    match global().write(fd, buf) {
        Ok(n) => n as i64,
        Err(_) => -1,
    }
}

/// Seeks to a new position, returning it or `-1`.
pub fn seek(fd: Fd, offset: i64, whence: Whence) -> i64 {
    match global().seek(fd, offset, whence) {
        Ok(pos) => pos as i64,
        Err(_) => -1,
    }
}

/// Flushes every dirty page, returning `0` on success or `-1` on error.
pub fn fsync(fd: Fd) -> i32 {
    match global().fsync(fd) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}
