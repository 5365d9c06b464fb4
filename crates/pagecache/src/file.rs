//! File handle: binds one open OS file to one page store plus a logical
//! read/write position, and exposes the read/write/seek/fsync API.

use std::sync::Mutex;

use common::{CacheConfig, CacheError, CacheResult};

use crate::raw::RawFile;
use crate::store::PageStore;

/// `seek`'s reference point, matching POSIX `SEEK_SET`/`SEEK_CUR`/`SEEK_END`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

struct FileHandleInner {
    file: Box<dyn RawFile>,
    store: PageStore,
    position: u64,
}

/// One open file: the OS file, its page store, and the logical position
/// shared by `read`/`write`/`seek`. Every operation on a handle takes the
/// same mutex for its full duration, so concurrent operations on one
/// descriptor serialize.
pub struct FileHandle {
    inner: Mutex<FileHandleInner>,
}

impl FileHandle {
    pub fn new(file: Box<dyn RawFile>, config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(FileHandleInner {
                file,
                store: PageStore::new(config.cache_pages, config.page_size),
                position: 0,
            }),
        }
    }

    /// Reads up to `buf.len()` bytes starting at the current position,
    /// splitting across page boundaries. Always delivers the full buffer
    /// unless an error occurs — there is no short return, even past
    /// end-of-file (zero-filled page tails are returned as data).
    pub fn read(&self, buf: &mut [u8]) -> CacheResult<usize> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let page_size = inner.store.page_size() as u64;

        let mut delivered = 0usize;
        while delivered < buf.len() {
            let pos = inner.position;
            let page_offset = pos - pos % page_size;
            let in_page = (pos % page_size) as usize;
            let span = (buf.len() - delivered).min(page_size as usize - in_page);

            let idx = inner.store.get_or_load(inner.file.as_ref(), page_offset)?;
            let page = inner.store.slot(idx).expect("just materialized");
            buf[delivered..delivered + span].copy_from_slice(&page.data[in_page..in_page + span]);

            inner.position += span as u64;
            delivered += span;
        }
        Ok(delivered)
    }

    /// Writes `buf` starting at the current position, splitting across
    /// page boundaries. Each touched page is materialized first (loading
    /// it from disk if necessary to preserve the bytes the write does not
    /// overlap) and marked dirty. No data reaches the underlying file until
    /// a dirty page is evicted or flushed.
    pub fn write(&self, buf: &[u8]) -> CacheResult<usize> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        let page_size = inner.store.page_size() as u64;

        let mut accepted = 0usize;
        while accepted < buf.len() {
            let pos = inner.position;
            let page_offset = pos - pos % page_size;
            let in_page = (pos % page_size) as usize;
            let span = (buf.len() - accepted).min(page_size as usize - in_page);

            let idx = inner.store.get_or_load(inner.file.as_ref(), page_offset)?;
            let page = inner.store.slot_mut(idx).expect("just materialized");
            page.data[in_page..in_page + span].copy_from_slice(&buf[accepted..accepted + span]);
            page.dirty = true;

            inner.position += span as u64;
            accepted += span;
        }
        Ok(accepted)
    }

    /// Updates the logical position per `whence`, and synchronizes (but
    /// does not consult) the OS-level file cursor to match.
    pub fn seek(&self, offset: i64, whence: Whence) -> CacheResult<u64> {
        let mut inner = self.inner.lock().unwrap();

        let base: i64 = match whence {
            Whence::Set => 0,
            Whence::Cur => inner.position as i64,
            Whence::End => inner.file.size()? as i64,
        };
        let new_pos = base
            .checked_add(offset)
            .ok_or_else(|| CacheError::InvalidArgument("seek position overflow".into()))?;
        if new_pos < 0 {
            return Err(CacheError::InvalidArgument(
                "seek would move to a negative position".into(),
            ));
        }

        inner.position = new_pos as u64;
        inner.file.seek_to(inner.position)?;
        Ok(inner.position)
    }

    /// Flushes every dirty page. Stops at the first failure, leaving the
    /// remaining dirty pages unflushed.
    pub fn fsync(&self) -> CacheResult<()> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        inner.store.flush_all(inner.file.as_ref())
    }
}
