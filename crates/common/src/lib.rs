//! Shared error taxonomy and tunables for the page-cache workspace.
//!
//! Every other crate in this workspace depends on `common` for its error
//! type and its `CacheConfig` defaults, the way a database's storage
//! engine anchors its crates on one shared `DbError`.


use std::io;
use thiserror::Error;

/// Default page size, in bytes. Every page buffer is exactly this long
/// once populated, and every page offset is a multiple of it.
pub const PAGE_SIZE: usize = 4096;

/// Default number of page slots held per open file.
pub const CACHE_PAGES: usize = 64;

/// Default maximum number of simultaneously open descriptors.
pub const MAX_OPEN: usize = 256;

/// Canonical error type shared across the cache, the descriptor table,
/// and the benchmark driver.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("bad descriptor")]
    BadDescriptor,
    #[error("too many open files")]
    TooManyOpen,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    Permission(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<io::Error> for CacheError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => CacheError::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => CacheError::Permission(err.to_string()),
            _ => CacheError::Io(err.to_string()),
        }
    }
}

/// Result alias that carries a [`CacheError`].
pub type CacheResult<T> = Result<T, CacheError>;

/// Tunable parameters for one [`pagecache`](../pagecache/index.html)
/// [`Cache`](../pagecache/struct.Cache.html) instance.
///
/// # Example
/// ```
/// use common::CacheConfig;
///
/// let config = CacheConfig::builder()
///     .cache_pages(16)
///     .max_open(8)
///     .build();
/// assert_eq!(config.page_size, common::PAGE_SIZE);
/// ```
#[derive(Clone, Copy, Debug, bon::Builder)]
pub struct CacheConfig {
    /// Size of one page, in bytes. Pages are always this length once
    /// loaded; the tail beyond end-of-file is zero-filled.
    #[builder(default = PAGE_SIZE)]
    pub page_size: usize,
    /// Number of page slots kept resident per open file.
    #[builder(default = CACHE_PAGES)]
    pub cache_pages: usize,
    /// Maximum number of descriptors live at once.
    #[builder(default = MAX_OPEN)]
    pub max_open: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            cache_pages: CACHE_PAGES,
            max_open: MAX_OPEN,
        }
    }
}
