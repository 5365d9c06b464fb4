//! Process-wide-shaped descriptor table mapping small integer descriptors
//! to file handles.
//!
//! A single mutex guards slot acquisition and release; it is held only
//! for the duration of a slot scan, never across I/O — table operations
//! and per-handle I/O are deliberately kept on separate locks (see
//! `FileHandle`).

use std::sync::{Arc, Mutex};

use common::{CacheError, CacheResult};

use crate::file::FileHandle;

/// Small non-negative integer handle for an open file, or -1 as the
/// failure sentinel the public C-shaped API returns.
pub type Fd = i32;

pub struct DescriptorTable {
    slots: Mutex<Vec<Option<Arc<FileHandle>>>>,
}

impl DescriptorTable {
    pub fn new(max_open: usize) -> Self {
        Self {
            slots: Mutex::new((0..max_open).map(|_| None).collect()),
        }
    }

    /// Installs `handle` in the lowest-numbered empty slot.
    pub fn install(&self, handle: Arc<FileHandle>) -> CacheResult<Fd> {
        let mut slots = self.slots.lock().unwrap();
        for (i, slot) in slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(handle);
                return Ok(i as Fd);
            }
        }
        log::warn!("descriptor table full ({} slots)", slots.len());
        Err(CacheError::TooManyOpen)
    }

    /// Looks up the handle for `fd`. Out-of-range or empty slots, and any
    /// negative `fd`, are reported as `BAD_DESCRIPTOR`.
    pub fn lookup(&self, fd: Fd) -> CacheResult<Arc<FileHandle>> {
        if fd < 0 {
            return Err(CacheError::BadDescriptor);
        }
        let slots = self.slots.lock().unwrap();
        slots
            .get(fd as usize)
            .and_then(|slot| slot.clone())
            .ok_or(CacheError::BadDescriptor)
    }

    /// Releases `fd`, returning the handle that occupied it (if any) so the
    /// caller can run its close-time cleanup after dropping the table lock.
    pub fn release(&self, fd: Fd) -> CacheResult<Arc<FileHandle>> {
        if fd < 0 {
            return Err(CacheError::BadDescriptor);
        }
        let mut slots = self.slots.lock().unwrap();
        slots
            .get_mut(fd as usize)
            .and_then(|slot| slot.take())
            .ok_or(CacheError::BadDescriptor)
    }
}
