//! Fixed-capacity page store and second-chance (clock) eviction.


use common::{CacheError, CacheResult};

use crate::page::{AlignedBuffer, Page};
use crate::raw::RawFile;

/// A fixed-capacity set of page slots for one open file, plus the clock
/// hand that sweeps them on eviction.
#[derive(Debug)]
pub struct PageStore {
    slots: Vec<Option<Page>>,
    hand: usize,
    page_size: usize,
}

impl PageStore {
    pub fn new(capacity: usize, page_size: usize) -> Self {
        assert!(capacity > 0, "page store capacity must be > 0");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            hand: 0,
            page_size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn slot(&self, idx: usize) -> Option<&Page> {
        self.slots[idx].as_ref()
    }

    pub fn slot_mut(&mut self, idx: usize) -> Option<&mut Page> {
        self.slots[idx].as_mut()
    }

    /// Scans for a populated slot whose offset equals `offset`. Offsets are
    /// compared for equality, never for range containment.
    pub fn find(&self, offset: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(page) if page.offset == offset))
    }

    /// Advances the clock hand, clearing reference bits, until it finds an
    /// unreferenced (or empty) slot. Bounded by `2 * capacity()` visits:
    /// every slot is seen at most twice (once to clear its bit, once more
    /// to find it cleared) before a victim is guaranteed.
    fn select_victim(&mut self) -> usize {
        let capacity = self.slots.len();
        for _ in 0..2 * capacity {
            let idx = self.hand;
            self.hand = (self.hand + 1) % capacity;
            match &mut self.slots[idx] {
                None => return idx,
                Some(page) if !page.referenced => return idx,
                Some(page) => page.referenced = false,
            }
        }
        unreachable!("clock hand must select a victim within 2 * capacity visits")
    }

    fn load_into(&self, file: &dyn RawFile, offset: u64, buf: &mut [u8]) -> CacheResult<()> {
        let n = file.read_at(offset, buf)?;
        if n < buf.len() {
            buf[n..].fill(0);
        }
        Ok(())
    }

    fn flush_slot(&mut self, file: &dyn RawFile, idx: usize) -> CacheResult<()> {
        let page = self.slots[idx]
            .as_mut()
            .expect("flush target must be populated");
        if !page.dirty {
            return Ok(());
        }
        let written = file.write_at(page.offset, &page.data)?;
        if written != page.data.len() {
            return Err(CacheError::Io(format!(
                "short write: wrote {written} of {} bytes at offset {}",
                page.data.len(),
                page.offset
            )));
        }
        page.dirty = false;
        Ok(())
    }

    /// Returns the slot index holding `page_offset`, loading it from `file`
    /// (possibly evicting a victim first) on a miss.
    ///
    /// On a flush or load failure the victim slot is left exactly as it was
    /// before this call started: a flushed-but-not-yet-reloaded victim is
    /// never left half-evicted. If the load itself fails after a successful
    /// flush, the slot is marked empty rather than left holding stale
    /// metadata paired with a buffer of uncertain contents.
    pub fn get_or_load(&mut self, file: &dyn RawFile, page_offset: u64) -> CacheResult<usize> {
        if let Some(idx) = self.find(page_offset) {
            self.slots[idx].as_mut().unwrap().referenced = true;
            return Ok(idx);
        }

        let idx = self.select_victim();
        let is_dirty = matches!(&self.slots[idx], Some(page) if page.dirty);
        if is_dirty {
            log::debug!(
                "evicting dirty page at offset {} to load page at offset {page_offset}",
                self.slots[idx].as_ref().unwrap().offset
            );
            self.flush_slot(file, idx)?;
        }

        let page_size = self.page_size;
        let mut buffer = match self.slots[idx].take() {
            Some(page) => page.data,
            None => AlignedBuffer::new(page_size, page_size).ok_or(CacheError::OutOfMemory)?,
        };

        match self.load_into(file, page_offset, &mut buffer) {
            Ok(()) => {
                self.slots[idx] = Some(Page {
                    offset: page_offset,
                    size: page_size,
                    data: buffer,
                    dirty: false,
                    referenced: true,
                });
                Ok(idx)
            }
            Err(err) => {
                // Slot was already taken to `None` above; leave it empty
                // rather than reinstate possibly-stale contents.
                Err(err)
            }
        }
    }

    /// Flushes every dirty slot. Stops at the first failure, leaving the
    /// remaining dirty slots unflushed so a later `fsync` can retry them.
    pub fn flush_all(&mut self, file: &dyn RawFile) -> CacheResult<()> {
        for idx in 0..self.slots.len() {
            let dirty = matches!(&self.slots[idx], Some(page) if page.dirty);
            if dirty {
                self.flush_slot(file, idx)?;
            }
        }
        Ok(())
    }
}
