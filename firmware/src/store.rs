//! Flash-backed store for the accumulated energy total.
//!
//! One flash page is reserved at the top of the 512 KiB part and holds a
//! single fixed-size record: a magic word followed by the little-endian
//! encoded total. Fixed-size, erase-then-write records keep the entry
//! readable after power loss at any point — a torn write leaves either the
//! old record or an unreadable magic, and an unreadable magic reads as the
//! first-boot state.

#![cfg(target_os = "none")]

use embassy_stm32::flash::{Blocking, Flash};

use monitor_core::boot::InitError;
use monitor_core::store::{
    STORAGE_NAMESPACE, StoreBackend, StoreError, TOTAL_ENERGY_KEY, TOTAL_ENERGY_WIDTH,
};

/// Offset of the reserved record page: the last 2 KiB of flash.
const RECORD_PAGE_OFFSET: u32 = 0x0007_F800;

/// Size of the reserved page.
const RECORD_PAGE_SIZE: u32 = 2 * 1024;

/// Marker distinguishing a written record from erased flash.
const RECORD_MAGIC: u32 = 0x4557_4831;

/// Width of the stored record: magic word plus encoded total.
const RECORD_WIDTH: usize = 4 + TOTAL_ENERGY_WIDTH;

/// Store backend over the reserved flash page.
pub struct FlashStore<'d> {
    flash: Flash<'d, Blocking>,
}

impl<'d> FlashStore<'d> {
    /// Wraps the flash driver after verifying the record page is readable.
    ///
    /// Failure here is the fatal-initialization path: the caller must not
    /// schedule any task on top of an unusable store subsystem.
    pub fn new(mut flash: Flash<'d, Blocking>) -> Result<Self, InitError> {
        let mut record = [0u8; RECORD_WIDTH];
        match flash.blocking_read(RECORD_PAGE_OFFSET, &mut record) {
            Ok(()) => Ok(Self { flash }),
            Err(_) => Err(InitError::StoreUnavailable),
        }
    }

    fn is_total_entry(namespace: &str, key: &str) -> bool {
        namespace == STORAGE_NAMESPACE && key == TOTAL_ENERGY_KEY
    }
}

impl StoreBackend for FlashStore<'_> {
    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        out: &mut [u8],
    ) -> Result<Option<usize>, StoreError> {
        if !Self::is_total_entry(namespace, key) {
            return Ok(None);
        }

        let mut record = [0u8; RECORD_WIDTH];
        self.flash
            .blocking_read(RECORD_PAGE_OFFSET, &mut record)
            .map_err(|_| StoreError::Read)?;

        let magic = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        if magic != RECORD_MAGIC {
            // Erased or torn page: the key has effectively never been written.
            return Ok(None);
        }
        if out.len() < TOTAL_ENERGY_WIDTH {
            return Err(StoreError::Read);
        }
        out[..TOTAL_ENERGY_WIDTH].copy_from_slice(&record[4..]);
        Ok(Some(TOTAL_ENERGY_WIDTH))
    }

    fn write(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if !Self::is_total_entry(namespace, key) || value.len() != TOTAL_ENERGY_WIDTH {
            return Err(StoreError::Write);
        }

        let mut record = [0u8; RECORD_WIDTH];
        record[..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        record[4..].copy_from_slice(value);

        self.flash
            .blocking_erase(RECORD_PAGE_OFFSET, RECORD_PAGE_OFFSET + RECORD_PAGE_SIZE)
            .map_err(|_| StoreError::Write)?;
        self.flash
            .blocking_write(RECORD_PAGE_OFFSET, &record)
            .map_err(|_| StoreError::Write)
    }
}
