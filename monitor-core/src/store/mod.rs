//! Durable persistence for the accumulated energy total.
//!
//! [`DurableAccumulator`] is the only component allowed to touch the durable
//! entry: one blob under a fixed namespace/key, holding the total as a
//! 4-byte little-endian IEEE-754 single. Backends expose NVS-like
//! open/write/commit semantics folded into one call per operation, so a
//! single open/write/commit/close sequence needs no extra locking.

use core::fmt;

use heapless::{String, Vec};

/// Namespace (NVS partition) holding the durable entry.
pub const STORAGE_NAMESPACE: &str = "storage";

/// Key of the accumulated-total entry, kept verbatim for wire parity with
/// stores written by earlier firmware revisions.
pub const TOTAL_ENERGY_KEY: &str = "energia_total";

/// Width of the encoded total: one IEEE-754 single.
pub const TOTAL_ENERGY_WIDTH: usize = 4;

/// Failures surfaced by a store backend.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// The store could not be opened.
    Open,
    /// The entry could not be read.
    Read,
    /// The entry could not be written or committed.
    Write,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Open => f.write_str("store open failed"),
            StoreError::Read => f.write_str("store read failed"),
            StoreError::Write => f.write_str("store write failed"),
        }
    }
}

/// Non-volatile key-value blob access.
///
/// Implementations fold the open/commit/close bracketing into each call, the
/// way the firmware's NVS-style driver brackets every operation.
pub trait StoreBackend {
    /// Reads the blob stored under `key`, copying it into `out`.
    ///
    /// Returns the number of bytes copied, or `Ok(None)` when the key has
    /// never been written — the expected first-boot state.
    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        out: &mut [u8],
    ) -> Result<Option<usize>, StoreError>;

    /// Writes and commits the blob under `key`, replacing any prior value.
    fn write(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

/// Encodes the total for storage.
#[must_use]
pub fn encode_total(total_kwh: f32) -> [u8; TOTAL_ENERGY_WIDTH] {
    total_kwh.to_le_bytes()
}

/// Decodes a stored total.
#[must_use]
pub fn decode_total(raw: [u8; TOTAL_ENERGY_WIDTH]) -> f32 {
    f32::from_le_bytes(raw)
}

/// Owner of the canonical accumulated-energy value in the durable store.
pub struct DurableAccumulator<S> {
    backend: S,
}

impl<S: StoreBackend> DurableAccumulator<S> {
    /// Wraps a backend.
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Loads the previously saved total.
    ///
    /// An absent key, an unopenable store, or a malformed entry all read as
    /// `0.0` — first boot looks exactly like this, so none of them are
    /// treated as fatal.
    pub fn load(&mut self) -> f32 {
        let mut raw = [0u8; TOTAL_ENERGY_WIDTH];
        match self.backend.read(STORAGE_NAMESPACE, TOTAL_ENERGY_KEY, &mut raw) {
            Ok(Some(TOTAL_ENERGY_WIDTH)) => decode_total(raw),
            Ok(_) | Err(_) => 0.0,
        }
    }

    /// Saves the total, replacing the stored value.
    ///
    /// Best-effort: the caller logs and swallows the error, forfeiting
    /// durability for that cycle only.
    pub fn save(&mut self, total_kwh: f32) -> Result<(), StoreError> {
        self.backend
            .write(STORAGE_NAMESPACE, TOTAL_ENERGY_KEY, &encode_total(total_kwh))
    }

    /// Returns a reference to the underlying backend.
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Consumes the accumulator and returns the backend.
    pub fn into_backend(self) -> S {
        self.backend
    }
}

/// Maximum entries the in-memory store holds.
pub const MEMORY_STORE_CAPACITY: usize = 4;

/// Longest composed `namespace/key` name the in-memory store accepts.
pub const MEMORY_STORE_NAME_LEN: usize = 64;

/// Widest blob the in-memory store accepts.
pub const MEMORY_STORE_VALUE_LEN: usize = 8;

type EntryName = String<MEMORY_STORE_NAME_LEN>;
type EntryValue = Vec<u8, MEMORY_STORE_VALUE_LEN>;

/// Volatile store backend for tests and host tooling.
///
/// Durable only for as long as the owning process lives, which is exactly
/// what the emulator needs: its simulated boots share one process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Vec<(EntryName, EntryValue), MEMORY_STORE_CAPACITY>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of distinct entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn compose_name(namespace: &str, key: &str) -> Result<EntryName, StoreError> {
        let mut name = EntryName::new();
        name.push_str(namespace).map_err(|_| StoreError::Open)?;
        name.push('/').map_err(|_| StoreError::Open)?;
        name.push_str(key).map_err(|_| StoreError::Open)?;
        Ok(name)
    }
}

impl StoreBackend for MemoryStore {
    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        out: &mut [u8],
    ) -> Result<Option<usize>, StoreError> {
        let name = Self::compose_name(namespace, key)?;
        let Some((_, value)) = self.entries.iter().find(|(entry, _)| *entry == name) else {
            return Ok(None);
        };
        if value.len() > out.len() {
            return Err(StoreError::Read);
        }
        out[..value.len()].copy_from_slice(value);
        Ok(Some(value.len()))
    }

    fn write(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let name = Self::compose_name(namespace, key)?;
        let mut blob = EntryValue::new();
        blob.extend_from_slice(value).map_err(|_| StoreError::Write)?;

        if let Some((_, existing)) = self.entries.iter_mut().find(|(entry, _)| *entry == name) {
            *existing = blob;
            Ok(())
        } else {
            self.entries
                .push((name, blob))
                .map_err(|_| StoreError::Write)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_round_trip_through_the_little_endian_codec() {
        let raw = encode_total(2.503_056);
        assert_eq!(raw, 2.503_056_f32.to_le_bytes());
        assert_eq!(decode_total(raw), 2.503_056);
    }

    #[test]
    fn load_defaults_to_zero_on_an_empty_store() {
        let mut accumulator = DurableAccumulator::new(MemoryStore::new());
        assert_eq!(accumulator.load(), 0.0);
    }

    #[test]
    fn save_then_load_returns_the_saved_total() {
        let mut accumulator = DurableAccumulator::new(MemoryStore::new());
        accumulator.save(2.503_056).expect("save total");
        assert_eq!(accumulator.load(), 2.503_056);
    }

    #[test]
    fn save_replaces_the_prior_value() {
        let mut accumulator = DurableAccumulator::new(MemoryStore::new());
        accumulator.save(1.0).expect("save first total");
        accumulator.save(7.5).expect("save second total");
        assert_eq!(accumulator.load(), 7.5);
        assert_eq!(accumulator.backend().len(), 1);
    }

    #[test]
    fn malformed_entries_read_as_the_first_boot_state() {
        let mut store = MemoryStore::new();
        store
            .write(STORAGE_NAMESPACE, TOTAL_ENERGY_KEY, &[1, 2])
            .expect("write short blob");
        let mut accumulator = DurableAccumulator::new(store);
        assert_eq!(accumulator.load(), 0.0);
    }
}
