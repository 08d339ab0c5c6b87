use monitor_core::store::{
    DurableAccumulator, MemoryStore, STORAGE_NAMESPACE, StoreBackend, StoreError,
    TOTAL_ENERGY_KEY, encode_total,
};

/// Backend that refuses every operation, standing in for an unopenable or
/// failing NVS partition.
struct UnavailableStore;

impl StoreBackend for UnavailableStore {
    fn read(&mut self, _: &str, _: &str, _: &mut [u8]) -> Result<Option<usize>, StoreError> {
        Err(StoreError::Open)
    }

    fn write(&mut self, _: &str, _: &str, _: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Open)
    }
}

/// Backend that reads fine but fails every write, keeping whatever was
/// seeded into it.
struct ReadOnlyStore {
    inner: MemoryStore,
}

impl StoreBackend for ReadOnlyStore {
    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        out: &mut [u8],
    ) -> Result<Option<usize>, StoreError> {
        self.inner.read(namespace, key, out)
    }

    fn write(&mut self, _: &str, _: &str, _: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Write)
    }
}

#[test]
fn save_then_load_is_idempotent_across_a_restart() {
    let mut accumulator = DurableAccumulator::new(MemoryStore::new());
    accumulator.save(2.503_056).expect("persist total");

    // A restart tears down everything in memory except the store contents.
    let surviving_store = accumulator.into_backend();
    let mut resumed = DurableAccumulator::new(surviving_store);
    assert_eq!(resumed.load(), 2.503_056);
}

#[test]
fn an_absent_key_reads_as_the_first_boot_state() {
    let mut accumulator = DurableAccumulator::new(MemoryStore::new());
    assert_eq!(accumulator.load(), 0.0);
}

#[test]
fn an_unopenable_store_degrades_load_to_zero() {
    let mut accumulator = DurableAccumulator::new(UnavailableStore);
    assert_eq!(accumulator.load(), 0.0);
}

#[test]
fn a_failed_save_surfaces_the_error_and_keeps_the_prior_value() {
    let mut seeded = MemoryStore::new();
    seeded
        .write(STORAGE_NAMESPACE, TOTAL_ENERGY_KEY, &encode_total(1.5))
        .expect("seed prior value");

    let mut accumulator = DurableAccumulator::new(ReadOnlyStore { inner: seeded });
    assert_eq!(accumulator.save(9.0), Err(StoreError::Write));
    assert_eq!(accumulator.load(), 1.5);
}

#[test]
fn saving_overwrites_regardless_of_the_prior_stored_value() {
    let mut accumulator = DurableAccumulator::new(MemoryStore::new());
    for total in [0.0_f32, 4.25, 0.125, 1_000.5] {
        accumulator.save(total).expect("persist total");
        assert_eq!(accumulator.load(), total);
    }
}
