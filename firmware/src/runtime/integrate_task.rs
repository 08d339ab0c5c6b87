use embassy_futures::select::{Either, select};
use embassy_time::Timer;

use monitor_core::config::MonitorConfig;
use monitor_core::energy::integrate_cycle;
use monitor_core::store::{DurableAccumulator, StoreError};

use crate::store::FlashStore;
use crate::telemetry;

use super::{CYCLE_DONE, SAMPLE_QUEUE, duration_to_embassy};

/// Integration stage: bounded dequeue, fold, persist, report.
#[embassy_executor::task]
pub async fn run(
    mut accumulator: DurableAccumulator<FlashStore<'static>>,
    starting_total: f32,
    config: MonitorConfig,
) {
    let timeout = duration_to_embassy(config.receive_timeout());

    match select(SAMPLE_QUEUE.receive(), Timer::after(timeout)).await {
        Either::First(sample) => {
            let report = integrate_cycle(starting_total, sample, &config);
            if let Err(err) = accumulator.save(report.total_kwh) {
                // Best-effort: the in-memory total stays correct, only
                // durability for this cycle is forfeited.
                defmt::warn!("energy total not persisted: {}", store_error_label(err));
            }
            telemetry::log_cycle_report(&report);
        }
        Either::Second(()) => {
            // No reading arrived in time. The cycle is abandoned without
            // error; the next wake is the retry.
        }
    }

    CYCLE_DONE.signal(());
}

fn store_error_label(err: StoreError) -> &'static str {
    match err {
        StoreError::Open => "store open failed",
        StoreError::Read => "store read failed",
        StoreError::Write => "store write failed",
    }
}
