//! Task wiring for one monitoring cycle.
//!
//! Every boot runs the pipeline exactly once: acquisition and integration
//! are independent tasks joined by the bounded sample channel, and the
//! sleep task commits the node back to Standby once integration signals
//! completion. There is no in-memory loop — the armed wake timer
//! synthesizes the next cycle as a fresh boot.

use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::Adc;
use embassy_stm32::flash::Flash;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use static_cell::StaticCell;

use monitor_core::boot::{InitError, initial_total};
use monitor_core::config::{MonitorConfig, SAMPLE_QUEUE_DEPTH};
use monitor_core::sampling::Sample;
use monitor_core::store::DurableAccumulator;

use crate::hw::sensor::AdcSampleSource;
use crate::sleep;
use crate::store::FlashStore;

mod acquire_task;
mod integrate_task;
mod sleep_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Bounded handoff between the acquisition and integration stages.
pub(super) type SampleQueue = Channel<ThreadModeRawMutex, Sample, SAMPLE_QUEUE_DEPTH>;

/// Guard around the sensor front end; held only across the read.
pub(super) type SensorCell = Mutex<ThreadModeRawMutex, AdcSampleSource<'static>>;

pub(super) static SAMPLE_QUEUE: SampleQueue = Channel::new();
pub(super) static CYCLE_DONE: Signal<ThreadModeRawMutex, ()> = Signal::new();
static SENSOR: StaticCell<SensorCell> = StaticCell::new();

fn duration_to_embassy(duration: core::time::Duration) -> embassy_time::Duration {
    let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
    embassy_time::Duration::from_micros(micros)
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        ADC1,
        PA0,
        PA1,
        FLASH,
        ..
    } = hal::init(config);

    let monitor = MonitorConfig::default();

    // Store bring-up is the one fatal path: without it the pipeline would
    // run over undefined durable state, so nothing gets scheduled.
    let store = match FlashStore::new(Flash::new_blocking(FLASH)) {
        Ok(store) => store,
        Err(err) => {
            defmt::error!("halting before task startup: {}", init_error_label(err));
            return;
        }
    };
    let mut accumulator = DurableAccumulator::new(store);

    let cause = sleep::wake_cause();
    let stored = accumulator.load();
    let total = initial_total(cause, stored);
    if cause.is_timer_wake() {
        defmt::info!("woke from standby, resuming at {} kWh", total);
    } else {
        defmt::info!("first boot, accumulator reset");
    }

    let sensor = SENSOR.init(Mutex::new(AdcSampleSource::new(Adc::new(ADC1), PA0, PA1)));

    spawner
        .spawn(acquire_task::run(sensor))
        .expect("failed to spawn acquisition task");
    spawner
        .spawn(integrate_task::run(accumulator, total, monitor))
        .expect("failed to spawn integration task");
    spawner
        .spawn(sleep_task::run(monitor))
        .expect("failed to spawn sleep task");

    core::future::pending::<()>().await;
}

fn init_error_label(err: InitError) -> &'static str {
    match err {
        InitError::StoreUnavailable => "durable store unavailable",
    }
}
