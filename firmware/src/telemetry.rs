//! Informational logging for the monitoring pipeline.
//!
//! Reporting is an output-only boundary: nothing consumes these lines. The
//! helpers mirror every emission to defmt on the MCU and to stdout when the
//! same code is exercised on a host build.

#![allow(dead_code)]

use monitor_core::energy::CycleReport;
use monitor_core::sampling::Sample;

/// Logs the pair handed to the integration stage.
pub fn log_sample_acquired(sample: Sample) {
    #[cfg(target_os = "none")]
    defmt::info!(
        "sample enqueued: {} A, {} V",
        sample.current_a,
        sample.voltage_v
    );

    #[cfg(not(target_os = "none"))]
    println!(
        "sample enqueued: {:.2} A, {:.2} V",
        sample.current_a, sample.voltage_v
    );
}

/// Logs the projection of one completed cycle.
pub fn log_cycle_report(report: &CycleReport) {
    #[cfg(target_os = "none")]
    defmt::info!(
        "power: {} W | total energy: {} kWh | cost: R$ {}",
        report.power_w,
        report.total_kwh,
        report.cost
    );

    #[cfg(not(target_os = "none"))]
    println!(
        "power: {:.2} W | total energy: {:.4} kWh | cost: R$ {:.2}",
        report.power_w, report.total_kwh, report.cost
    );
}
