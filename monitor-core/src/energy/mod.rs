//! Energy integration math and the per-cycle reporting projection.
//!
//! One sample is held constant over the fixed inter-cycle interval, so a
//! cycle's energy is `power × interval / 3600` watt-hours — a deliberate
//! instantaneous-power approximation, not a trapezoid. The running total is
//! kept in kWh; the conversion from watt-hours happens exactly once, in
//! [`integrate_cycle`].

use core::time::Duration;

use crate::config::MonitorConfig;
use crate::sampling::Sample;

/// Seconds in one hour, the divisor in the energy formula.
pub const SECONDS_PER_HOUR: f32 = 3600.0;

/// Watt-hours per kilowatt-hour.
pub const WATT_HOURS_PER_KILOWATT_HOUR: f32 = 1000.0;

/// Instantaneous power in watts for one reading.
#[must_use]
pub fn instantaneous_power_w(sample: Sample) -> f32 {
    sample.current_a * sample.voltage_v
}

/// Energy in watt-hours attributed to holding `power_w` for `interval`.
#[must_use]
pub fn interval_energy_wh(power_w: f32, interval: Duration) -> f32 {
    power_w * (interval.as_secs_f32() / SECONDS_PER_HOUR)
}

/// Reporting projection of one completed cycle.
///
/// Derived from the latest sample plus the accumulated total; informational
/// output only, with no lifecycle of its own.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CycleReport {
    /// Current of the sample that completed the cycle, in amperes.
    pub current_a: f32,
    /// Voltage of the sample that completed the cycle, in volts.
    pub voltage_v: f32,
    /// Instantaneous power of the sample, in watts.
    pub power_w: f32,
    /// Accumulated energy total after this cycle, in kWh.
    pub total_kwh: f32,
    /// Estimated cost of the accumulated total at the configured tariff.
    pub cost: f32,
}

/// Folds one sample into the running total and projects the cycle report.
///
/// The returned report carries the updated total; the caller owns the
/// canonical value and decides whether it gets persisted.
#[must_use]
pub fn integrate_cycle(total_kwh: f32, sample: Sample, config: &MonitorConfig) -> CycleReport {
    let power_w = instantaneous_power_w(sample);
    let energy_wh = interval_energy_wh(power_w, config.sample_interval());
    let total_kwh = total_kwh + energy_wh / WATT_HOURS_PER_KILOWATT_HOUR;
    let cost = total_kwh * config.tariff_per_kwh();

    CycleReport {
        current_a: sample.current_a,
        voltage_v: sample.voltage_v,
        power_w,
        total_kwh,
        cost,
    }
}

/// How one monitoring cycle ended.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// A sample arrived in time and was folded into the total.
    Completed(CycleReport),
    /// No sample arrived within the bounded wait; nothing was accumulated
    /// or persisted. A normal outcome, not an error.
    TimedOut,
}

impl CycleOutcome {
    /// Returns `true` when the cycle produced a report.
    pub const fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed(_))
    }

    /// Returns the report for a completed cycle, if any.
    pub const fn report(&self) -> Option<CycleReport> {
        match self {
            CycleOutcome::Completed(report) => Some(*report),
            CycleOutcome::TimedOut => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn power_is_the_product_of_current_and_voltage() {
        let sample = Sample::new(10.0, 220.0);
        assert!(close(instantaneous_power_w(sample), 2200.0));
    }

    #[test]
    fn interval_energy_holds_the_sample_constant_over_the_interval() {
        // 2200 W for 5 s: 2200 * 5 / 3600 ≈ 3.0556 Wh.
        let energy = interval_energy_wh(2200.0, Duration::from_secs(5));
        assert!(close(energy, 3.055_556));
    }

    #[test]
    fn integrate_cycle_accumulates_in_kilowatt_hours() {
        let config = MonitorConfig::default();
        let report = integrate_cycle(2.5, Sample::new(10.0, 220.0), &config);

        assert!(close(report.power_w, 2200.0));
        assert!(close(report.total_kwh, 2.503_056));
        assert!(close(report.cost, 2.503_056 * 0.95));
    }

    #[test]
    fn zero_sample_contributes_zero_energy() {
        let config = MonitorConfig::default();
        let report = integrate_cycle(1.25, Sample::new(0.0, 0.0), &config);
        assert!(close(report.total_kwh, 1.25));
    }

    #[test]
    fn outcome_report_is_present_only_when_completed() {
        let config = MonitorConfig::default();
        let report = integrate_cycle(0.0, Sample::new(1.0, 100.0), &config);

        assert!(CycleOutcome::Completed(report).is_completed());
        assert_eq!(CycleOutcome::Completed(report).report(), Some(report));
        assert!(!CycleOutcome::TimedOut.is_completed());
        assert_eq!(CycleOutcome::TimedOut.report(), None);
    }
}
