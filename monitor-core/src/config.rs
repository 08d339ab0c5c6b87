//! Fixed configuration for the monitoring cycle.
//!
//! Every duration here is a design constant rather than a tunable: the node
//! wakes, runs one cycle, and goes back to standby, so the interval between
//! samples equals the standby duration plus the (short) awake time.

use core::time::Duration;

/// Capacity of the bounded sample channel between the pipeline stages.
pub const SAMPLE_QUEUE_DEPTH: usize = 10;

/// Period one sample is held to stand for when integrating energy.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// Longest the integration stage waits for a sample before abandoning the cycle.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);

/// Standby duration armed on the wake timer after each cycle.
pub const DEFAULT_SLEEP_DURATION: Duration = Duration::from_secs(5);

/// Billing rate applied when deriving the reported cost (currency per kWh).
pub const DEFAULT_TARIFF_PER_KWH: f32 = 0.95;

/// Timing and billing constants shared by every pipeline stage.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    sample_interval: Duration,
    receive_timeout: Duration,
    sleep_duration: Duration,
    tariff_per_kwh: f32,
}

impl MonitorConfig {
    /// Creates a configuration with explicit values.
    pub const fn new(
        sample_interval: Duration,
        receive_timeout: Duration,
        sleep_duration: Duration,
        tariff_per_kwh: f32,
    ) -> Self {
        Self {
            sample_interval,
            receive_timeout,
            sleep_duration,
            tariff_per_kwh,
        }
    }

    /// Returns the fixed inter-sample period used by the integration stage.
    pub const fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    /// Returns the bounded wait applied when dequeueing a sample.
    pub const fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }

    /// Returns the standby duration armed before suspending.
    pub const fn sleep_duration(&self) -> Duration {
        self.sleep_duration
    }

    /// Returns the billing rate in currency per kWh.
    pub const fn tariff_per_kwh(&self) -> f32 {
        self.tariff_per_kwh
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_SAMPLE_INTERVAL,
            DEFAULT_RECEIVE_TIMEOUT,
            DEFAULT_SLEEP_DURATION,
            DEFAULT_TARIFF_PER_KWH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_design_constants() {
        let config = MonitorConfig::default();
        assert_eq!(config.sample_interval(), Duration::from_secs(5));
        assert_eq!(config.receive_timeout(), Duration::from_secs(1));
        assert_eq!(config.sleep_duration(), Duration::from_secs(5));
        assert_eq!(config.tariff_per_kwh(), 0.95);
    }
}
