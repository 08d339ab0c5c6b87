use monitor_core::config::MonitorConfig;

use crate::sleep;

use super::CYCLE_DONE;

/// Sleep controller: once the cycle reports done, arm the wake timer and
/// commit the node to Standby. No code runs past this point in this boot.
#[embassy_executor::task]
pub async fn run(config: MonitorConfig) -> ! {
    CYCLE_DONE.wait().await;
    defmt::info!(
        "entering standby for {} s",
        config.sleep_duration().as_secs()
    );
    sleep::enter_standby(config.sleep_duration())
}
