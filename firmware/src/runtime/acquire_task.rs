use monitor_core::sampling::{AcquisitionError, SampleSource};

use crate::telemetry;

use super::{SAMPLE_QUEUE, SensorCell};

/// Acquisition stage: one guarded read, one enqueue, then the task ends.
#[embassy_executor::task]
pub async fn run(sensor: &'static SensorCell) {
    // The lock spans only the read; the enqueue happens after release so a
    // full queue cannot hold the sensor hostage.
    let reading = {
        let mut source = sensor.lock().await;
        source.acquire()
    };

    match reading {
        Ok(sample) => {
            SAMPLE_QUEUE.send(sample).await;
            telemetry::log_sample_acquired(sample);
        }
        Err(err) => {
            // Nothing is enqueued: downstream observes this cycle as a
            // dequeue timeout and the next wake retries.
            defmt::warn!("sample acquisition failed: {}", acquisition_error_label(err));
        }
    }
}

fn acquisition_error_label(err: AcquisitionError) -> &'static str {
    match err {
        AcquisitionError::SensorFault => "sensor fault",
    }
}
