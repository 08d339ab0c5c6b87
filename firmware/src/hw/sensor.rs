//! ADC-backed sample source for the current/voltage front end.
//!
//! This module wires the Embassy ADC driver into the [`SampleSource`]
//! capability declared in `monitor-core`. The current channel reads a shunt
//! amplifier on PA0, the voltage channel a scaled divider on PA1; both are
//! converted to engineering units here so the rest of the pipeline only ever
//! sees amperes and volts.

#![cfg(target_os = "none")]

use embassy_stm32::Peri;
use embassy_stm32::adc::{Adc, SampleTime};
use embassy_stm32::peripherals::{ADC1, PA0, PA1};

use monitor_core::sampling::{AcquisitionError, Sample, SampleSource};

/// ADC reference voltage.
const VREF_V: f32 = 3.3;

/// Full-scale count at 12-bit resolution.
const FULL_SCALE: u16 = 4095;

/// Shunt amplifier transfer: volts at the ADC pin per ampere of load.
const SHUNT_VOLTS_PER_AMP: f32 = 0.1;

/// Attenuation of the divider feeding the voltage sense input.
const VOLTAGE_DIVIDER_RATIO: f32 = 100.0;

/// Embassy ADC wrapper that produces one current/voltage pair per read.
pub struct AdcSampleSource<'d> {
    adc: Adc<'d, ADC1>,
    current_pin: Peri<'d, PA0>,
    voltage_pin: Peri<'d, PA1>,
}

impl<'d> AdcSampleSource<'d> {
    /// Constructs the source and configures a conservative sample time.
    pub fn new(
        mut adc: Adc<'d, ADC1>,
        current_pin: Peri<'d, PA0>,
        voltage_pin: Peri<'d, PA1>,
    ) -> Self {
        adc.set_sample_time(SampleTime::CYCLES160_5);
        Self {
            adc,
            current_pin,
            voltage_pin,
        }
    }

    fn counts_to_volts(reading: u16) -> f32 {
        f32::from(reading) * VREF_V / f32::from(FULL_SCALE)
    }
}

impl<'d> SampleSource for AdcSampleSource<'d> {
    fn acquire(&mut self) -> Result<Sample, AcquisitionError> {
        let raw_current = self.adc.blocking_read(&mut self.current_pin);
        let raw_voltage = self.adc.blocking_read(&mut self.voltage_pin);

        // A railed shunt reading means the front end is shorted or floating.
        if raw_current >= FULL_SCALE {
            return Err(AcquisitionError::SensorFault);
        }

        let current_a = Self::counts_to_volts(raw_current) / SHUNT_VOLTS_PER_AMP;
        let voltage_v = Self::counts_to_volts(raw_voltage) * VOLTAGE_DIVIDER_RATIO;
        Ok(Sample::new(current_a, voltage_v))
    }
}
