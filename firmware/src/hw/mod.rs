//! Hardware bindings for the STM32G0 sensor front end.

#![cfg(target_os = "none")]

pub mod sensor;
