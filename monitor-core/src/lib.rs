#![no_std]

// Shared logic for the energy monitoring node.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library: the firmware binds the traits declared here to
// real peripherals, while the emulator and the test suite drive the same
// logic with in-memory stand-ins.

pub mod boot;
pub mod config;
pub mod energy;
pub mod sampling;
pub mod store;
