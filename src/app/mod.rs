//! Application core: the device registry, zero I/O.
//!
//! This module contains the registry rules: pool setup, the add / clear
//! lifecycle, index validation and the power-saving broadcast. All
//! interaction with devices, the host protocol and the platform happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
