//! Platform helpers for core-pinned execution.

pub mod task_pin;
