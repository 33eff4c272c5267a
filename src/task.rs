//! Background tasks.

pub mod health_monitor;
