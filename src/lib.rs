//! follow-api - lets users follow taxonomies (authors) for email alerts.
//!
//! This crate provides:
//! - Follow / unfollow / unfollow-all of taxonomies at immediate or daily frequency
//! - Reverse lookup of the users following a taxonomy, for alert fan-out
//! - Health checks for the alert workers and the mailer

pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod repository;
pub mod server;
pub mod service;
pub mod task;
pub mod upstream;
