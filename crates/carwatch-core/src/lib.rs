//! Shared types for the CARWatch log-processing pipeline.
//!
//! Defines the event data model, the study configuration, the error
//! taxonomy and timestamp helpers used by the `carwatch-data` crate.

pub mod error;
pub mod models;
pub mod study;
pub mod time_utils;
