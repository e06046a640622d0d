//! Storage and reporting engine for monthly utility-meter readings.
//!
//! The store is a single self-contained SQLite file holding metering
//! points, meters, and one reading per meter, tariff zone and month.
//! Consumption is derived from two consecutive readings with
//! digit-wheel rollover handling and a per-meter transformation ratio.
//! A two-state period pointer (`next_date` + advance-ready flag)
//! controls when the next month's readings may be entered and when the
//! billing period rolls forward.
//!
//! Front ends (interactive tables, template renderers) live outside
//! this crate and drive it through [`Store`]'s operations.

pub mod db;
pub mod domain;
pub mod error;
pub mod period;

pub use db::{Store, SCHEMA_VERSION};
pub use domain::{Meter, Report};
pub use error::StoreError;
pub use period::Period;
