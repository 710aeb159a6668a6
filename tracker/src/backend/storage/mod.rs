//! # Storage Module
//!
//! Handles all data persistence for the attendance tracker: locating the
//! app's directories on the device and reading and writing the roster, log
//! and settings files. Domain services depend on the traits in [`traits`].

pub mod csv;
pub mod traits;

pub use traits::{AttendanceLogStorage, RosterStorage, SettingsStorage};
