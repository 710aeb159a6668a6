//! IO layer: the only part of the backend that sees the `shared` DTOs.

pub mod commands;
pub mod mappers;

pub use commands::{dispatch, UiCommand};
