//! Utilities shared by the keyrace packages.

pub mod logger;
pub mod time;
