//! Data models

pub mod employee;
pub mod prediction;

#[cfg(test)]
pub(crate) mod fixtures;

pub use employee::*;
pub use prediction::*;
