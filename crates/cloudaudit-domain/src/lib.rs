//! Pure rule evaluation (no IO).
//!
//! Input: a populated result cache and an effective configuration.
//! Output: findings + verdict + summary data.

#![forbid(unsafe_code)]

pub mod arn;
pub mod cache;
pub mod driver;
pub mod payload;
pub mod policy;
pub mod registry;
pub mod report;
pub mod rule;
pub mod rules;
pub mod sink;

mod engine;
mod fingerprint;

pub use engine::{EngineError, Selection, evaluate};
pub use fingerprint::fingerprint_for_finding;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod proptest;
