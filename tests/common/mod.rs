//! Common test utilities for moneyball-pipeline integration tests

#[allow(dead_code)]
pub mod engines;
#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use engines::*;
#[allow(unused_imports)]
pub use fixtures::*;
