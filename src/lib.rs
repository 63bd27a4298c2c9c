// Library interface for mailcompat
// The binary, benchmarks and integration tests all go through these modules

pub mod compat;
pub mod config;
pub mod document;
pub mod error;
