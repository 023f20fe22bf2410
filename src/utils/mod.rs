// file: src/utils/mod.rs
// description: shared helpers for logging, retries, and input validation

pub mod logging;
pub mod retry;
pub mod validation;

pub use validation::Validator;
