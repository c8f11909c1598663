pub mod config;
mod error;
pub mod handlers;
pub mod metadata_diff;
pub mod operations;
pub mod package;
pub mod providers;
pub mod traits;
pub mod work;

#[cfg(test)]
pub mod mocks;

pub use error::{DiffError, OperationError, Result};
