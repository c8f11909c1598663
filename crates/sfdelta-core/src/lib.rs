mod change;
pub mod error;
mod manifest;
pub mod path;

pub use change::{ChangeKind, ChangeRecord};
pub use error::*;
pub use manifest::Manifest;
