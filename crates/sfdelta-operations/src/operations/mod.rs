mod delta;

pub use delta::{DeltaOperation, DeltaOutput};
