mod descriptor;
mod error;
mod registry;

pub use descriptor::{MetadataTypeDescriptor, SubElementDefinition};
pub use error::RegistryError;
pub use registry::MetadataRegistry;

pub type Result<T> = std::result::Result<T, RegistryError>;
