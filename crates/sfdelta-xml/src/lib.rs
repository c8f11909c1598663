mod error;
mod parse;
mod serialize;
mod tree;

pub use error::XmlError;
pub use tree::{Document, Element, Node};

pub type Result<T> = std::result::Result<T, XmlError>;
