use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML")]
    Syntax(#[from] quick_xml::Error),

    #[error("malformed XML attribute")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("document content is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("closing tag without a matching opening tag")]
    UnexpectedEnd,

    #[error("element '{name}' is never closed")]
    UnclosedElement { name: String },

    #[error("document has more than one root element")]
    MultipleRoots,
}
