use std::collections::BTreeMap;

/// A node in an element's ordered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }
}

/// An XML element with its attributes and ordered children.
///
/// `PartialEq` is strict document equality. Use [`Element::equivalent`] to
/// compare metadata content, where field order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Shorthand for a child element holding only text, e.g. `<field>Account.Name</field>`.
    #[must_use]
    pub fn with_leaf(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_child(Element::new(name).with_text(text))
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Child elements named `name`, in document order. A lone child yields a
    /// one-item sequence.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated direct text content, if any.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let mut texts = self.children.iter().filter_map(|node| match node {
            Node::Text(text) => Some(text.as_str()),
            Node::Element(_) => None,
        });
        let first = texts.next()?;
        Some(texts.fold(first.to_owned(), |mut acc, text| {
            acc.push_str(text);
            acc
        }))
    }

    /// Identifying value of this element: the text of its `key` child element,
    /// falling back to a `key` attribute.
    #[must_use]
    pub fn key_value(&self, key: &str) -> Option<String> {
        self.child(key)
            .and_then(Element::text)
            .or_else(|| self.attribute(key).map(str::to_owned))
    }

    /// Content equality ignoring attribute order and the order of differently
    /// named children. Children sharing a name are compared in sequence.
    #[must_use]
    pub fn equivalent(&self, other: &Element) -> bool {
        self.name == other.name
            && sorted_attributes(self) == sorted_attributes(other)
            && self.text() == other.text()
            && sequences_match(&children_by_name(self), &children_by_name(other))
    }

    #[must_use]
    pub fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Keeps the child elements for which `keep` returns `true`. Text nodes are kept.
    pub fn retain_elements<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Element) -> bool,
    {
        self.children.retain(|node| match node {
            Node::Element(element) => keep(element),
            Node::Text(_) => true,
        });
    }
}

fn sorted_attributes(element: &Element) -> Vec<(&str, &str)> {
    let mut attributes: Vec<_> = element
        .attributes
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    attributes.sort_unstable();
    attributes
}

fn children_by_name(element: &Element) -> BTreeMap<&str, Vec<&Element>> {
    let mut groups: BTreeMap<&str, Vec<&Element>> = BTreeMap::new();
    for child in element.elements() {
        groups.entry(child.name.as_str()).or_default().push(child);
    }
    groups
}

fn sequences_match(
    left: &BTreeMap<&str, Vec<&Element>>,
    right: &BTreeMap<&str, Vec<&Element>>,
) -> bool {
    left.len() == right.len()
        && left.iter().all(|(name, elements)| {
            right.get(name).is_some_and(|others| {
                elements.len() == others.len()
                    && elements
                        .iter()
                        .zip(others)
                        .all(|(element, other)| element.equivalent(other))
            })
        })
}

/// A parsed document. Empty content parses to a document without a root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    pub(crate) fn from_root(root: Option<Element>) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn new(root: Element) -> Self {
        Self { root: Some(root) }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.root.as_mut()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}
