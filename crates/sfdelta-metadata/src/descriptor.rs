use serde::{Deserialize, Serialize};

/// A named sub-element that a container document declares, e.g. the `labels`
/// entries of a `CustomLabels` file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubElementDefinition {
    /// Element tag under the document root.
    pub tag: String,
    /// Type name the sub-element is listed under in a package manifest.
    pub xml_name: String,
    /// Child element whose text identifies one sub-element.
    pub key_attribute: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataTypeDescriptor {
    pub xml_name: String,
    pub directory_name: String,
    #[serde(default)]
    pub suffix: Option<String>,
    /// Elements of this type carry a `-meta.xml` sidecar next to their content file.
    #[serde(default)]
    pub meta_file: bool,
    #[serde(default, rename = "inFolder")]
    pub folder_type: bool,
    #[serde(default, rename = "bundle")]
    pub bundle_type: bool,
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub children: Vec<SubElementDefinition>,
    /// Only the sub-elements are deployable; the container itself never enters a manifest.
    #[serde(default)]
    pub children_only: bool,
}

impl MetadataTypeDescriptor {
    #[must_use]
    pub fn new(xml_name: impl Into<String>, directory_name: impl Into<String>) -> Self {
        Self {
            xml_name: xml_name.into(),
            directory_name: directory_name.into(),
            suffix: None,
            meta_file: false,
            folder_type: false,
            bundle_type: false,
            excluded: false,
            children: Vec::new(),
            children_only: false,
        }
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    #[must_use]
    pub fn with_meta_file(mut self) -> Self {
        self.meta_file = true;
        self
    }

    #[must_use]
    pub fn folder(mut self) -> Self {
        self.folder_type = true;
        self
    }

    #[must_use]
    pub fn bundle(mut self) -> Self {
        self.bundle_type = true;
        self
    }

    #[must_use]
    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    #[must_use]
    pub fn with_child(
        mut self,
        tag: impl Into<String>,
        xml_name: impl Into<String>,
        key_attribute: impl Into<String>,
    ) -> Self {
        self.children.push(SubElementDefinition {
            tag: tag.into(),
            xml_name: xml_name.into(),
            key_attribute: key_attribute.into(),
        });
        self
    }

    #[must_use]
    pub fn children_only(mut self) -> Self {
        self.children_only = true;
        self
    }

    #[must_use]
    pub fn is_folder_type(&self) -> bool {
        self.folder_type
    }

    #[must_use]
    pub fn is_bundle_type(&self) -> bool {
        self.bundle_type
    }

    /// Container documents bundle many independently deployable sub-elements.
    #[must_use]
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    #[must_use]
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    #[must_use]
    pub fn child(&self, tag: &str) -> Option<&SubElementDefinition> {
        self.children.iter().find(|child| child.tag == tag)
    }
}
