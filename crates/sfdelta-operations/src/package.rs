//! Deployment manifests in the `package.xml` format.

use sfdelta_core::Manifest;
use sfdelta_xml::{Document, Element};

pub const PACKAGE_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

pub const PACKAGE_FILE: &str = "package/package.xml";
pub const DESTRUCTIVE_CHANGES_FILE: &str = "destructiveChanges/destructiveChanges.xml";
/// The deployment tooling requires a `package.xml` next to the destructive
/// manifest, listing nothing.
pub const DESTRUCTIVE_PACKAGE_FILE: &str = "destructiveChanges/package.xml";

/// Renders `manifest` with types and members in lexicographic order.
#[must_use]
pub fn package_xml(manifest: &Manifest, api_version: &str) -> String {
    let mut package = Element::new("Package").with_attribute("xmlns", PACKAGE_NAMESPACE);
    for (type_name, members) in manifest.iter() {
        let types = members
            .iter()
            .fold(Element::new("types"), |types, member| {
                types.with_leaf("members", member.as_str())
            })
            .with_leaf("name", type_name);
        package = package.with_child(types);
    }
    package = package.with_leaf("version", api_version);

    Document::new(package).to_xml_string()
}

/// A manifest listing no members.
#[must_use]
pub fn empty_package_xml(api_version: &str) -> String {
    package_xml(&Manifest::new(), api_version)
}
