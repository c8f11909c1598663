use sfdelta_core::path::{
    META_SUFFIX, file_name, is_meta_file, join, parent, split_extension, strip_meta_suffix,
};
use sfdelta_metadata::MetadataTypeDescriptor;

use super::Target;
use crate::work::{Collaborators, Work};

/// File name without its sidecar suffix and extension.
pub(super) fn element_name(target: &Target<'_>) -> String {
    let name = strip_meta_suffix(file_name(target.path()));
    split_extension(name).0.to_owned()
}

/// Excluded types are only picked up through their sidecar file.
pub(super) fn is_processable(target: &Target<'_>) -> bool {
    !target.descriptor.excluded || is_meta_file(target.path())
}

pub(super) fn handle_addition(
    target: &Target<'_>,
    member: &str,
    work: &mut Work,
    with: &Collaborators<'_>,
) {
    work.to_add.add(target.xml_name(), member);
    if !work.config().generate_delta() {
        return;
    }

    let path = target.path();
    copy_with_meta_file(target.descriptor, path, work, with);
    if is_meta_file(path) {
        work.copy(with, strip_meta_suffix(path));
    }
}

pub(super) fn handle_deletion(target: &Target<'_>, member: &str, work: &mut Work) {
    work.to_destroy.add(target.xml_name(), member);
}

/// Copies `source` and, for types carrying sidecars, its `-meta.xml` file when
/// it exists at the target revision.
pub(super) fn copy_with_meta_file(
    descriptor: &MetadataTypeDescriptor,
    source: &str,
    work: &mut Work,
    with: &Collaborators<'_>,
) {
    work.copy(with, source);
    if descriptor.meta_file && !is_meta_file(source) {
        work.copy(with, &meta_file_path(descriptor, source));
    }
}

/// `classes/Foo.cls` -> `classes/Foo.cls-meta.xml`, using the type suffix so
/// that `documents/Shared/logo.png` maps to `documents/Shared/logo.document-meta.xml`.
pub(super) fn meta_file_path(descriptor: &MetadataTypeDescriptor, source: &str) -> String {
    match descriptor.suffix() {
        Some(suffix) => {
            let (stem, _) = split_extension(file_name(source));
            join(parent(source), &format!("{stem}.{suffix}{META_SUFFIX}"))
        }
        None => format!("{source}{META_SUFFIX}"),
    }
}
