use sfdelta_core::path::{
    META_SUFFIX, file_name, join, parent, split_extension, strip_meta_suffix,
};
use tracing::debug;

use super::Target;
use crate::work::{Collaborators, Work};

const WEB_COMPONENT_TYPE: &str = "LightningComponentBundle";
const SCRIPT_EXTENSION: &str = "js";

fn base_name(segment: &str) -> &str {
    split_extension(strip_meta_suffix(segment)).0
}

/// Name of the bundle the changed file belongs to. Members of site-collection
/// types are named `<collection>/<site>`.
pub(super) fn element_name(target: &Target<'_>) -> String {
    let after = target.after_type();
    let first = after.first().map_or("", String::as_str);

    if target.site_collection {
        if let [collection, site, _, ..] = after {
            return format!("{}/{}", base_name(collection), base_name(site));
        }
    }

    let descriptor = target.descriptor;
    let named_by_file = !descriptor.excluded
        && descriptor.suffix().is_some()
        && target.extension() == descriptor.suffix();
    let segment = if named_by_file {
        file_name(target.path())
    } else {
        first
    };
    base_name(segment).to_owned()
}

/// Path of the bundle root, e.g. `force-app/main/default/lwc/myComponent`.
fn element_path(target: &Target<'_>) -> String {
    match target.after_type().first() {
        Some(first) => join(&target.type_root(), base_name(first)),
        None => target.type_root(),
    }
}

/// Directory copied when a file inside a bundle changes: the whole bundle, or
/// only the changed site of a site collection.
fn bundle_directory(target: &Target<'_>, element_path: &str) -> String {
    match target.after_type() {
        [_, site, _, ..] if target.site_collection => join(element_path, site),
        _ => element_path.to_owned(),
    }
}

fn meta_file_path(target: &Target<'_>, element_path: &str) -> Option<String> {
    if target.xml_name() == WEB_COMPONENT_TYPE {
        return (target.extension() == Some(SCRIPT_EXTENSION))
            .then(|| format!("{}{META_SUFFIX}", target.path()));
    }
    if target.site_collection {
        return None;
    }
    target
        .descriptor
        .suffix()
        .map(|suffix| format!("{element_path}.{suffix}{META_SUFFIX}"))
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

    let element_path = element_path(target);
    if target.path() != element_path && !target.parent_is_type_root() {
        work.copy(with, &bundle_directory(target, &element_path));
    }
    work.copy(with, target.path());
    if let Some(meta_file) = meta_file_path(target, &element_path) {
        work.copy(with, &meta_file);
    }
}

/// A file deleted from a bundle that still exists at the target revision
/// redeploys the bundle instead of destroying it.
pub(super) fn handle_deletion(
    target: &Target<'_>,
    member: &str,
    work: &mut Work,
    with: &Collaborators<'_>,
) {
    let probe = match target.after_type() {
        [collection, site, _, ..] if target.site_collection => {
            join(&join(&target.type_root(), collection), site)
        }
        [first, ..] => join(&target.type_root(), first),
        [] => target.type_root(),
    };

    let exists = with
        .git
        .path_exists_at(work.config().to_revision(), &probe)
        .unwrap_or_else(|error| {
            debug!(path = probe.as_str(), %error, "existence check failed");
            false
        });

    if exists {
        debug!(
            path = target.path(),
            bundle = probe.as_str(),
            "bundle still exists at target, redeployed"
        );
        handle_addition(target, member, work, with);
    } else if exists_ignoring_case(&probe, work, with) {
        // Renamed by case only; the new path deploys it.
        debug!(
            path = target.path(),
            bundle = probe.as_str(),
            "bundle survives under another case, kept"
        );
    } else {
        work.to_destroy.add(target.xml_name(), member);
    }
}

/// Whether a sibling of `path` at the target revision carries the same name
/// up to ASCII case.
fn exists_ignoring_case(path: &str, work: &Work, with: &Collaborators<'_>) -> bool {
    let directory = parent(path);
    let name = file_name(path);
    let files = match with
        .git
        .list_files_under(work.config().to_revision(), directory)
    {
        Ok(files) => files,
        Err(error) => {
            debug!(path = directory, %error, "failed to list directory");
            return false;
        }
    };

    files.iter().any(|file| {
        let relative = if directory.is_empty() {
            Some(file.as_str())
        } else {
            file.strip_prefix(directory)
                .and_then(|rest| rest.strip_prefix('/'))
        };
        relative
            .and_then(|rest| rest.split('/').next())
            .is_some_and(|segment| segment.eq_ignore_ascii_case(name))
    })
}
