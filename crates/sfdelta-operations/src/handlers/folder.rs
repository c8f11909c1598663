use sfdelta_core::path::{
    FOLDER_MARKER, META_SUFFIX, file_name, join, parent, split_extension, strip_meta_suffix,
};
use tracing::debug;

use super::{Target, standard};
use crate::work::{Collaborators, Work};

/// Folder-qualified name, e.g. `MyFolder/Sub/MyReport`. Folder descriptors
/// such as `MyFolder.reportFolder-meta.xml` name the folder itself.
pub(super) fn element_name(target: &Target<'_>) -> String {
    let joined = target.after_type().join("/");
    let name = strip_meta_suffix(&joined);
    let name = name.strip_suffix(FOLDER_MARKER).unwrap_or(name);
    strip_extension(name).to_owned()
}

fn strip_extension(path: &str) -> &str {
    match split_extension(file_name(path)) {
        (_, Some(extension)) => &path[..path.len() - extension.len() - 1],
        (_, None) => path,
    }
}

pub(super) fn is_processable(target: &Target<'_>) -> bool {
    standard::is_processable(target)
        || !target.parent_is_type_root()
        || target
            .extension()
            .is_some_and(|extension| extension.ends_with(FOLDER_MARKER))
}

pub(super) fn handle_addition(
    target: &Target<'_>,
    member: &str,
    work: &mut Work,
    with: &Collaborators<'_>,
) {
    standard::handle_addition(target, member, work, with);
    if !work.config().generate_delta() {
        return;
    }
    copy_folder_meta_files(target, work, with);
    copy_special_extensions(target, work, with);
}

/// Registers the deletion unless the element still exists at the target
/// revision, in which case it is deployed again instead.
pub(super) fn handle_deletion(
    target: &Target<'_>,
    member: &str,
    work: &mut Work,
    with: &Collaborators<'_>,
) {
    let files = directory_files(target, work, with);
    let prefix = element_prefix(target);
    if files.iter().any(|file| file_name(file).starts_with(&prefix)) {
        debug!(path = target.path(), "element still exists at target, redeployed");
        handle_addition(target, member, work, with);
    } else if files
        .iter()
        .any(|file| starts_with_ignoring_case(file_name(file), &prefix))
    {
        // Renamed by case only; the new path deploys it.
        debug!(path = target.path(), "element survives under another case, kept");
    } else {
        standard::handle_deletion(target, member, work);
    }
}

/// Copies the descriptor of every folder between the type root and the
/// changed file.
fn copy_folder_meta_files(target: &Target<'_>, work: &mut Work, with: &Collaborators<'_>) {
    let Some((_, folders)) = target.after_type().split_last() else {
        return;
    };
    let mut folder_path = target.type_root();
    for folder in folders {
        copy_folder_meta_file(target, &folder_path, folder, work, with);
        folder_path = join(&folder_path, folder);
    }
}

fn copy_folder_meta_file(
    target: &Target<'_>,
    folder_path: &str,
    folder_name: &str,
    work: &mut Work,
    with: &Collaborators<'_>,
) {
    let suffix = target
        .descriptor
        .suffix()
        .unwrap_or_default()
        .to_lowercase();

    let descriptor = if folder_name.ends_with(FOLDER_MARKER) {
        format!("{folder_name}{META_SUFFIX}")
    } else {
        format!("{folder_name}.{suffix}{META_SUFFIX}")
    };
    standard::copy_with_meta_file(target.descriptor, &join(folder_path, &descriptor), work, with);

    let folder_suffix = format!(".{suffix}{FOLDER_MARKER}");
    let descriptor = if folder_name.ends_with(&folder_suffix) {
        format!("{folder_name}{META_SUFFIX}")
    } else {
        format!("{folder_name}{folder_suffix}{META_SUFFIX}")
    };
    standard::copy_with_meta_file(target.descriptor, &join(folder_path, &descriptor), work, with);
}

/// Copies the files next to the changed one that share its base name, such as
/// the content file of an email template.
fn copy_special_extensions(target: &Target<'_>, work: &mut Work, with: &Collaborators<'_>) {
    for file in element_files(target, work, with) {
        standard::copy_with_meta_file(target.descriptor, &file, work, with);
    }
}

/// Files in the changed file's directory at the target revision sharing its
/// base name.
fn element_files(target: &Target<'_>, work: &Work, with: &Collaborators<'_>) -> Vec<String> {
    let prefix = element_prefix(target);
    directory_files(target, work, with)
        .into_iter()
        .filter(|file| file_name(file).starts_with(&prefix))
        .collect()
}

fn element_prefix(target: &Target<'_>) -> String {
    let stem = split_extension(strip_meta_suffix(file_name(target.path()))).0;
    format!("{stem}.")
}

fn starts_with_ignoring_case(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Files directly inside the changed file's directory at the target revision.
fn directory_files(target: &Target<'_>, work: &Work, with: &Collaborators<'_>) -> Vec<String> {
    let directory = parent(target.path());
    match with
        .git
        .list_files_under(work.config().to_revision(), directory)
    {
        Ok(files) => files
            .into_iter()
            .filter(|file| parent(file) == directory)
            .collect(),
        Err(error) => {
            debug!(path = directory, %error, "failed to list directory");
            Vec::new()
        }
    }
}
