use std::error::Error;

use sfdelta_core::{ChangeKind, Manifest};
use sfdelta_metadata::MetadataTypeDescriptor;
use sfdelta_xml::Document;
use tracing::debug;

use super::Target;
use crate::DiffError;
use crate::work::{Collaborators, Work};

/// Compares the container between both revisions, registers the changed
/// sub-elements and writes the pruned document. The same flow serves every
/// change kind: a deleted file compares against an empty target.
pub(super) fn handle(
    target: &Target<'_>,
    member: &str,
    work: &mut Work,
    with: &Collaborators<'_>,
) {
    let path = target.path();
    let descriptor = target.descriptor;
    let from = work.config().from_revision().to_owned();
    let to = work.config().to_revision().to_owned();

    let documents = read_document(with, &from, path)
        .and_then(|from_document| Ok((from_document, read_document(with, &to, path)?)));
    let (from_document, to_document) = match documents {
        Ok(documents) => documents,
        Err(error) => {
            work.warn(format!("skipped '{path}': {}", describe(&*error)));
            return;
        }
    };

    let comparison = match with
        .differ
        .compare(&descriptor.children, &from_document, to_document)
    {
        Ok(comparison) => comparison,
        Err(error) => {
            work.warn(format!("could not compare '{path}': {}", describe(&error)));
            return;
        }
    };

    store(&mut work.to_add, comparison.added(), descriptor, member);
    store(&mut work.to_destroy, comparison.deleted(), descriptor, member);

    let pruned = comparison.prune();
    if !pruned.is_empty {
        if !descriptor.children_only {
            work.to_add.add(&descriptor.xml_name, member);
        }
        if work.config().generate_delta() {
            work.write(with, path, &pruned.content);
        }
    }

    if *target.record.kind() == ChangeKind::Deleted && !descriptor.children_only {
        let exists = with.git.path_exists_at(&to, path).unwrap_or_else(|error| {
            debug!(path, %error, "existence check failed");
            false
        });
        if !exists {
            work.to_destroy.add(&descriptor.xml_name, member);
        }
    }
}

fn read_document(
    with: &Collaborators<'_>,
    revision: &str,
    path: &str,
) -> Result<Document, Box<dyn Error + Send + Sync>> {
    let content = with.git.read_file_at(revision, path)?;
    Document::from_bytes(&content).map_err(|source| {
        DiffError::Xml {
            path: path.to_owned(),
            revision: revision.to_owned(),
            source,
        }
        .into()
    })
}

/// Sub-elements of a container deployable on their own are listed as
/// `<container>.<key>`; those of children-only types by their key alone.
fn store(
    manifest: &mut Manifest,
    deltas: &Manifest,
    descriptor: &MetadataTypeDescriptor,
    container: &str,
) {
    for (type_name, keys) in deltas.iter() {
        for key in keys {
            if descriptor.children_only {
                manifest.add(type_name, key.as_str());
            } else {
                manifest.add(type_name, format!("{container}.{key}"));
            }
        }
    }
}

fn describe(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
