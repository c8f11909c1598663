//! Turns one change record into manifest entries and output files.
//!
//! The factory resolves the metadata type of a changed path and picks one of a
//! closed family of handlers, each encoding an on-disk layout convention:
//!
//! * [`HandlerKind::Standard`]: one file per element with an optional
//!   `-meta.xml` sidecar.
//! * [`HandlerKind::Folder`]: elements filed in (nested) folders that carry
//!   their own descriptors.
//! * [`HandlerKind::Resource`]: elements made of a whole directory.
//! * [`HandlerKind::Container`]: one document bundling many sub-elements,
//!   compared at sub-element level.

mod container;
mod folder;
mod resource;
mod standard;

use sfdelta_core::path;
use sfdelta_core::{ChangeKind, ChangeRecord};
use sfdelta_metadata::{MetadataRegistry, MetadataTypeDescriptor};
use tracing::debug;

use crate::work::{Collaborators, Work};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Standard,
    Folder,
    Resource,
    Container,
}

impl HandlerKind {
    #[must_use]
    pub fn for_descriptor(descriptor: &MetadataTypeDescriptor) -> Self {
        if descriptor.is_container() {
            Self::Container
        } else if descriptor.is_bundle_type() {
            Self::Resource
        } else if descriptor.is_folder_type() {
            Self::Folder
        } else {
            Self::Standard
        }
    }
}

/// A change record bound to the type it resolved to.
#[derive(Debug, Clone)]
pub(crate) struct Target<'a> {
    record: ChangeRecord,
    descriptor: &'a MetadataTypeDescriptor,
    /// Position of the type directory within the path segments.
    type_index: usize,
    site_collection: bool,
}

impl Target<'_> {
    fn path(&self) -> &str {
        self.record.path()
    }

    fn segments(&self) -> &[String] {
        self.record.segments()
    }

    /// Path of the type directory, e.g. `force-app/main/default/classes`.
    fn type_root(&self) -> String {
        self.segments()[..=self.type_index].join("/")
    }

    /// Segments below the type directory.
    fn after_type(&self) -> &[String] {
        &self.segments()[self.type_index + 1..]
    }

    fn parent_is_type_root(&self) -> bool {
        self.after_type().len() <= 1
    }

    fn extension(&self) -> Option<&str> {
        path::extension(self.path())
    }

    fn xml_name(&self) -> &str {
        &self.descriptor.xml_name
    }
}

/// Handler for one change record.
#[derive(Debug, Clone)]
pub struct Handler<'a> {
    kind: HandlerKind,
    target: Target<'a>,
}

impl Handler<'_> {
    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    #[must_use]
    pub fn record(&self) -> &ChangeRecord {
        &self.target.record
    }

    #[must_use]
    pub fn xml_name(&self) -> &str {
        self.target.xml_name()
    }

    /// Member name of the element under its type.
    #[must_use]
    pub fn element_name(&self) -> String {
        match self.kind {
            HandlerKind::Standard | HandlerKind::Container => standard::element_name(&self.target),
            HandlerKind::Folder => folder::element_name(&self.target),
            HandlerKind::Resource => resource::element_name(&self.target),
        }
    }

    #[must_use]
    pub fn is_processable(&self) -> bool {
        match self.kind {
            HandlerKind::Standard | HandlerKind::Container => {
                standard::is_processable(&self.target)
            }
            HandlerKind::Folder => folder::is_processable(&self.target),
            HandlerKind::Resource => true,
        }
    }

    /// Applies the record to `work` according to its change kind.
    pub fn handle(&self, work: &mut Work, with: &Collaborators<'_>) {
        if !self.is_processable() {
            debug!(path = self.target.path(), "not processable, skipped");
            return;
        }
        match self.target.record.kind() {
            // `Renamed` never gets here: the factory splits renames first.
            ChangeKind::Added | ChangeKind::Renamed(_) => self.handle_addition(work, with),
            ChangeKind::Modified => self.handle_modification(work, with),
            ChangeKind::Deleted => self.handle_deletion(work, with),
        }
    }

    pub fn handle_addition(&self, work: &mut Work, with: &Collaborators<'_>) {
        let member = self.element_name();
        match self.kind {
            HandlerKind::Standard => standard::handle_addition(&self.target, &member, work, with),
            HandlerKind::Folder => folder::handle_addition(&self.target, &member, work, with),
            HandlerKind::Resource => resource::handle_addition(&self.target, &member, work, with),
            HandlerKind::Container => container::handle(&self.target, &member, work, with),
        }
    }

    pub fn handle_modification(&self, work: &mut Work, with: &Collaborators<'_>) {
        self.handle_addition(work, with);
    }

    pub fn handle_deletion(&self, work: &mut Work, with: &Collaborators<'_>) {
        let member = self.element_name();
        match self.kind {
            HandlerKind::Standard => standard::handle_deletion(&self.target, &member, work),
            HandlerKind::Folder => folder::handle_deletion(&self.target, &member, work, with),
            HandlerKind::Resource => resource::handle_deletion(&self.target, &member, work, with),
            HandlerKind::Container => container::handle(&self.target, &member, work, with),
        }
    }
}

/// Resolves change records to handlers.
pub struct HandlerFactory<'a> {
    registry: &'a MetadataRegistry,
    site_collection_types: &'a [String],
}

impl<'a> HandlerFactory<'a> {
    #[must_use]
    pub fn new(registry: &'a MetadataRegistry, site_collection_types: &'a [String]) -> Self {
        Self {
            registry,
            site_collection_types,
        }
    }

    /// Returns `None` when the path belongs to no known type. Handlers are
    /// only built from decomposed records, so none ever sees a rename.
    fn handler_for(&self, record: ChangeRecord) -> Option<Handler<'a>> {
        let descriptor = self.registry.resolve(record.segments())?;
        let (_, directories) = record.segments().split_last()?;
        let type_index = directories
            .iter()
            .position(|segment| *segment == descriptor.directory_name)?;
        let site_collection = self
            .site_collection_types
            .iter()
            .any(|name| *name == descriptor.xml_name);

        Some(Handler {
            kind: HandlerKind::for_descriptor(descriptor),
            target: Target {
                record,
                descriptor,
                type_index,
                site_collection,
            },
        })
    }

    /// Processes one change record. Renames are handled as the deletion of
    /// the old path followed by the addition of the new one.
    pub fn handle(&self, record: &ChangeRecord, work: &mut Work, with: &Collaborators<'_>) {
        for part in record.decompose() {
            let path = part.path().to_owned();
            let path = path.as_str();
            let config = work.config();
            if !config.is_in_source(path) {
                debug!(path, "outside source directories, skipped");
                continue;
            }
            if config.ignore().is_ignored(path) {
                debug!(path, "ignored");
                continue;
            }
            if *part.kind() == ChangeKind::Deleted && config.ignore().is_ignored_for_deletion(path)
            {
                debug!(path, "deletion ignored");
                continue;
            }

            match self.handler_for(part) {
                Some(handler) => {
                    debug!(
                        path = handler.record().path(),
                        xml_name = handler.xml_name(),
                        kind = ?handler.kind(),
                        "handling change"
                    );
                    handler.handle(work, with);
                }
                None => debug!(path, "no metadata type, skipped"),
            }
        }
    }
}

#[cfg(test)]
mod tests;
