//! Sub-element level comparison of container documents.
//!
//! A container file such as a permission set or a label file bundles many
//! named sub-elements. Comparing the file at both revisions yields the
//! sub-elements that were added or changed, the ones that were deleted, and a
//! pruned copy of the target document holding only the former.
//!
//! Sub-element tags are evaluated in batches on a bounded worker pool. Workers
//! share the two parsed trees read-only and return plain delta lists that are
//! folded into manifests, so the result does not depend on batch size or
//! scheduling.

use std::collections::HashMap;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use sfdelta_core::Manifest;
use sfdelta_metadata::SubElementDefinition;
use sfdelta_xml::{Document, Element};
use tracing::debug;

use crate::DiffError;
use crate::config::DiffSettings;

/// Selects which side of a comparison a worker reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Elements of the target with no counterpart in the source, or whose
    /// counterpart differs.
    Added,
    /// Elements of the source whose key no longer exists in the target.
    Deleted,
}

impl Predicate {
    fn holds(self, element: &Element, counterpart: Option<&Element>) -> bool {
        match self {
            Self::Added => counterpart.is_none_or(|other| !other.equivalent(element)),
            Self::Deleted => counterpart.is_none(),
        }
    }
}

/// One changed sub-element, before it is qualified into a manifest member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubElementDelta {
    pub type_xml_name: String,
    pub member_key: String,
}

/// Runs container comparisons on a dedicated worker pool.
pub struct ContentDiff {
    pool: ThreadPool,
    batch_size: usize,
}

impl ContentDiff {
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot be started.
    pub fn new(settings: DiffSettings) -> Result<Self, DiffError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.max_workers())
            .thread_name(|i| format!("sfdelta-diff-{i}"))
            .build()?;
        Ok(Self {
            pool,
            batch_size: settings.batch_size(),
        })
    }

    /// Compares a container document between two revisions.
    ///
    /// # Errors
    ///
    /// Returns an error if a sub-element lacks its identifying key.
    pub fn compare<'d>(
        &self,
        definitions: &'d [SubElementDefinition],
        from: &Document,
        to: Document,
    ) -> Result<Comparison<'d>, DiffError> {
        let added = self.fan_out(definitions, &to, from, Predicate::Added)?;
        let deleted = self.fan_out(definitions, from, &to, Predicate::Deleted)?;
        debug!(
            added = added.len(),
            deleted = deleted.len(),
            "compared container document"
        );

        Ok(Comparison {
            definitions,
            to,
            added,
            deleted,
        })
    }

    fn fan_out(
        &self,
        definitions: &[SubElementDefinition],
        primary: &Document,
        other: &Document,
        predicate: Predicate,
    ) -> Result<Manifest, DiffError> {
        let Some(primary) = primary.root() else {
            return Ok(Manifest::new());
        };
        let other = other.root();
        let tags = sub_element_tags(primary, definitions);

        let batches = self.pool.install(|| {
            tags.par_chunks(self.batch_size)
                .map(|batch| compare_batch(primary, other, batch, predicate))
                .collect::<Result<Vec<_>, DiffError>>()
        })?;

        Ok(batches
            .into_iter()
            .flatten()
            .map(|delta| (delta.type_xml_name, delta.member_key))
            .collect())
    }
}

/// Evaluates `predicate` for every element of the given tags under `primary`.
///
/// # Errors
///
/// Returns an error if an element of `primary` has no value for its tag's key.
pub fn compare_batch(
    primary: &Element,
    other: Option<&Element>,
    batch: &[&SubElementDefinition],
    predicate: Predicate,
) -> Result<Vec<SubElementDelta>, DiffError> {
    let mut deltas = Vec::new();

    for definition in batch {
        let mut counterparts: HashMap<String, &Element> = HashMap::new();
        for element in other
            .into_iter()
            .flat_map(|root| root.elements_named(&definition.tag))
        {
            if let Some(key) = element.key_value(&definition.key_attribute) {
                counterparts.entry(key).or_insert(element);
            }
        }

        for element in primary.elements_named(&definition.tag) {
            let key = element
                .key_value(&definition.key_attribute)
                .ok_or_else(|| DiffError::MissingKey {
                    tag: definition.tag.clone(),
                    key: definition.key_attribute.clone(),
                })?;
            if predicate.holds(element, counterparts.get(&key).copied()) {
                deltas.push(SubElementDelta {
                    type_xml_name: definition.xml_name.clone(),
                    member_key: key,
                });
            }
        }
    }

    Ok(deltas)
}

/// Declared sub-element tags present under `root`, in document order.
fn sub_element_tags<'d>(
    root: &Element,
    definitions: &'d [SubElementDefinition],
) -> Vec<&'d SubElementDefinition> {
    let mut tags: Vec<&SubElementDefinition> = Vec::new();
    for element in root.elements() {
        let Some(definition) = definitions.iter().find(|d| d.tag == element.name) else {
            continue;
        };
        if !tags.iter().any(|tag| tag.tag == definition.tag) {
            tags.push(definition);
        }
    }
    tags
}

/// Result of comparing one container document.
#[derive(Debug)]
pub struct Comparison<'d> {
    definitions: &'d [SubElementDefinition],
    to: Document,
    added: Manifest,
    deleted: Manifest,
}

/// Target document reduced to its changed sub-elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedDocument {
    pub document: Document,
    pub content: String,
    /// No element is left under the root.
    pub is_empty: bool,
}

impl Comparison<'_> {
    /// Added or changed sub-element keys, by sub-element type.
    #[must_use]
    pub fn added(&self) -> &Manifest {
        &self.added
    }

    /// Deleted sub-element keys, by sub-element type.
    #[must_use]
    pub fn deleted(&self) -> &Manifest {
        &self.deleted
    }

    /// Copies the target document keeping, for every declared tag, only the
    /// elements reported as added. Other elements are kept as they are.
    #[must_use]
    pub fn prune(&self) -> PrunedDocument {
        let mut document = self.to.clone();
        if let Some(root) = document.root_mut() {
            root.retain_elements(|element| {
                match self.definitions.iter().find(|d| d.tag == element.name) {
                    Some(definition) => element
                        .key_value(&definition.key_attribute)
                        .is_some_and(|key| self.added.contains(&definition.xml_name, &key)),
                    None => true,
                }
            });
        }

        let is_empty = document.root().is_none_or(|root| !root.has_elements());
        let content = without_blank_lines(&document.to_xml_string());
        PrunedDocument {
            document,
            content,
            is_empty,
        }
    }
}

fn without_blank_lines(xml: &str) -> String {
    let mut content = String::with_capacity(xml.len());
    for line in xml.lines().filter(|line| !line.trim().is_empty()) {
        content.push_str(line);
        content.push('\n');
    }
    content
}
