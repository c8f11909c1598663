use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Metadata type name mapped to its member names.
///
/// Both levels are ordered so serialized manifests are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    types: BTreeMap<String, BTreeSet<String>>,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the member was not present yet.
    pub fn add(&mut self, type_name: impl Into<String>, member: impl Into<String>) -> bool {
        self.types
            .entry(type_name.into())
            .or_default()
            .insert(member.into())
    }

    pub fn remove(&mut self, type_name: &str, member: &str) -> bool {
        let Some(members) = self.types.get_mut(type_name) else {
            return false;
        };
        let removed = members.remove(member);
        if members.is_empty() {
            self.types.remove(type_name);
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, type_name: &str, member: &str) -> bool {
        self.types
            .get(type_name)
            .is_some_and(|members| members.contains(member))
    }

    #[must_use]
    pub fn members(&self, type_name: &str) -> Option<&BTreeSet<String>> {
        self.types.get(type_name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Total number of members across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.types
            .iter()
            .map(|(type_name, members)| (type_name.as_str(), members))
    }

    /// Folds every member of `other` into `self`.
    pub fn merge(&mut self, other: Manifest) {
        for (type_name, members) in other.types {
            self.types.entry(type_name).or_default().extend(members);
        }
    }

    /// Drops every member that `other` also lists under the same type.
    ///
    /// Member names compare ignoring ASCII case, since the org treats
    /// `Foo` and `foo` as one component.
    pub fn subtract(&mut self, other: &Manifest) {
        for (type_name, members) in &other.types {
            let Some(own) = self.types.get_mut(type_name) else {
                continue;
            };
            own.retain(|member| {
                !members
                    .iter()
                    .any(|other| other.eq_ignore_ascii_case(member))
            });
            if own.is_empty() {
                self.types.remove(type_name);
            }
        }
    }
}

impl<T, M> FromIterator<(T, M)> for Manifest
where
    T: Into<String>,
    M: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, M)>>(iter: I) -> Self {
        let mut manifest = Self::new();
        for (type_name, member) in iter {
            manifest.add(type_name, member);
        }
        manifest
    }
}
