use std::collections::HashMap;
use std::path::Path;

use sfdelta_core::path::extension;

use crate::descriptor::MetadataTypeDescriptor;
use crate::error::RegistryError;
use crate::Result;

const BUILTIN_REGISTRY: &str = include_str!("../metadata/default.json");

/// Read-only lookup from directory names and file suffixes to type descriptors.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    types: Vec<MetadataTypeDescriptor>,
    by_directory: HashMap<String, usize>,
    by_suffix: HashMap<String, usize>,
    by_xml_name: HashMap<String, usize>,
}

impl MetadataRegistry {
    /// # Errors
    ///
    /// Returns an error if two descriptors claim the same directory or suffix.
    pub fn new(types: Vec<MetadataTypeDescriptor>) -> Result<Self> {
        let mut registry = Self::default();
        for descriptor in types {
            registry.insert(descriptor)?;
        }
        Ok(registry)
    }

    /// The registry shipped with sfdelta.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded definitions are malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_REGISTRY, "built-in registry")
    }

    /// # Errors
    ///
    /// Returns [`RegistryError::Parse`] if `content` is not a JSON array of descriptors.
    pub fn from_json(content: &str, origin: &str) -> Result<Self> {
        let types = parse_types(content, origin)?;
        Self::new(types)
    }

    /// Loads descriptors from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let types = read_types(path)?;
        Self::new(types)
    }

    /// Layers descriptors from a JSON file on top of this registry. A descriptor
    /// with an existing `xmlName` replaces the previous definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the merged
    /// registry has conflicting directories or suffixes.
    pub fn with_overrides_from(self, path: &Path) -> Result<Self> {
        let overrides = read_types(path)?;
        self.with_overrides(overrides)
    }

    /// # Errors
    ///
    /// Returns an error if the merged registry has conflicting directories or suffixes.
    pub fn with_overrides(self, overrides: Vec<MetadataTypeDescriptor>) -> Result<Self> {
        let mut types = self.types;
        for descriptor in overrides {
            match types.iter_mut().find(|t| t.xml_name == descriptor.xml_name) {
                Some(existing) => *existing = descriptor,
                None => types.push(descriptor),
            }
        }
        Self::new(types)
    }

    fn insert(&mut self, descriptor: MetadataTypeDescriptor) -> Result<()> {
        let index = self.types.len();

        if let Some(&existing) = self.by_directory.get(&descriptor.directory_name) {
            return Err(RegistryError::DuplicateDirectory {
                directory: descriptor.directory_name,
                first: self.types[existing].xml_name.clone(),
                second: descriptor.xml_name,
            });
        }

        if let Some(suffix) = descriptor.suffix() {
            if let Some(&existing) = self.by_suffix.get(suffix) {
                return Err(RegistryError::DuplicateSuffix {
                    suffix: suffix.to_owned(),
                    first: self.types[existing].xml_name.clone(),
                    second: descriptor.xml_name.clone(),
                });
            }
            self.by_suffix.insert(suffix.to_owned(), index);
        }

        self.by_directory
            .insert(descriptor.directory_name.clone(), index);
        self.by_xml_name.insert(descriptor.xml_name.clone(), index);
        self.types.push(descriptor);
        Ok(())
    }

    #[must_use]
    pub fn by_directory(&self, directory: &str) -> Option<&MetadataTypeDescriptor> {
        self.by_directory.get(directory).map(|&i| &self.types[i])
    }

    #[must_use]
    pub fn by_suffix(&self, suffix: &str) -> Option<&MetadataTypeDescriptor> {
        self.by_suffix.get(suffix).map(|&i| &self.types[i])
    }

    #[must_use]
    pub fn by_xml_name(&self, xml_name: &str) -> Option<&MetadataTypeDescriptor> {
        self.by_xml_name.get(xml_name).map(|&i| &self.types[i])
    }

    #[must_use]
    pub fn is_type_directory(&self, directory: &str) -> bool {
        self.by_directory.contains_key(directory)
    }

    /// Resolves the type a repository path belongs to.
    ///
    /// The first directory segment naming a known type wins when that type is a
    /// bundle, since every file below a bundle directory belongs to the bundle
    /// whatever its extension. Otherwise the file suffix is tried first and the
    /// directory match is the fallback. A suffix only matches below its type's
    /// directory, so a stray `README.md` is not taken for custom metadata.
    #[must_use]
    pub fn resolve(&self, segments: &[String]) -> Option<&MetadataTypeDescriptor> {
        let (file, directories) = segments.split_last()?;

        let by_directory = directories.iter().find_map(|dir| self.by_directory(dir));
        if let Some(descriptor) = by_directory {
            if descriptor.is_bundle_type() {
                return Some(descriptor);
            }
        }

        extension(file)
            .and_then(|ext| self.by_suffix(ext))
            .filter(|descriptor| {
                directories
                    .iter()
                    .any(|dir| *dir == descriptor.directory_name)
            })
            .or(by_directory)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataTypeDescriptor> {
        self.types.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn parse_types(content: &str, origin: &str) -> Result<Vec<MetadataTypeDescriptor>> {
    serde_json::from_str(content).map_err(|source| RegistryError::Parse {
        origin: origin.to_owned(),
        source,
    })
}

fn read_types(path: &Path) -> Result<Vec<MetadataTypeDescriptor>> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_types(&content, &format!("'{}'", path.display()))
}
