//! Helpers for repository-relative paths.
//!
//! Paths handled by sfdelta are always repository-relative and use `/` as the
//! separator, matching what git reports regardless of platform.

pub const PATH_SEP: char = '/';

/// Suffix carried by sidecar descriptor files (`Foo.cls-meta.xml`).
pub const META_SUFFIX: &str = "-meta.xml";

/// Marker ending the name of folder descriptors (`MyFolder.reportFolder-meta.xml`).
pub const FOLDER_MARKER: &str = "Folder";

#[must_use]
pub fn normalize(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    path.strip_prefix("./").map_or(path.clone(), str::to_owned)
}

#[must_use]
pub fn split_segments(path: &str) -> Vec<String> {
    path.split(PATH_SEP)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

#[must_use]
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_owned()
    } else {
        format!("{}{PATH_SEP}{child}", parent.trim_end_matches(PATH_SEP))
    }
}

#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit(PATH_SEP).next().unwrap_or(path)
}

/// Returns the directory part of `path`, or an empty string for top-level entries.
#[must_use]
pub fn parent(path: &str) -> &str {
    path.rfind(PATH_SEP).map_or("", |idx| &path[..idx])
}

#[must_use]
pub fn is_meta_file(path: &str) -> bool {
    path.ends_with(META_SUFFIX)
}

#[must_use]
pub fn strip_meta_suffix(name: &str) -> &str {
    name.strip_suffix(META_SUFFIX).unwrap_or(name)
}

/// Splits a file name into stem and extension on the last dot.
///
/// A leading dot does not start an extension, so `.forceignore` has no extension.
#[must_use]
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Extension of the file at `path`, ignoring a sidecar `-meta.xml` suffix.
#[must_use]
pub fn extension(path: &str) -> Option<&str> {
    split_extension(strip_meta_suffix(file_name(path))).1
}
