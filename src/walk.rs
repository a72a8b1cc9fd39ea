// Copyright 2024 - 2026 Martin Pool

//! Enumerate the files of a root directory the way MATLAB's path machinery
//! sees them.
//!
//! For one root, the walk emits:
//!
//! - every `*.m` file except `Contents.m`,
//! - every `+namespace` and `@class` directory, whose contents are always
//!   entered regardless of the recursion flag,
//! - nothing from `private` directories, which MATLAB scopes to their
//!   parent.
//!
//! Plain subdirectories are entered only when recursion is requested, and
//! never from inside a namespace or class directory. Traversal order is
//! lexicographic by file name, so `members` insertion order is stable
//! across platforms.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;
use walkdir::WalkDir;

pub(crate) const MFILE_EXTENSION: &str = "m";
pub(crate) const CONTENTS_FILE: &str = "Contents.m";
pub(crate) const NAMESPACE_PREFIX: char = '+';
pub(crate) const CLASSFOLDER_PREFIX: char = '@';
pub(crate) const PRIVATE_FOLDER: &str = "private";

/// True for `+namespace` and `@class` directory names.
pub(crate) fn is_special_dir_name(name: &str) -> bool {
    name.starts_with(NAMESPACE_PREFIX) || name.starts_with(CLASSFOLDER_PREFIX)
}

/// True when any directory between `root` and `path` (exclusive) is a
/// namespace or class directory.
fn under_special_dir(root: &Utf8Path, path: &std::path::Path) -> bool {
    path.parent()
        .and_then(|parent| parent.strip_prefix(root.as_std_path()).ok())
        .is_some_and(|relative| {
            relative
                .components()
                .any(|c| is_special_dir_name(&c.as_os_str().to_string_lossy()))
        })
}

/// Walk `root` and return the MATLAB-visible paths under it.
pub(crate) fn walk(root: &Utf8Path, recursive: bool) -> Vec<Utf8PathBuf> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if is_special_dir_name(&name) {
                return true;
            }
            recursive && name != PRIVATE_FOLDER && !under_special_dir(root, entry.path())
        });
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("error walking {root}: {err}");
                continue;
            }
        };
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            warn!("skipping non-UTF-8 path {:?}", entry.path());
            continue;
        };
        let name = path.file_name().unwrap_or_default();
        if entry.file_type().is_dir() {
            if is_special_dir_name(name) {
                paths.push(path.to_owned());
            }
        } else if entry.file_type().is_file()
            && path.extension() == Some(MFILE_EXTENSION)
            && name != CONTENTS_FILE
        {
            paths.push(path.to_owned());
        }
    }
    paths
}
