// Copyright 2024 - 2026 Martin Pool

//! An ordered set of MATLAB search-path roots and the objects they
//! contribute.
//!
//! [`PathsCollection`] mirrors MATLAB's `addpath`/`which` semantics: roots
//! form an ordered deque, every discovered path becomes a lazily parsed
//! alias, and identifiers that appear under several roots keep a deque of
//! candidates whose front is the visible one. Adding a root at the front
//! shadows earlier candidates; adding at the back is shadowed. Removing a
//! root retracts exactly what it contributed.
//!
//! The collection is safe to share, but `addpath` and `rm_path` must be
//! serialized with respect to reads by the caller.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock, Weak};

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::debug_span;

use crate::alias::Alias;
use crate::error::Error;
use crate::objects::{Entity, Node};
use crate::resolver::Resolver;
use crate::walk::walk;
use crate::Result;

/// A weak handle to the collection, held by resolvers and parsed objects.
pub(crate) type CollectionHandle = Weak<CollectionInner>;

/// The shared state behind a [`PathsCollection`].
#[derive(Debug)]
pub(crate) struct CollectionInner {
    /// Ordered root directories; front is highest priority.
    path: RwLock<VecDeque<Utf8PathBuf>>,
    /// Identifier to candidate paths; the front candidate is visible, the
    /// rest are shadowed but kept for removal bookkeeping.
    mapping: RwLock<IndexMap<String, VecDeque<Utf8PathBuf>>>,
    /// Every discovered path and its lazily materializing alias.
    objects: RwLock<HashMap<Utf8PathBuf, Arc<Alias>>>,
    /// What each root contributed, for exact retraction.
    members_by_root: RwLock<HashMap<Utf8PathBuf, Vec<(String, Utf8PathBuf)>>>,
    /// Containing directories, addressable by filesystem-relative lookups.
    folders: RwLock<HashMap<Utf8PathBuf, Arc<Alias>>>,
    /// Source lines of every parsed file.
    lines: RwLock<HashMap<Utf8PathBuf, Vec<String>>>,
    working_directory: Utf8PathBuf,
}

impl CollectionInner {
    pub(crate) fn object_at(&self, path: &Utf8Path) -> Option<Arc<Alias>> {
        self.objects.read().unwrap().get(path).cloned()
    }

    pub(crate) fn lines(&self, path: &Utf8Path) -> Option<Vec<String>> {
        self.lines.read().unwrap().get(path).cloned()
    }

    pub(crate) fn record_lines(&self, path: &Utf8Path, lines: Vec<String>) {
        self.lines.write().unwrap().insert(path.to_owned(), lines);
    }

    /// Resolve an identifier to its entity; see [`PathsCollection::get`].
    pub(crate) fn lookup(&self, identifier: &str) -> Result<Option<Entity>> {
        // A directly mapped identifier wins.
        let front = self
            .mapping
            .read()
            .unwrap()
            .get(identifier)
            .and_then(|candidates| candidates.front().cloned());
        if let Some(path) = front {
            return match self.object_at(&path) {
                Some(alias) => alias.target().map(Some),
                None => Ok(None),
            };
        }

        if identifier.contains('/') {
            return self.lookup_filesystem(identifier);
        }

        if let Some((prefix, last)) = identifier.rsplit_once('.') {
            let base = match self.lookup(prefix)? {
                Some(base) => Some(base),
                // `foo.bar` also addresses the content of namespace `+foo`.
                None if !prefix.starts_with('+') => self.lookup(&format!("+{prefix}"))?,
                None => None,
            };
            return match base {
                Some(base) => match base.object().get_member(last) {
                    Some(node) => node.target().map(Some),
                    None => Ok(None),
                },
                None => Ok(None),
            };
        }

        Ok(None)
    }

    /// Resolve a filesystem-relative reference against the working
    /// directory, through the known folders.
    fn lookup_filesystem(&self, identifier: &str) -> Result<Option<Entity>> {
        let joined = self.working_directory.join(identifier);
        let absolute = joined.canonicalize_utf8().unwrap_or(joined);
        if !absolute.exists() {
            return Ok(None);
        }
        let (directory, member) = if absolute.extension().is_some() {
            let directory = match absolute.parent() {
                Some(parent) => parent.to_owned(),
                None => return Ok(None),
            };
            (directory, absolute.file_stem().map(str::to_owned))
        } else {
            (absolute, None)
        };
        let Some(folder_alias) = self.folders.read().unwrap().get(&directory).cloned() else {
            return Ok(None);
        };
        let folder = folder_alias.target()?;
        match member {
            None => Ok(Some(folder)),
            Some(member) => match folder.object().get_member(&member) {
                Some(node) => node.target().map(Some),
                None => Ok(None),
            },
        }
    }
}

/// An ordered collection of MATLAB search-path roots and the objects
/// reachable from them.
#[derive(Debug)]
pub struct PathsCollection {
    inner: Arc<CollectionInner>,
}

impl PathsCollection {
    /// Create a collection over the given roots, added in order with
    /// [`PathsCollection::addpath`]`(root, to_end=true)`, so earlier roots
    /// shadow later ones. The working directory for filesystem-relative
    /// lookups defaults to the process working directory.
    pub fn new<I, P>(matlab_path: I, recursive: bool) -> Result<PathsCollection>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<std::path::Path>,
    {
        let working_directory =
            std::env::current_dir().map_err(|_| Error::InvalidRoot { path: ".".into() })?;
        PathsCollection::with_working_directory(matlab_path, recursive, working_directory)
    }

    /// Like [`PathsCollection::new`], with an explicit working directory.
    pub fn with_working_directory<I, P>(
        matlab_path: I,
        recursive: bool,
        working_directory: impl AsRef<std::path::Path>,
    ) -> Result<PathsCollection>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<std::path::Path>,
    {
        let collection = PathsCollection {
            inner: Arc::new(CollectionInner {
                path: RwLock::new(VecDeque::new()),
                mapping: RwLock::new(IndexMap::new()),
                objects: RwLock::new(HashMap::new()),
                members_by_root: RwLock::new(HashMap::new()),
                folders: RwLock::new(HashMap::new()),
                lines: RwLock::new(HashMap::new()),
                working_directory: to_utf8(working_directory)?,
            }),
        };
        for root in matlab_path {
            collection.addpath(root, true, recursive)?;
        }
        Ok(collection)
    }

    /// Add a root to the search path.
    ///
    /// `to_end=false` puts the root at the front, where its identifiers
    /// shadow existing candidates; `to_end=true` appends it, shadowed by
    /// everything already present. Re-adding a known root first retracts
    /// its previous contribution, so `addpath` is idempotent.
    pub fn addpath(
        &self,
        path: impl AsRef<std::path::Path>,
        to_end: bool,
        recursive: bool,
    ) -> Result<()> {
        let path = to_utf8(path)?;
        let _span = debug_span!("addpath", %path, to_end, recursive).entered();
        if !path.exists() {
            return Err(Error::FileNotFound { path });
        }
        if !path.is_dir() {
            return Err(Error::InvalidRoot {
                path: path.into_std_path_buf(),
            });
        }
        if self.inner.path.read().unwrap().contains(&path) {
            self.retract(&path);
        }
        {
            let mut roots = self.inner.path.write().unwrap();
            if to_end {
                roots.push_back(path.clone());
            } else {
                roots.push_front(path.clone());
            }
        }

        let mut added: Vec<(String, Utf8PathBuf)> = Vec::new();
        for member in walk(&path, recursive) {
            let resolver = Resolver::new(member.clone(), Arc::downgrade(&self.inner));
            let identifier = resolver.identifier();
            let name = resolver.member_name();
            let alias = Alias::deferred(name, move || resolver.materialize());
            self.inner
                .objects
                .write()
                .unwrap()
                .insert(member.clone(), alias);
            {
                let mut mapping = self.inner.mapping.write().unwrap();
                let candidates = mapping.entry(identifier.clone()).or_default();
                if to_end {
                    candidates.push_back(member.clone());
                } else {
                    candidates.push_front(member.clone());
                }
            }
            added.push((identifier, member.clone()));

            // Make sure the containing directory is addressable too.
            if let Some(directory) = member.parent() {
                let mut folders = self.inner.folders.write().unwrap();
                if !folders.contains_key(directory) {
                    let resolver =
                        Resolver::new(directory.to_owned(), Arc::downgrade(&self.inner));
                    folders.insert(
                        directory.to_owned(),
                        Alias::deferred(directory.to_string(), move || resolver.materialize()),
                    );
                }
            }
        }
        self.inner
            .members_by_root
            .write()
            .unwrap()
            .insert(path, added);
        Ok(())
    }

    /// Remove a root from the search path, retracting every identifier it
    /// contributed. Unknown roots are ignored.
    ///
    /// With `recursive`, remaining roots that are subdirectories of `path`
    /// are removed as well.
    pub fn rm_path(&self, path: impl AsRef<std::path::Path>, recursive: bool) -> Result<()> {
        let path = to_utf8(path)?;
        if !self.inner.path.read().unwrap().contains(&path) {
            return Ok(());
        }
        self.retract(&path);
        if recursive {
            let subdirs: Vec<Utf8PathBuf> = self
                .inner
                .path
                .read()
                .unwrap()
                .iter()
                .filter(|root| root.starts_with(&path))
                .cloned()
                .collect();
            for subdir in subdirs {
                self.rm_path(subdir, false)?;
            }
        }
        Ok(())
    }

    /// Remove one root's contributions from every table.
    fn retract(&self, root: &Utf8Path) {
        self.inner.path.write().unwrap().retain(|p| p != root);
        let Some(entries) = self.inner.members_by_root.write().unwrap().remove(root) else {
            return;
        };
        let mut mapping = self.inner.mapping.write().unwrap();
        let mut objects = self.inner.objects.write().unwrap();
        for (identifier, member) in entries {
            if let Some(candidates) = mapping.get_mut(&identifier) {
                if let Some(position) = candidates.iter().position(|p| p == &member) {
                    candidates.remove(position);
                }
                if candidates.is_empty() {
                    mapping.shift_remove(&identifier);
                }
            }
            objects.remove(&member);
        }
    }

    /// Every identifier and its currently visible node.
    pub fn members(&self) -> IndexMap<String, Node> {
        let mapping = self.inner.mapping.read().unwrap();
        let objects = self.inner.objects.read().unwrap();
        mapping
            .iter()
            .filter_map(|(identifier, candidates)| {
                candidates
                    .front()
                    .and_then(|path| objects.get(path))
                    .map(|alias| (identifier.clone(), Node::Alias(Arc::clone(alias))))
            })
            .collect()
    }

    /// Resolve an identifier to its object, materializing it if needed.
    ///
    /// Lookup tries, in order: the identifier table (front candidate wins);
    /// a filesystem-relative reference when the identifier contains `/`;
    /// a dotted member access, resolving the prefix recursively, where a
    /// namespace answers to both `+foo.bar` (the entity) and `foo.bar`
    /// (its content). The result is dereferenced one alias level.
    pub fn get(&self, identifier: &str) -> Result<Option<Entity>> {
        self.inner.lookup(identifier)
    }

    /// Alias for [`PathsCollection::get`].
    pub fn get_member(&self, identifier: &str) -> Result<Option<Entity>> {
        self.get(identifier)
    }

    /// Whether the identifier resolves; materializes like
    /// [`PathsCollection::get`].
    pub fn contains(&self, identifier: &str) -> bool {
        matches!(self.get(identifier), Ok(Some(_)))
    }

    /// The cached source lines of a parsed file.
    pub fn lines(&self, path: impl AsRef<std::path::Path>) -> Option<Vec<String>> {
        let path = Utf8Path::from_path(path.as_ref())?;
        self.inner.lines(path)
    }

    /// The current search path, front first.
    pub fn search_path(&self) -> Vec<Utf8PathBuf> {
        self.inner.path.read().unwrap().iter().cloned().collect()
    }

    pub fn working_directory(&self) -> &Utf8Path {
        &self.inner.working_directory
    }

    /// How many identifiers the collection currently maps.
    pub fn len(&self) -> usize {
        self.inner.mapping.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.mapping.read().unwrap().is_empty()
    }
}

fn to_utf8(path: impl AsRef<std::path::Path>) -> Result<Utf8PathBuf> {
    let path = path.as_ref();
    Utf8Path::from_path(path)
        .map(Utf8Path::to_path_buf)
        .ok_or_else(|| Error::InvalidRoot {
            path: path.to_owned(),
        })
}
