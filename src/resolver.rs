// Copyright 2024 - 2026 Martin Pool

//! Turn one registered filesystem path into its MATLAB object.
//!
//! A [`Resolver`] is the constructor closure behind every alias in the
//! collection: it classifies its path (file, plain folder, `+namespace`,
//! `@class` folder), computes the MATLAB-visible identifier, and on demand
//! parses or assembles the object, wiring up parents and docstring
//! fallbacks.

use std::sync::{Arc, Weak};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, trace};

use crate::collection::CollectionInner;
use crate::docstring::Docstring;
use crate::error::Error;
use crate::objects::{Entity, Folder, Namespace, Node, Object};
use crate::parser::FileParser;
use crate::walk::{
    is_special_dir_name, CLASSFOLDER_PREFIX, CONTENTS_FILE, MFILE_EXTENSION, NAMESPACE_PREFIX,
};
use crate::Result;

/// Lazily materializes the MATLAB object for one path.
#[derive(Clone)]
pub(crate) struct Resolver {
    path: Utf8PathBuf,
    collection: Weak<CollectionInner>,
}

impl Resolver {
    pub(crate) fn new(path: Utf8PathBuf, collection: Weak<CollectionInner>) -> Resolver {
        Resolver { path, collection }
    }

    fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }

    pub(crate) fn is_class_folder(&self) -> bool {
        self.path.is_dir() && self.file_name().starts_with(CLASSFOLDER_PREFIX)
    }

    pub(crate) fn is_namespace(&self) -> bool {
        self.path.is_dir() && self.file_name().starts_with(NAMESPACE_PREFIX)
    }

    pub(crate) fn is_folder(&self) -> bool {
        self.path.is_dir() && !is_special_dir_name(self.file_name())
    }

    /// Whether the path sits directly inside a `+namespace` directory.
    pub(crate) fn is_in_namespace(&self) -> bool {
        self.path
            .parent()
            .and_then(Utf8Path::file_name)
            .is_some_and(|name| name.starts_with(NAMESPACE_PREFIX))
    }

    /// The identifier this path is addressable by in the collection.
    ///
    /// Enclosing namespaces contribute a dotted prefix; a namespace's own
    /// identifier keeps a literal `+` so that `+foo.bar` names the
    /// namespace entity while `foo.bar` names its content.
    pub(crate) fn identifier(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut ancestor = self.path.parent();
        while let Some(dir) = ancestor {
            match dir.file_name() {
                Some(name) if name.starts_with(NAMESPACE_PREFIX) => {
                    parts.push(&name[1..]);
                    ancestor = dir.parent();
                }
                _ => break,
            }
        }
        parts.reverse();
        let prefix = if parts.is_empty() {
            String::new()
        } else {
            format!("{}.", parts.join("."))
        };
        let name = self.file_name();
        let base = if self.is_class_folder() || self.is_namespace() {
            &name[1..]
        } else {
            self.path.file_stem().unwrap_or_default()
        };
        if self.is_namespace() {
            format!("+{prefix}{base}")
        } else {
            format!("{prefix}{base}")
        }
    }

    /// The simple member name: the file stem, or the directory name
    /// without its `+`/`@` marker.
    ///
    /// Accessor files keep their dotted stem (`get.value`), which is what
    /// class-folder assembly matches on.
    pub(crate) fn member_name(&self) -> String {
        let name = self.file_name();
        if self.is_class_folder() || self.is_namespace() {
            name[1..].to_owned()
        } else {
            self.path.file_stem().unwrap_or_default().to_owned()
        }
    }

    /// Produce the object for this path, parsing files on demand.
    pub(crate) fn materialize(&self) -> Result<Entity> {
        if !self.path.exists() {
            return Err(Error::FileNotFound {
                path: self.path.clone(),
            });
        }
        let entity = if self.is_class_folder() {
            self.collect_class_folder()?
        } else if self.is_namespace() {
            self.collect_namespace()?
        } else if self.is_folder() {
            self.collect_folder()?
        } else {
            self.collect_file(&self.path)?
        };
        if self.is_in_namespace() {
            self.attach_namespace_parent(&entity)?;
        }
        Ok(entity)
    }

    /// Parse one source file and record its lines in the lines cache.
    fn collect_file(&self, path: &Utf8Path) -> Result<Entity> {
        let parser = FileParser::new(path)?;
        let entity = parser.parse_with_collection(Some(self.collection.clone()))?;
        if let Some(collection) = self.collection.upgrade() {
            collection.record_lines(path, parser.content_lines());
        }
        Ok(entity)
    }

    /// Assemble an `@Class` folder: the classdef from `@Class/Class.m`,
    /// plus every sibling `.m` file attached as a method.
    ///
    /// Sibling files are attached unconditionally, matching MATLAB's
    /// permissive treatment of stray files in class folders.
    fn collect_class_folder(&self) -> Result<Entity> {
        let class_name = self.file_name()[1..].to_owned();
        let class_file = self.path.join(format!("{class_name}.{MFILE_EXTENSION}"));
        if !class_file.is_file() {
            return Err(Error::FileNotFound { path: class_file });
        }
        let entity = self.collect_file(&class_file)?;
        let Entity::Class(_) = &entity else {
            trace!("{class_file} does not declare a classdef");
            return Ok(entity);
        };
        for item in sorted_dir(&self.path)? {
            if !item.is_file() || item.extension() != Some(MFILE_EXTENSION) || item == class_file {
                continue;
            }
            if item.file_name() == Some(CONTENTS_FILE) {
                if !entity.has_docstring() {
                    let contents = self.collect_file(&item)?;
                    entity.object().set_docstring(contents.docstring());
                }
                continue;
            }
            let Some(alias) = self.object_at(&item) else {
                debug!("path not found in collection: {item}");
                continue;
            };
            let member = alias.target()?;
            let Entity::Function(function) = &member else {
                continue;
            };
            let stem = item.file_stem().unwrap_or_default().to_owned();
            // The implicit instance argument of a non-static method.
            if !function.is_static() && stem != class_name && !function.arguments().is_empty() {
                function.remove_leading_argument();
            }
            member.object().set_parent(&entity);
            let accessor_target = stem
                .strip_prefix("get.")
                .or_else(|| stem.strip_prefix("set."))
                .unwrap_or(&stem);
            if function.is_getter() || function.is_setter() {
                if let Some(Node::Entity(Entity::Property(property))) =
                    entity.object().get_member(accessor_target)
                {
                    if function.is_getter() {
                        property.bind_getter(Arc::clone(function));
                    } else {
                        property.bind_setter(Arc::clone(function));
                    }
                    continue;
                }
                // No such property here: it may be an accessor for an
                // inherited property, so keep it as a plain method.
            }
            entity.object().insert_member(stem, Node::Entity(member.clone()));
        }
        if !entity.has_docstring() {
            entity.object().set_docstring(self.readme_docstring()?);
        }
        Ok(entity)
    }

    fn collect_namespace(&self) -> Result<Entity> {
        let object = Object::new(self.member_name())
            .with_filepath(&self.path)
            .with_collection(Some(self.collection.clone()));
        let entity = Entity::Namespace(Arc::new(Namespace { object }));
        self.collect_directory(&entity, true)?;
        Ok(entity)
    }

    fn collect_folder(&self) -> Result<Entity> {
        let name = format!("/{}", self.path.file_stem().unwrap_or_default());
        let object = Object::new(name)
            .with_filepath(&self.path)
            .with_collection(Some(self.collection.clone()));
        let entity = Entity::Folder(Arc::new(Folder { object }));
        self.collect_directory(&entity, false)?;
        Ok(entity)
    }

    /// Add the directory's children as members, reusing the collection's
    /// aliases so that materialization stays lazy.
    fn collect_directory(&self, entity: &Entity, set_parent: bool) -> Result<()> {
        for item in sorted_dir(&self.path)? {
            let name = item.file_name().unwrap_or_default();
            if item.is_dir() && is_special_dir_name(name) {
                let Some(alias) = self.object_at(&item) else {
                    debug!("path not found in collection: {item}");
                    continue;
                };
                if set_parent {
                    alias.set_parent(entity);
                }
                entity
                    .object()
                    .insert_member(alias.name().to_owned(), Node::Alias(alias));
            } else if item.is_file() && item.extension() == Some(MFILE_EXTENSION) {
                if name == CONTENTS_FILE {
                    let contents = self.collect_file(&item)?;
                    entity.object().set_docstring(contents.docstring());
                } else {
                    let Some(alias) = self.object_at(&item) else {
                        debug!("path not found in collection: {item}");
                        continue;
                    };
                    if set_parent {
                        alias.set_parent(entity);
                    }
                    entity
                        .object()
                        .insert_member(alias.name().to_owned(), Node::Alias(alias));
                }
            }
        }
        if !entity.has_docstring() {
            entity.object().set_docstring(self.readme_docstring()?);
        }
        Ok(())
    }

    /// A `README.md` next to the path, as a docstring.
    fn readme_docstring(&self) -> Result<Option<Docstring>> {
        for candidate in ["README.md", "readme.md"] {
            let readme = self.path.join(candidate);
            if readme.is_file() {
                let content = std::fs::read_to_string(&readme)
                    .map_err(|_| Error::FileNotFound { path: readme })?;
                return Ok(Some(Docstring::new(content)));
            }
        }
        Ok(None)
    }

    /// Hook a freshly materialized object up to its enclosing namespace.
    fn attach_namespace_parent(&self, entity: &Entity) -> Result<()> {
        let Some(parent_dir) = self.path.parent() else {
            return Ok(());
        };
        let Some(alias) = self.object_at(parent_dir) else {
            return Ok(());
        };
        let parent = alias.target()?;
        if parent.is_namespace() {
            entity.object().set_parent(&parent);
        }
        Ok(())
    }

    fn object_at(&self, path: &Utf8Path) -> Option<Arc<crate::alias::Alias>> {
        self.collection.upgrade()?.object_at(path)
    }
}

/// Directory children in lexicographic order.
fn sorted_dir(path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut entries: Vec<Utf8PathBuf> = Vec::new();
    let read = path.read_dir_utf8().map_err(|_| Error::FileNotFound {
        path: path.to_owned(),
    })?;
    for entry in read {
        match entry {
            Ok(entry) => entries.push(entry.into_path()),
            Err(err) => debug!("error reading {path}: {err}"),
        }
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod test {
    use std::sync::Weak;

    use pretty_assertions::assert_eq;

    use super::Resolver;

    fn resolver(path: &str) -> Resolver {
        Resolver::new(path.into(), Weak::new())
    }

    #[test]
    fn identifier_of_a_plain_file_is_its_stem() {
        assert_eq!(resolver("src/foo.m").identifier(), "foo");
    }

    #[test]
    fn identifier_inside_namespaces_is_dotted() {
        assert_eq!(resolver("src/+pkg/bar.m").identifier(), "pkg.bar");
        assert_eq!(
            resolver("src/+outer/+inner/deep.m").identifier(),
            "outer.inner.deep"
        );
    }

    #[test]
    fn namespace_chain_stops_at_the_first_plain_directory() {
        assert_eq!(resolver("src/+pkg/sub/baz.m").identifier(), "baz");
    }

    #[test]
    fn accessor_files_keep_their_dotted_stem() {
        assert_eq!(resolver("@Widget/get.value.m").identifier(), "get.value");
    }

    #[test]
    fn member_name_is_the_stem() {
        assert_eq!(resolver("src/+outer/+inner/deep.m").member_name(), "deep");
        assert_eq!(resolver("src/+pkg/bar.m").member_name(), "bar");
        assert_eq!(resolver("@Widget/get.value.m").member_name(), "get.value");
    }

    // Identifiers of directories depend on directory-ness, which needs the
    // filesystem; covered by the tests on a real tree.
    #[test]
    fn real_namespace_identifier_keeps_the_marker() {
        let tmp = tempfile::tempdir().unwrap();
        let root = camino::Utf8PathBuf::from_path_buf(tmp.path().to_owned()).unwrap();
        std::fs::create_dir_all(root.join("+outer/+inner")).unwrap();
        std::fs::create_dir_all(root.join("@Widget")).unwrap();
        assert_eq!(
            resolver(root.join("+outer").as_str()).identifier(),
            "+outer"
        );
        assert_eq!(
            resolver(root.join("+outer/+inner").as_str()).identifier(),
            "+outer.inner"
        );
        assert_eq!(resolver(root.join("@Widget").as_str()).identifier(), "Widget");
        assert_eq!(
            resolver(root.join("+outer").as_str()).member_name(),
            "outer"
        );
    }
}
