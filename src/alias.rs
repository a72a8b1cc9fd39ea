// Copyright 2024 - 2026 Martin Pool

//! Indirection between an identifier position and the object behind it.
//!
//! Every discovered path enters the collection as an [`Alias`] holding a
//! constructor closure; the first access of [`Alias::target`] runs the
//! closure behind a per-alias mutex, so exactly one parse happens no matter
//! how many readers race, and the result is cached for the life of the
//! collection. Aliases also wrap the members of other objects so that member
//! paths stay rooted at the alias's position in the tree rather than at the
//! target's declaration site.

use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};

use indexmap::IndexMap;

use crate::docstring::Docstring;
use crate::error::Error;
use crate::kind::Kind;
use crate::objects::{Entity, Node, WeakEntity};
use crate::Result;

type Constructor = Box<dyn Fn() -> Result<Entity> + Send + Sync>;

enum TargetState {
    Unresolved(Constructor),
    Resolved(Node),
}

/// Where an alias hangs in the tree: under a concrete entity, or under
/// another alias.
#[derive(Clone)]
pub(crate) enum AliasParent {
    Entity(WeakEntity),
    Alias(Weak<Alias>),
}

impl From<&Entity> for AliasParent {
    fn from(entity: &Entity) -> AliasParent {
        AliasParent::Entity(entity.downgrade())
    }
}

impl AliasParent {
    fn node(&self) -> Option<Node> {
        match self {
            AliasParent::Entity(weak) => weak.upgrade().map(Node::Entity),
            AliasParent::Alias(weak) => weak.upgrade().map(Node::Alias),
        }
    }
}

/// A lazily materialized indirection to a collected object.
pub struct Alias {
    name: String,
    inherited: bool,
    parent: RwLock<Option<AliasParent>>,
    state: Mutex<TargetState>,
    target_path: RwLock<Option<String>>,
}

impl Alias {
    /// An alias whose target is constructed on first access.
    pub(crate) fn deferred(
        name: impl Into<String>,
        constructor: impl Fn() -> Result<Entity> + Send + Sync + 'static,
    ) -> Arc<Alias> {
        Arc::new(Alias {
            name: name.into(),
            inherited: false,
            parent: RwLock::new(None),
            state: Mutex::new(TargetState::Unresolved(Box::new(constructor))),
            target_path: RwLock::new(None),
        })
    }

    /// An alias around an already-known node, placed under `parent`.
    pub(crate) fn wrapping(
        name: &str,
        target: Node,
        parent: Option<AliasParent>,
        inherited: bool,
    ) -> Arc<Alias> {
        let target_path = target.path();
        let alias = Arc::new(Alias {
            name: name.to_owned(),
            inherited,
            parent: RwLock::new(parent),
            state: Mutex::new(TargetState::Resolved(target.clone())),
            target_path: RwLock::new(Some(target_path)),
        });
        if let Node::Entity(entity) = &target {
            entity.object().register_alias(alias.path(), &alias);
        }
        alias
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this alias projects an inherited class member.
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    /// Whether the target has been materialized.
    pub fn resolved(&self) -> bool {
        matches!(*self.state.lock().unwrap(), TargetState::Resolved(_))
    }

    /// The path of the resolved target, once known.
    pub fn target_path(&self) -> Option<String> {
        self.target_path.read().unwrap().clone()
    }

    pub fn parent(&self) -> Option<Node> {
        self.parent.read().unwrap().as_ref().and_then(AliasParent::node)
    }

    pub(crate) fn set_parent(&self, parent: &Entity) {
        *self.parent.write().unwrap() = Some(AliasParent::from(parent));
    }

    /// The path of this alias at its position in the tree.
    ///
    /// A parentless alias — one sitting directly in the collection — is
    /// addressed by its bare name.
    pub fn path(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}.{}", parent.path(), self.name),
            None => self.name.clone(),
        }
    }

    /// The kind of the resolved target, or [`Kind::Alias`] before
    /// resolution.
    pub fn kind(&self) -> Kind {
        match &*self.state.lock().unwrap() {
            TargetState::Resolved(Node::Entity(entity)) => entity.kind(),
            _ => Kind::Alias,
        }
    }

    /// Resolve this alias one level, running the constructor if needed.
    ///
    /// The state lock is held across the constructor call, so racing first
    /// accesses produce exactly one parse.
    fn resolve_shallow(self: &Arc<Self>) -> Result<Node> {
        let mut state = self.state.lock().unwrap();
        if let TargetState::Resolved(node) = &*state {
            return Ok(node.clone());
        }
        let entity = match &*state {
            TargetState::Unresolved(constructor) => constructor()?,
            TargetState::Resolved(_) => unreachable!("checked above"),
        };
        *self.target_path.write().unwrap() = Some(entity.path());
        entity.object().register_alias(self.path(), self);
        let node = Node::Entity(entity);
        *state = TargetState::Resolved(node.clone());
        Ok(node)
    }

    /// The concrete entity behind this alias, materializing it on first
    /// access and unwrapping chains of aliases.
    ///
    /// A chain that revisits a path raises [`Error::CyclicAlias`] carrying
    /// every path seen.
    pub fn target(self: &Arc<Self>) -> Result<Entity> {
        let mut seen = vec![self.path()];
        let mut node = self.resolve_shallow()?;
        loop {
            match node {
                Node::Entity(entity) => return Ok(entity),
                Node::Alias(alias) => {
                    let path = alias.path();
                    if seen.contains(&path) {
                        seen.push(path);
                        return Err(Error::CyclicAlias { chain: seen });
                    }
                    seen.push(path);
                    node = alias.resolve_shallow()?;
                }
            }
        }
    }

    /// Point this alias at a known node.
    ///
    /// Assigning a node that lives at this alias's own path is a cycle.
    pub fn set_target(self: &Arc<Self>, node: Node) -> Result<()> {
        let node_path = node.path();
        if node_path == self.path() {
            return Err(Error::CyclicAlias {
                chain: vec![self.target_path().unwrap_or(node_path)],
            });
        }
        if let Node::Entity(entity) = &node {
            entity.object().register_alias(self.path(), self);
        }
        *self.target_path.write().unwrap() = Some(node_path);
        *self.state.lock().unwrap() = TargetState::Resolved(node);
        Ok(())
    }

    /// The target's members, each re-wrapped so its path is rooted at this
    /// alias.
    pub fn members(self: &Arc<Self>) -> Result<IndexMap<String, Node>> {
        Ok(self
            .target()?
            .members()
            .into_iter()
            .map(|(name, member)| {
                let alias = Alias::wrapping(
                    &name,
                    member,
                    Some(AliasParent::Alias(Arc::downgrade(self))),
                    false,
                );
                (name, Node::Alias(alias))
            })
            .collect())
    }

    /// The target's inherited members, re-wrapped like [`Alias::members`].
    pub fn inherited_members(self: &Arc<Self>) -> Result<IndexMap<String, Node>> {
        Ok(self
            .target()?
            .inherited_members()?
            .into_iter()
            .map(|(name, member)| {
                let alias = Alias::wrapping(
                    &name,
                    member,
                    Some(AliasParent::Alias(Arc::downgrade(self))),
                    true,
                );
                (name, Node::Alias(alias))
            })
            .collect())
    }

    // Forwarders for the shared capability set.

    pub fn docstring(self: &Arc<Self>) -> Result<Option<Docstring>> {
        Ok(self.target()?.docstring())
    }

    pub fn filepath(self: &Arc<Self>) -> Result<camino::Utf8PathBuf> {
        self.target()?.filepath()
    }

    pub fn lineno(self: &Arc<Self>) -> Result<Option<usize>> {
        Ok(self.target()?.lineno())
    }

    pub fn endlineno(self: &Arc<Self>) -> Result<Option<usize>> {
        Ok(self.target()?.endlineno())
    }
}

impl fmt::Debug for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Alias({:?}, {:?})",
            self.name,
            self.target_path().unwrap_or_default()
        )
    }
}
