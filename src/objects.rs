// Copyright 2024 - 2026 Martin Pool

//! The typed model of collected MATLAB objects.
//!
//! Every addressable unit — folder, namespace, class, function, script,
//! property, enumeration — carries a common [`Object`] core (name, location,
//! docstring, parent link, ordered members) plus its kind-specific fields.
//! Two sum types tie the model together: [`Entity`] is one concrete object,
//! and [`Node`] is what actually sits in `members` maps — either an entity
//! or an [`Alias`] that materializes one on demand.
//!
//! The graph is `Arc`-shared. Fields that change after parsing (docstring
//! backfill, parent attachment, member assembly, accessor binding) are
//! behind `RwLock`s; parents are held weakly so that member/parent cycles
//! do not leak.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::{Arc, RwLock, Weak};

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::debug;

use crate::alias::{Alias, AliasParent};
use crate::c3::c3_merge;
use crate::collection::{CollectionHandle, CollectionInner};
use crate::docstring::{dedent_lines, Docstring};
use crate::error::Error;
use crate::expr::Expr;
use crate::kind::{AccessKind, ArgumentKind, Kind};
use crate::Result;

/// The directory component that marks a tree as internal to a toolbox.
const INTERNAL_NAMESPACE: &str = "+internal";

/// Common state shared by every concrete entity.
#[derive(Debug)]
pub struct Object {
    name: String,
    lineno: Option<usize>,
    endlineno: Option<usize>,
    filepath: Option<Utf8PathBuf>,
    docstring: RwLock<Option<Docstring>>,
    parent: RwLock<Option<WeakEntity>>,
    members: RwLock<IndexMap<String, Node>>,
    aliases: RwLock<HashMap<String, Weak<Alias>>>,
    collection: RwLock<Option<CollectionHandle>>,
}

impl Object {
    pub(crate) fn new(name: impl Into<String>) -> Object {
        Object {
            name: name.into(),
            lineno: None,
            endlineno: None,
            filepath: None,
            docstring: RwLock::new(None),
            parent: RwLock::new(None),
            members: RwLock::new(IndexMap::new()),
            aliases: RwLock::new(HashMap::new()),
            collection: RwLock::new(None),
        }
    }

    pub(crate) fn with_location(mut self, lineno: usize, endlineno: usize) -> Object {
        self.lineno = Some(lineno);
        self.endlineno = Some(endlineno);
        self
    }

    pub(crate) fn with_filepath(mut self, filepath: impl AsRef<Utf8Path>) -> Object {
        self.filepath = Some(filepath.as_ref().to_path_buf());
        self
    }

    pub(crate) fn with_docstring(self, docstring: Option<Docstring>) -> Object {
        *self.docstring.write().unwrap() = docstring;
        self
    }

    pub(crate) fn with_collection(self, collection: Option<CollectionHandle>) -> Object {
        *self.collection.write().unwrap() = collection;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based first source line, if known.
    pub fn lineno(&self) -> Option<usize> {
        self.lineno
    }

    /// 1-based last source line (inclusive), if known.
    pub fn endlineno(&self) -> Option<usize> {
        self.endlineno
    }

    pub fn docstring(&self) -> Option<Docstring> {
        self.docstring.read().unwrap().clone()
    }

    pub fn has_docstring(&self) -> bool {
        self.docstring
            .read()
            .unwrap()
            .as_ref()
            .is_some_and(|d| !d.is_empty())
    }

    pub(crate) fn set_docstring(&self, docstring: Option<Docstring>) {
        *self.docstring.write().unwrap() = docstring;
    }

    pub(crate) fn parent(&self) -> Option<Entity> {
        self.parent.read().unwrap().as_ref().and_then(WeakEntity::upgrade)
    }

    pub(crate) fn set_parent(&self, parent: &Entity) {
        *self.parent.write().unwrap() = Some(parent.downgrade());
    }

    pub(crate) fn members(&self) -> IndexMap<String, Node> {
        self.members.read().unwrap().clone()
    }

    pub(crate) fn get_member(&self, name: &str) -> Option<Node> {
        self.members.read().unwrap().get(name).cloned()
    }

    pub(crate) fn contains_member(&self, name: &str) -> bool {
        self.members.read().unwrap().contains_key(name)
    }

    pub(crate) fn insert_member(&self, name: impl Into<String>, node: Node) {
        self.members.write().unwrap().insert(name.into(), node);
    }

    /// Record an alias that points at this object, keyed by the alias path.
    pub(crate) fn register_alias(&self, path: String, alias: &Arc<Alias>) {
        self.aliases
            .write()
            .unwrap()
            .insert(path, Arc::downgrade(alias));
    }

    /// Paths of the aliases currently targeting this object.
    pub fn alias_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .aliases
            .read()
            .unwrap()
            .iter()
            .filter(|(_, weak)| weak.upgrade().is_some())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    pub(crate) fn filepath_opt(&self) -> Option<&Utf8Path> {
        self.filepath.as_deref()
    }

    /// The collection attached to this object or the nearest ancestor.
    pub(crate) fn collection(&self) -> Option<Arc<CollectionInner>> {
        if let Some(handle) = self.collection.read().unwrap().as_ref() {
            if let Some(inner) = handle.upgrade() {
                return Some(inner);
            }
        }
        self.parent().and_then(|parent| parent.object().collection())
    }

    /// The dotted path from the outermost ancestor down to this object.
    pub(crate) fn canonical_path(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}.{}", parent.canonical_path(), self.name),
            None => self.name.clone(),
        }
    }
}

/// A directory on the search path that is neither a namespace nor a class
/// folder.
pub struct Folder {
    pub(crate) object: Object,
}

/// A `+name` directory; contents are addressed with dotted notation.
pub struct Namespace {
    pub(crate) object: Object,
}

impl Namespace {
    /// Whether this namespace is contained in another namespace.
    pub fn is_subnamespace(&self) -> bool {
        self.object
            .parent()
            .is_some_and(|parent| parent.is_namespace())
    }
}

/// A file with no top-level `function` or `classdef`.
pub struct Script {
    pub(crate) object: Object,
}

/// Attributes declared on a `classdef` line.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassFlags {
    pub is_abstract: bool,
    pub sealed: bool,
    pub hidden: bool,
}

/// A `classdef` unit.
#[derive(Debug)]
pub struct Class {
    pub(crate) object: Object,
    pub(crate) bases: Vec<String>,
    pub(crate) flags: ClassFlags,
}

impl Class {
    /// The declared base-class names, resolved or not.
    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    pub fn flags(&self) -> ClassFlags {
        self.flags
    }

    pub fn path(&self) -> String {
        self.object.canonical_path()
    }

    /// The declared bases that resolve through the containing collection.
    ///
    /// A base that cannot be resolved (for example `handle`, or a class in
    /// a toolbox outside the known paths) is skipped; it stays visible as a
    /// string in [`Class::bases`] but does not contribute to the MRO.
    pub fn resolved_bases(&self) -> Vec<Entity> {
        let Some(collection) = self.object.collection() else {
            return Vec::new();
        };
        let mut resolved = Vec::new();
        for base in &self.bases {
            match collection.lookup(base) {
                Ok(Some(entity)) => resolved.push(entity),
                Ok(None) => {
                    debug!("base class {base} is not loaded, it cannot be resolved");
                }
                Err(err) => {
                    debug!("base class {base} failed to resolve: {err}");
                }
            }
        }
        resolved
    }

    fn linearize(self: &Arc<Self>, seen: &[String]) -> Result<Vec<Arc<Class>>> {
        let mut seen = seen.to_vec();
        seen.push(self.path());
        let bases: Vec<Arc<Class>> = self
            .resolved_bases()
            .into_iter()
            .filter_map(|entity| match entity {
                Entity::Class(class) => Some(class),
                _ => None,
            })
            .collect();
        if bases.is_empty() {
            return Ok(vec![Arc::clone(self)]);
        }
        for base in &bases {
            let base_path = base.path();
            if seen.contains(&base_path) {
                let mut chain = seen;
                chain.push(base_path);
                return Err(Error::InheritanceCycle { chain });
            }
        }
        let mut sequences: Vec<Vec<Arc<Class>>> = Vec::with_capacity(bases.len() + 1);
        for base in &bases {
            sequences.push(base.linearize(&seen)?);
        }
        sequences.push(bases);
        let merged = c3_merge(sequences, |class| class.path())
            .ok_or(Error::InheritanceCycle { chain: seen })?;
        let mut mro = Vec::with_capacity(merged.len() + 1);
        mro.push(Arc::clone(self));
        mro.extend(merged);
        Ok(mro)
    }

    /// The C3-linearized method resolution order, excluding this class.
    pub fn mro(self: &Arc<Self>) -> Result<Vec<Arc<Class>>> {
        let mut linearized = self.linearize(&[])?;
        linearized.remove(0);
        Ok(linearized)
    }

    /// Members projected from base classes, nearest base winning, each
    /// wrapped in an inherited alias parented on this class.
    pub fn inherited_members(self: &Arc<Self>) -> Result<IndexMap<String, Node>> {
        let mut inherited: IndexMap<String, Node> = IndexMap::new();
        for class in self.mro()?.iter().rev() {
            for (name, member) in class.all_members()? {
                if !self.object.contains_member(&name) {
                    let alias = Alias::wrapping(
                        &name,
                        member,
                        Some(AliasParent::from(&Entity::Class(Arc::clone(self)))),
                        true,
                    );
                    inherited.insert(name, Node::Alias(alias));
                }
            }
        }
        Ok(inherited)
    }

    /// Declared and inherited members; declared members win collisions.
    pub fn all_members(self: &Arc<Self>) -> Result<IndexMap<String, Node>> {
        let mut all = self.inherited_members()?;
        for (name, member) in self.object.members() {
            all.insert(name, member);
        }
        Ok(all)
    }

    /// The constructor of this class, if any: the nearest function member in
    /// the MRO named like this class.
    pub fn constructor(self: &Arc<Self>) -> Result<Option<Arc<Function>>> {
        let mut chain = vec![Arc::clone(self)];
        chain.extend(self.mro()?);
        for class in chain {
            if let Some(Node::Entity(Entity::Function(function))) =
                class.object.get_member(self.object.name())
            {
                return Ok(Some(function));
            }
        }
        Ok(None)
    }

    /// The arguments of this class' constructor, or empty without one.
    pub fn arguments(self: &Arc<Self>) -> Result<Arguments> {
        Ok(self
            .constructor()?
            .map(|constructor| constructor.arguments())
            .unwrap_or_default())
    }
}

/// Attributes declared on a `methods` block.
#[derive(Clone, Copy, Debug, Default)]
pub struct MethodFlags {
    pub access: AccessKind,
    pub is_static: bool,
    pub is_abstract: bool,
    pub sealed: bool,
    pub hidden: bool,
}

/// A function or method.
pub struct Function {
    pub(crate) object: Object,
    pub(crate) arguments: RwLock<Arguments>,
    pub(crate) returns: RwLock<Arguments>,
    pub(crate) flags: MethodFlags,
    pub(crate) is_getter: bool,
    pub(crate) is_setter: bool,
}

impl Function {
    pub fn arguments(&self) -> Arguments {
        self.arguments.read().unwrap().clone()
    }

    pub fn returns(&self) -> Arguments {
        self.returns.read().unwrap().clone()
    }

    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    pub fn access(&self) -> AccessKind {
        self.flags.access
    }

    pub fn is_static(&self) -> bool {
        self.flags.is_static
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.is_abstract
    }

    pub fn is_sealed(&self) -> bool {
        self.flags.sealed
    }

    /// Whether this function is a `get.name` property accessor.
    pub fn is_getter(&self) -> bool {
        self.is_getter
    }

    /// Whether this function is a `set.name` property accessor.
    pub fn is_setter(&self) -> bool {
        self.is_setter
    }

    /// Whether this function is a member of a class.
    pub fn is_method(&self) -> bool {
        self.object.parent().is_some_and(|parent| parent.is_class())
    }

    /// Whether this function is the constructor of its class.
    pub fn is_constructor_method(&self) -> bool {
        self.object
            .parent()
            .is_some_and(|parent| parent.is_class() && parent.name() == self.object.name())
    }

    /// Drop the implicit instance argument of a non-static method.
    pub(crate) fn remove_leading_argument(&self) {
        self.arguments.write().unwrap().remove_first();
    }

    /// The attribute names in effect on this method, with `Access=...`
    /// included when narrower than public.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut attributes = Vec::new();
        for (set, name) in [
            (self.flags.is_abstract, "Abstract"),
            (self.flags.hidden, "Hidden"),
            (self.flags.sealed, "Sealed"),
            (self.flags.is_static, "Static"),
        ] {
            if set {
                attributes.push(name.to_owned());
            }
        }
        if self.flags.access != AccessKind::Public {
            attributes.push(format!("Access={}", self.flags.access));
        }
        attributes
    }
}

/// Attributes declared on a `properties` block.
#[derive(Clone, Copy, Debug)]
pub struct PropertyFlags {
    pub abort_set: bool,
    pub is_abstract: bool,
    pub constant: bool,
    pub dependent: bool,
    pub get_observable: bool,
    pub hidden: bool,
    pub non_copyable: bool,
    pub set_observable: bool,
    pub transient: bool,
    pub weak_handle: bool,
    pub access: AccessKind,
    pub get_access: AccessKind,
    pub set_access: AccessKind,
}

impl Default for PropertyFlags {
    fn default() -> PropertyFlags {
        PropertyFlags {
            abort_set: false,
            is_abstract: false,
            constant: false,
            dependent: false,
            get_observable: false,
            hidden: false,
            non_copyable: false,
            set_observable: false,
            transient: false,
            weak_handle: false,
            access: AccessKind::Public,
            get_access: AccessKind::Public,
            set_access: AccessKind::Public,
        }
    }
}

/// A validated class property declaration.
pub struct Property {
    pub(crate) object: Object,
    pub(crate) ty: Option<Expr>,
    pub(crate) dimensions: Option<Vec<String>>,
    pub(crate) validators: Option<Expr>,
    pub(crate) default: Option<Expr>,
    pub(crate) flags: PropertyFlags,
    pub(crate) getter: RwLock<Option<Arc<Function>>>,
    pub(crate) setter: RwLock<Option<Arc<Function>>>,
}

impl Property {
    pub fn ty(&self) -> Option<&Expr> {
        self.ty.as_ref()
    }

    pub fn dimensions(&self) -> Option<&[String]> {
        self.dimensions.as_deref()
    }

    pub fn validators(&self) -> Option<&Expr> {
        self.validators.as_ref()
    }

    pub fn default(&self) -> Option<&Expr> {
        self.default.as_ref()
    }

    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// The bound `get.name` accessor, if one was declared.
    pub fn getter(&self) -> Option<Arc<Function>> {
        self.getter.read().unwrap().clone()
    }

    /// The bound `set.name` accessor, if one was declared.
    pub fn setter(&self) -> Option<Arc<Function>> {
        self.setter.read().unwrap().clone()
    }

    pub(crate) fn bind_getter(&self, function: Arc<Function>) {
        *self.getter.write().unwrap() = Some(function);
    }

    pub(crate) fn bind_setter(&self, function: Arc<Function>) {
        *self.setter.write().unwrap() = Some(function);
    }

    /// The attribute names in effect on this property, with the three
    /// access kinds included when narrower than public.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut attributes = Vec::new();
        for (set, name) in [
            (self.flags.abort_set, "AbortSet"),
            (self.flags.is_abstract, "Abstract"),
            (self.flags.constant, "Constant"),
            (self.flags.dependent, "Dependent"),
            (self.flags.get_observable, "GetObservable"),
            (self.flags.hidden, "Hidden"),
            (self.flags.non_copyable, "NonCopyable"),
            (self.flags.set_observable, "SetObservable"),
            (self.flags.transient, "Transient"),
            (self.flags.weak_handle, "WeakHandle"),
        ] {
            if set {
                attributes.push(name.to_owned());
            }
        }
        for (access, name) in [
            (self.flags.access, "Access"),
            (self.flags.get_access, "GetAccess"),
            (self.flags.set_access, "SetAccess"),
        ] {
            if access != AccessKind::Public {
                attributes.push(format!("{name}={access}"));
            }
        }
        attributes
    }
}

/// One member of a class `enumeration` block.
pub struct Enumeration {
    pub(crate) object: Object,
    pub(crate) value: Option<Expr>,
}

impl Enumeration {
    /// The constructor-argument expression, e.g. the `(1)` of `On (1)`.
    pub fn value(&self) -> Option<&Expr> {
        self.value.as_ref()
    }
}

/// One concrete collected object.
#[derive(Clone)]
pub enum Entity {
    Folder(Arc<Folder>),
    Namespace(Arc<Namespace>),
    Class(Arc<Class>),
    Function(Arc<Function>),
    Script(Arc<Script>),
    Property(Arc<Property>),
    Enumeration(Arc<Enumeration>),
}

/// A weak counterpart of [`Entity`], used for parent back-links.
#[derive(Clone, Debug)]
pub(crate) enum WeakEntity {
    Folder(Weak<Folder>),
    Namespace(Weak<Namespace>),
    Class(Weak<Class>),
    Function(Weak<Function>),
    Script(Weak<Script>),
    Property(Weak<Property>),
    Enumeration(Weak<Enumeration>),
}

impl WeakEntity {
    pub(crate) fn upgrade(&self) -> Option<Entity> {
        match self {
            WeakEntity::Folder(weak) => weak.upgrade().map(Entity::Folder),
            WeakEntity::Namespace(weak) => weak.upgrade().map(Entity::Namespace),
            WeakEntity::Class(weak) => weak.upgrade().map(Entity::Class),
            WeakEntity::Function(weak) => weak.upgrade().map(Entity::Function),
            WeakEntity::Script(weak) => weak.upgrade().map(Entity::Script),
            WeakEntity::Property(weak) => weak.upgrade().map(Entity::Property),
            WeakEntity::Enumeration(weak) => weak.upgrade().map(Entity::Enumeration),
        }
    }
}

impl Entity {
    /// The shared object core of any entity.
    pub fn object(&self) -> &Object {
        match self {
            Entity::Folder(e) => &e.object,
            Entity::Namespace(e) => &e.object,
            Entity::Class(e) => &e.object,
            Entity::Function(e) => &e.object,
            Entity::Script(e) => &e.object,
            Entity::Property(e) => &e.object,
            Entity::Enumeration(e) => &e.object,
        }
    }

    pub(crate) fn downgrade(&self) -> WeakEntity {
        match self {
            Entity::Folder(e) => WeakEntity::Folder(Arc::downgrade(e)),
            Entity::Namespace(e) => WeakEntity::Namespace(Arc::downgrade(e)),
            Entity::Class(e) => WeakEntity::Class(Arc::downgrade(e)),
            Entity::Function(e) => WeakEntity::Function(Arc::downgrade(e)),
            Entity::Script(e) => WeakEntity::Script(Arc::downgrade(e)),
            Entity::Property(e) => WeakEntity::Property(Arc::downgrade(e)),
            Entity::Enumeration(e) => WeakEntity::Enumeration(Arc::downgrade(e)),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Entity::Folder(_) => Kind::Folder,
            Entity::Namespace(_) => Kind::Namespace,
            Entity::Class(_) => Kind::Class,
            Entity::Function(_) => Kind::Function,
            Entity::Script(_) => Kind::Script,
            Entity::Property(_) => Kind::Property,
            Entity::Enumeration(_) => Kind::Enumeration,
        }
    }

    /// Whether two handles refer to the same underlying object.
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        match (self, other) {
            (Entity::Folder(a), Entity::Folder(b)) => Arc::ptr_eq(a, b),
            (Entity::Namespace(a), Entity::Namespace(b)) => Arc::ptr_eq(a, b),
            (Entity::Class(a), Entity::Class(b)) => Arc::ptr_eq(a, b),
            (Entity::Function(a), Entity::Function(b)) => Arc::ptr_eq(a, b),
            (Entity::Script(a), Entity::Script(b)) => Arc::ptr_eq(a, b),
            (Entity::Property(a), Entity::Property(b)) => Arc::ptr_eq(a, b),
            (Entity::Enumeration(a), Entity::Enumeration(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn name(&self) -> &str {
        self.object().name()
    }

    pub fn lineno(&self) -> Option<usize> {
        self.object().lineno()
    }

    pub fn endlineno(&self) -> Option<usize> {
        self.object().endlineno()
    }

    pub fn docstring(&self) -> Option<Docstring> {
        self.object().docstring()
    }

    pub fn has_docstring(&self) -> bool {
        self.object().has_docstring()
    }

    pub fn parent(&self) -> Option<Entity> {
        self.object().parent()
    }

    /// The dotted path from the outermost ancestor down to this object.
    pub fn canonical_path(&self) -> String {
        self.object().canonical_path()
    }

    /// Like [`Entity::canonical_path`], with namespaces prefixed by `+`.
    pub fn path(&self) -> String {
        match self {
            Entity::Namespace(_) => format!("+{}", self.canonical_path()),
            _ => self.canonical_path(),
        }
    }

    /// The file this object was defined in, possibly supplied by a parent.
    pub fn filepath(&self) -> Result<Utf8PathBuf> {
        if let Some(filepath) = self.object().filepath_opt() {
            return Ok(filepath.to_owned());
        }
        match self.parent() {
            Some(parent) => parent.filepath(),
            None => Err(Error::FilePath {
                name: self.name().to_owned(),
            }),
        }
    }

    /// The declared members of this object, in insertion order.
    pub fn members(&self) -> IndexMap<String, Node> {
        self.object().members()
    }

    /// Declared plus inherited members; for non-classes this equals
    /// [`Entity::members`].
    pub fn all_members(&self) -> Result<IndexMap<String, Node>> {
        match self {
            Entity::Class(class) => class.all_members(),
            _ => Ok(self.members()),
        }
    }

    /// Members inherited from base classes; empty for non-classes.
    pub fn inherited_members(&self) -> Result<IndexMap<String, Node>> {
        match self {
            Entity::Class(class) => class.inherited_members(),
            _ => Ok(IndexMap::new()),
        }
    }

    /// Members passing the given predicate.
    pub fn filter_members(
        &self,
        predicate: impl Fn(&str, &Node) -> bool,
    ) -> IndexMap<String, Node> {
        self.members()
            .into_iter()
            .filter(|(name, node)| predicate(name, node))
            .collect()
    }

    fn members_of_kind(&self, kind: Kind) -> Result<IndexMap<String, Node>> {
        let mut members = IndexMap::new();
        for (name, node) in self.all_members()? {
            if node.target()?.kind() == kind {
                members.insert(name, node);
            }
        }
        Ok(members)
    }

    pub fn folders(&self) -> Result<IndexMap<String, Node>> {
        self.members_of_kind(Kind::Folder)
    }

    pub fn namespaces(&self) -> Result<IndexMap<String, Node>> {
        self.members_of_kind(Kind::Namespace)
    }

    pub fn classes(&self) -> Result<IndexMap<String, Node>> {
        self.members_of_kind(Kind::Class)
    }

    pub fn functions(&self) -> Result<IndexMap<String, Node>> {
        self.members_of_kind(Kind::Function)
    }

    pub fn properties(&self) -> Result<IndexMap<String, Node>> {
        self.members_of_kind(Kind::Property)
    }

    pub fn enumerations(&self) -> Result<IndexMap<String, Node>> {
        self.members_of_kind(Kind::Enumeration)
    }

    /// Script members are never inherited, so this filters declared members
    /// only.
    pub fn scripts(&self) -> Result<IndexMap<String, Node>> {
        let mut members = IndexMap::new();
        for (name, node) in self.members() {
            if node.target()?.kind() == Kind::Script {
                members.insert(name, node);
            }
        }
        Ok(members)
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Entity::Folder(_))
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self, Entity::Namespace(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Entity::Class(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Entity::Function(_))
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Entity::Script(_))
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Entity::Property(_))
    }

    /// Whether this object sits under a `+internal` namespace.
    pub fn is_internal(&self) -> bool {
        self.filepath()
            .map(|path| path.components().any(|c| c.as_str() == INTERNAL_NAMESPACE))
            .unwrap_or(false)
    }

    /// Whether this object is hidden from ordinary listings.
    pub fn is_hidden(&self) -> bool {
        match self {
            Entity::Function(function) => function.flags.hidden || self.is_internal(),
            Entity::Property(property) => property.flags.hidden,
            _ => self.is_internal(),
        }
    }

    /// Whether this object has narrower than public access.
    pub fn is_private(&self) -> bool {
        match self {
            Entity::Function(function) => {
                function.flags.access != AccessKind::Public
                    && function.flags.access != AccessKind::Immutable
            }
            Entity::Property(property) => {
                property.flags.access != AccessKind::Public
                    || property.flags.get_access != AccessKind::Public
            }
            _ => false,
        }
    }

    /// The cached source lines of this object.
    ///
    /// Empty when the file was never parsed, or when the object carries no
    /// line range.
    pub fn lines(&self) -> Vec<String> {
        let Ok(filepath) = self.filepath() else {
            return Vec::new();
        };
        let Some(collection) = self.object().collection() else {
            return Vec::new();
        };
        let Some(lines) = collection.lines(&filepath) else {
            return Vec::new();
        };
        if self.is_namespace() {
            return lines;
        }
        match (self.lineno(), self.endlineno()) {
            (Some(lineno), Some(endlineno)) => lines
                .get(lineno - 1..endlineno)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// The dedented source text of this object.
    pub fn source(&self) -> String {
        dedent_lines(&self.lines()).join("\n")
    }

    /// Resolve a name in this object's scope chain to a dotted path.
    ///
    /// The name is looked up in the declared members, then in enclosing
    /// namespaces and folders.
    pub fn resolve(&self, name: &str) -> Result<String> {
        if let Some(member) = self.object().get_member(name) {
            return Ok(member.path());
        }
        match self.parent() {
            Some(parent) if parent.is_namespace() || parent.is_folder() => parent.resolve(name),
            _ => Err(Error::NameResolution {
                name: name.to_owned(),
                scope: self.path(),
            }),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Entity::Folder(_) => "Folder",
            Entity::Namespace(_) => "Namespace",
            Entity::Class(_) => "Class",
            Entity::Function(_) => "Function",
            Entity::Script(_) => "Script",
            Entity::Property(_) => "Property",
            Entity::Enumeration(_) => "Enumeration",
        };
        write!(f, "{variant}({:?})", self.name())
    }
}

/// What actually sits in a `members` map: a concrete entity, or an alias
/// that produces one on first access.
#[derive(Clone)]
pub enum Node {
    Entity(Entity),
    Alias(Arc<Alias>),
}

impl Node {
    /// Dereference to the concrete entity, materializing aliases.
    pub fn target(&self) -> Result<Entity> {
        match self {
            Node::Entity(entity) => Ok(entity.clone()),
            Node::Alias(alias) => alias.target(),
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, Node::Alias(_))
    }

    /// Whether this node projects an inherited class member.
    pub fn is_inherited(&self) -> bool {
        match self {
            Node::Entity(_) => false,
            Node::Alias(alias) => alias.is_inherited(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Node::Entity(entity) => entity.name().to_owned(),
            Node::Alias(alias) => alias.name().to_owned(),
        }
    }

    /// The kind of the node: the target's kind when known, otherwise
    /// [`Kind::Alias`].
    pub fn kind(&self) -> Kind {
        match self {
            Node::Entity(entity) => entity.kind(),
            Node::Alias(alias) => alias.kind(),
        }
    }

    /// The path of this node at its position in the tree.
    ///
    /// For an alias this is rooted at the alias's parent, not at the
    /// target's declaration site.
    pub fn path(&self) -> String {
        match self {
            Node::Entity(entity) => entity.path(),
            Node::Alias(alias) => alias.path(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Entity(entity) => entity.fmt(f),
            Node::Alias(alias) => write!(f, "Alias({:?} -> {:?})", alias.name(), alias.path()),
        }
    }
}

/// One declared function argument or return value.
#[derive(Clone, Debug)]
pub struct Argument {
    pub(crate) name: String,
    pub(crate) kind: ArgumentKind,
    pub(crate) ty: Option<Expr>,
    pub(crate) dimensions: Option<Vec<String>>,
    pub(crate) validators: Option<Expr>,
    pub(crate) default: Option<Expr>,
    pub(crate) docstring: Option<Docstring>,
}

impl Argument {
    pub(crate) fn new(name: impl Into<String>) -> Argument {
        let name = name.into();
        let kind = if name == "varargin" || name == "varargout" {
            ArgumentKind::Varargin
        } else {
            ArgumentKind::PositionalOnly
        };
        Argument {
            name,
            kind,
            ty: None,
            dimensions: None,
            validators: None,
            default: None,
            docstring: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ArgumentKind {
        self.kind
    }

    pub fn ty(&self) -> Option<&Expr> {
        self.ty.as_ref()
    }

    pub fn dimensions(&self) -> Option<&[String]> {
        self.dimensions.as_deref()
    }

    pub fn validators(&self) -> Option<&Expr> {
        self.validators.as_ref()
    }

    pub fn default(&self) -> Option<&Expr> {
        self.default.as_ref()
    }

    pub fn docstring(&self) -> Option<&Docstring> {
        self.docstring.as_ref()
    }

    /// Whether a caller must pass this argument.
    pub fn required(&self) -> bool {
        self.default.is_none()
    }
}

/// Arguments are equal when everything but their docstring matches.
impl PartialEq for Argument {
    fn eq(&self, other: &Argument) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.ty.as_ref().map(ToString::to_string)
                == other.ty.as_ref().map(ToString::to_string)
            && self.default.as_ref().map(ToString::to_string)
                == other.default.as_ref().map(ToString::to_string)
    }
}

impl Eq for Argument {}

/// An ordered argument list, indexable by position or name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Arguments {
    args: Vec<Argument>,
}

impl Arguments {
    pub(crate) fn new(args: Vec<Argument>) -> Arguments {
        Arguments { args }
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.args.iter().find(|arg| arg.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter()
    }

    pub(crate) fn remove_first(&mut self) -> Option<Argument> {
        if self.args.is_empty() {
            None
        } else {
            Some(self.args.remove(0))
        }
    }
}

impl Index<usize> for Arguments {
    type Output = Argument;

    fn index(&self, index: usize) -> &Argument {
        &self.args[index]
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entity(name: &str) -> Entity {
        Entity::Script(Arc::new(Script {
            object: Object::new(name),
        }))
    }

    #[test]
    fn canonical_path_without_parent_is_the_name() {
        assert_eq!(entity("lonely").canonical_path(), "lonely");
    }

    #[test]
    fn canonical_path_walks_parents() {
        let ns = Entity::Namespace(Arc::new(Namespace {
            object: Object::new("pkg"),
        }));
        let child = entity("util");
        child.object().set_parent(&ns);
        assert_eq!(child.canonical_path(), "pkg.util");
        assert_eq!(ns.path(), "+pkg");
        assert_eq!(child.path(), "pkg.util");
    }

    #[test]
    fn filepath_falls_back_to_parent() {
        let class = Entity::Class(Arc::new(Class {
            object: Object::new("Widget").with_filepath("src/@Widget/Widget.m"),
            bases: Vec::new(),
            flags: ClassFlags::default(),
        }));
        let method = entity("resize");
        method.object().set_parent(&class);
        assert_eq!(method.filepath().unwrap(), "src/@Widget/Widget.m");
    }

    #[test]
    fn filepath_errors_without_any_ancestor_path() {
        let orphan = entity("orphan");
        assert!(matches!(
            orphan.filepath(),
            Err(Error::FilePath { name }) if name == "orphan"
        ));
    }

    #[test]
    fn members_preserve_insertion_order() {
        let folder = Entity::Folder(Arc::new(Folder {
            object: Object::new("/src"),
        }));
        for name in ["zeta", "alpha", "mid"] {
            folder.object().insert_member(name, Node::Entity(entity(name)));
        }
        let names: Vec<String> = folder.members().keys().cloned().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn resolve_prefers_own_members() {
        let ns = Entity::Namespace(Arc::new(Namespace {
            object: Object::new("pkg"),
        }));
        let class = entity("Widget");
        ns.object().insert_member("Widget", Node::Entity(class.clone()));
        class.object().set_parent(&ns);
        assert_eq!(class.resolve("Widget").unwrap(), "pkg.Widget");
        assert!(matches!(
            class.resolve("missing"),
            Err(Error::NameResolution { .. })
        ));
    }

    #[test]
    fn argument_equality_ignores_docstring() {
        let mut a = Argument::new("x");
        let mut b = Argument::new("x");
        a.docstring = Some(crate::docstring::Docstring::new("documented"));
        assert_eq!(a, b);
        b.kind = ArgumentKind::Optional;
        assert_ne!(a, b);
    }

    #[test]
    fn varargin_is_classified_by_name() {
        assert_eq!(Argument::new("varargin").kind(), ArgumentKind::Varargin);
        assert_eq!(Argument::new("varargout").kind(), ArgumentKind::Varargin);
        assert_eq!(Argument::new("x").kind(), ArgumentKind::PositionalOnly);
    }

    #[test]
    fn arguments_index_by_name_and_position() {
        let args = Arguments::new(vec![Argument::new("a"), Argument::new("b")]);
        assert_eq!(args[1].name(), "b");
        assert_eq!(args.get("a").unwrap().name(), "a");
        assert!(args.get("missing").is_none());
        assert_eq!(args.len(), 2);
    }
}
