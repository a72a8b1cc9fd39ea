// Copyright 2024 - 2026 Martin Pool

//! Parse one MATLAB source file into its object model.
//!
//! Parsing runs the tree-sitter MATLAB grammar once per file and then a
//! small fixed set of queries over the syntax tree; the grammar is consumed
//! only through the query/capture API. Queries are compiled once and cached
//! in statics. All captured text is decoded eagerly so nothing borrows the
//! tree after [`FileParser::parse`] returns.
//!
//! MATLAB addresses a file's unit by the file name, so the top-level
//! function or class takes its name from the file stem; captured
//! identifiers name methods only.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use chardetng::EncodingDetector;
use indexmap::IndexMap;
use tracing::trace;
use tree_sitter::{Language, Node as TsNode, Parser, Query, QueryCursor, StreamingIterator};

use crate::collection::CollectionHandle;
use crate::docstring::{self, CommentBlock, Docstring};
use crate::error::Error;
use crate::expr::Expr;
use crate::kind::{AccessKind, ArgumentKind};
use crate::objects::{
    Argument, Arguments, Class, ClassFlags, Entity, Enumeration, Function, MethodFlags, Node,
    Object, Property, PropertyFlags, Script,
};
use crate::Result;

fn language() -> &'static Language {
    static LANGUAGE: OnceLock<Language> = OnceLock::new();
    LANGUAGE.get_or_init(|| tree_sitter_matlab::LANGUAGE.into())
}

/// Compile a query once; the S-expressions are fixed strings, so failure is
/// a bug, not a runtime condition.
macro_rules! query {
    ($name:ident, $source:literal) => {
        fn $name() -> &'static Query {
            static QUERY: OnceLock<Query> = OnceLock::new();
            QUERY.get_or_init(|| {
                Query::new(language(), $source)
                    .expect(concat!(stringify!($name), " is well-formed"))
            })
        }
    };
}

query!(
    file_query,
    r#"(source_file .
    (comment)* @header .
    [
        (function_definition) @function
        (class_definition) @type
    ]?
)
"#
);

query!(
    function_query,
    r#"(function_definition .
    ("function")
    (function_output .
        [
            (identifier) @output
            (multioutput_variable .
                [
                    (identifier) @output
                    _
                ]*
            )
        ]
    )?
    [
        ("set.") @setter
        ("get.") @getter
    ]?
    (identifier) @name
    (function_arguments .
        [
            (identifier) @input
            _
        ]*
    )?
    (comment)* @docstring
    (arguments_statement)* @arguments
)"#
);

query!(
    arguments_query,
    r#"(arguments_statement .
    ("arguments")
    (attributes
        (identifier) @attributes
    )?
    (comment)?
    ("\n")?
    (property)+ @arguments
)"#
);

query!(
    property_query,
    r#"(property .
    [
        (identifier) @name
        (property_name
            (identifier) @options .
            (".") .
            (identifier) @name
        )
    ]
    (dimensions
        [
            (number) @dimensions
            (spread_operator) @dimensions
            _
        ]*
    )?
    [
        (identifier)
        (property_name)
    ]? @type
    (validation_functions)? @validators
    (default_value
        ("=")
        _+ @default
    )?
    (comment)* @comment
)"#
);

query!(
    attribute_query,
    r#"(attribute
    (identifier) @name
    (
        ("=")
        _+ @value
    )?
)"#
);

query!(
    class_query,
    r#"("classdef" .
    (attributes
        (attribute) @attributes
    )?
    (identifier) @name
    (superclasses
        (property_name) @bases
    )? .
    (comment)* @docstring
    ("\n")?
    [
        (comment)
        (methods) @methods
        (properties) @properties
        (enumeration) @enumeration
    ]*
)"#
);

query!(
    methods_query,
    r#"("methods" .
    (attributes
        (attribute) @attributes
    )? .
    (
        ("\n")* .
        (function_definition)* @methods
    )*
)"#
);

query!(
    properties_query,
    r#"("properties" .
    (attributes
        (attribute) @attributes
    )? .
    (
        ("\n")* .
        (property)* @properties
    )*
)"#
);

query!(
    enumerations_query,
    r#"("enumeration" .
    (
        ("\n")* .
        (enum
            (identifier) @content
            (
                ("(")
                (_)+ @content
                (")")
            )?
        ) .
        ("\n")* .
        (comment)* @content
    )*
)"#
);

/// Captured nodes grouped by capture name.
type Captures<'t> = HashMap<&'static str, Vec<TsNode<'t>>>;

/// Run a query over a node's subtree and merge the captures of every match.
///
/// A node captured by several overlapping matches is kept once.
fn all_captures<'t>(query: &'static Query, node: TsNode<'t>, source: &[u8]) -> Captures<'t> {
    let names = query.capture_names();
    let mut captures: Captures = HashMap::new();
    let mut seen: HashSet<(u32, usize)> = HashSet::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, node, source);
    while let Some(found) = matches.next() {
        for capture in found.captures {
            if seen.insert((capture.index, capture.node.id())) {
                captures
                    .entry(names[capture.index as usize])
                    .or_default()
                    .push(capture.node);
            }
        }
    }
    captures
}

/// Like [`all_captures`], but only the first match.
fn first_match_captures<'t>(
    query: &'static Query,
    node: TsNode<'t>,
    source: &[u8],
) -> Option<Captures<'t>> {
    let names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, node, source);
    matches.next().map(|found| {
        let mut captures: Captures = HashMap::new();
        for capture in found.captures {
            captures
                .entry(names[capture.index as usize])
                .or_default()
                .push(capture.node);
        }
        captures
    })
}

fn sorted_nodes<'t>(captures: &Captures<'t>, key: &str) -> Vec<TsNode<'t>> {
    let mut nodes = captures.get(key).cloned().unwrap_or_default();
    nodes.sort_by_key(TsNode::start_byte);
    nodes
}

fn strtobool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// The value of a `(name = value)` attribute.
enum AttrValue {
    /// Bare attribute, implicitly true.
    Flag,
    Bool(bool),
    Text(String),
}

impl AttrValue {
    fn as_bool(&self) -> bool {
        match self {
            AttrValue::Flag => true,
            AttrValue::Bool(value) => *value,
            AttrValue::Text(text) => !text.is_empty(),
        }
    }

    fn as_text(&self) -> &str {
        match self {
            AttrValue::Text(text) => text,
            _ => "",
        }
    }
}

/// Parses one MATLAB file into a function, class, or script entity.
pub struct FileParser {
    filepath: Utf8PathBuf,
    encoding: &'static str,
    content: String,
}

impl FileParser {
    /// Read and decode a file, sniffing its charset; defaults to UTF-8.
    pub fn new(filepath: &Utf8Path) -> Result<FileParser> {
        let bytes = std::fs::read(filepath).map_err(|_| Error::FileNotFound {
            path: filepath.to_owned(),
        })?;
        let mut detector = EncodingDetector::new();
        detector.feed(&bytes, true);
        let encoding = detector.guess(None, true);
        let (content, _, _) = encoding.decode(&bytes);
        Ok(FileParser {
            filepath: filepath.to_owned(),
            encoding: encoding.name(),
            content: content.into_owned(),
        })
    }

    /// The decoded file content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The detected encoding name, e.g. `UTF-8`.
    pub fn encoding(&self) -> &str {
        self.encoding
    }

    pub(crate) fn content_lines(&self) -> Vec<String> {
        self.content.split('\n').map(ToOwned::to_owned).collect()
    }

    fn stem(&self) -> &str {
        self.filepath.file_stem().unwrap_or_default()
    }

    fn source(&self) -> &[u8] {
        self.content.as_bytes()
    }

    /// Parse the file into its top-level entity.
    ///
    /// A file is a function if it opens with a `function` definition, a
    /// class if it opens with `classdef`, and a script otherwise. The
    /// leading comment block becomes the docstring when the unit declares
    /// none itself.
    pub fn parse(&self) -> Result<Entity> {
        self.parse_with_collection(None)
    }

    pub(crate) fn parse_with_collection(
        &self,
        collection: Option<CollectionHandle>,
    ) -> Result<Entity> {
        let mut parser = Parser::new();
        parser.set_language(language()).map_err(|err| Error::Parse {
            path: self.filepath.clone(),
            line: 1,
            column: 1,
            text: err.to_string(),
        })?;
        let tree = parser
            .parse(self.source(), None)
            .ok_or_else(|| Error::Parse {
                path: self.filepath.clone(),
                line: 1,
                column: 1,
                text: "tree-sitter could not parse the file".to_owned(),
            })?;
        let root = tree.root_node();
        let captures = all_captures(file_query(), root, self.source());

        let entity = if let Some(node) = captures.get("function").and_then(|nodes| nodes.first()) {
            Entity::Function(self.parse_function(*node, None, &collection)?)
        } else if let Some(node) = captures.get("type").and_then(|nodes| nodes.first()) {
            Entity::Class(self.parse_class(*node, &collection)?)
        } else {
            let object = Object::new(self.stem())
                .with_filepath(&self.filepath)
                .with_collection(collection.clone());
            Entity::Script(Arc::new(Script { object }))
        };

        if !entity.has_docstring() {
            let header = self.comment_docstring(&sorted_nodes(&captures, "header"))?;
            entity.object().set_docstring(header);
        }
        Ok(entity)
    }

    /// Parse a `classdef` node: attributes, bases, docstring, then the
    /// enumeration, properties, and methods blocks in source order.
    fn parse_class(
        &self,
        node: TsNode<'_>,
        collection: &Option<CollectionHandle>,
    ) -> Result<Arc<Class>> {
        let captures = all_captures(class_query(), node, self.source());

        let bases = self.capture_texts(&captures, "bases")?;
        let docstring = self.comment_docstring(&sorted_nodes(&captures, "docstring"))?;
        let mut flags = ClassFlags::default();
        for attribute in sorted_nodes(&captures, "attributes") {
            let (key, value) = self.parse_attribute(attribute)?;
            match key.as_str() {
                "Abstract" => flags.is_abstract = value.as_bool(),
                "Hidden" => flags.hidden = value.as_bool(),
                "Sealed" => flags.sealed = value.as_bool(),
                _ => {}
            }
        }

        let object = Object::new(self.stem())
            .with_location(node.start_position().row + 1, node.end_position().row + 1)
            .with_filepath(&self.filepath)
            .with_docstring(docstring)
            .with_collection(collection.clone());
        let class = Arc::new(Class {
            object,
            bases,
            flags,
        });
        let entity = Entity::Class(Arc::clone(&class));

        for block in sorted_nodes(&captures, "enumeration") {
            self.parse_enumeration_block(block, &entity, collection)?;
        }
        for block in sorted_nodes(&captures, "properties") {
            self.parse_properties_block(block, &entity, collection)?;
        }
        for block in sorted_nodes(&captures, "methods") {
            self.parse_methods_block(block, &entity, &class, collection)?;
        }
        Ok(class)
    }

    /// One `enumeration ... end` block. A value expression and trailing
    /// comments belong to the identifier before them; the last entry is
    /// flushed when the block ends.
    fn parse_enumeration_block(
        &self,
        block: TsNode<'_>,
        class: &Entity,
        collection: &Option<CollectionHandle>,
    ) -> Result<()> {
        let captures = all_captures(enumerations_query(), block, self.source());
        let mut identifier: Option<String> = None;
        let mut comments: Vec<TsNode> = Vec::new();
        let mut values: Vec<TsNode> = Vec::new();
        for node in sorted_nodes(&captures, "content") {
            match node.kind() {
                "identifier" => {
                    if let Some(name) = identifier.take() {
                        self.add_enumeration(class, name, &comments, &values, collection)?;
                        comments.clear();
                        values.clear();
                    }
                    identifier = Some(self.node_text(node)?);
                }
                "comment" => comments.push(node),
                _ => values.push(node),
            }
        }
        if let Some(name) = identifier {
            self.add_enumeration(class, name, &comments, &values, collection)?;
        }
        Ok(())
    }

    fn add_enumeration(
        &self,
        class: &Entity,
        name: String,
        comments: &[TsNode<'_>],
        values: &[TsNode<'_>],
        collection: &Option<CollectionHandle>,
    ) -> Result<()> {
        let docstring = if comments.is_empty() {
            None
        } else {
            self.comment_docstring(comments)?
        };
        let value = if values.is_empty() {
            None
        } else {
            Some(self.expr(values)?)
        };
        let object = Object::new(&name)
            .with_docstring(docstring)
            .with_collection(collection.clone());
        let enumeration = Arc::new(Enumeration { object, value });
        enumeration.object.set_parent(class);
        class
            .object()
            .insert_member(name, Node::Entity(Entity::Enumeration(enumeration)));
        Ok(())
    }

    /// One `properties ... end` block with its attributes.
    fn parse_properties_block(
        &self,
        block: TsNode<'_>,
        class: &Entity,
        collection: &Option<CollectionHandle>,
    ) -> Result<()> {
        let captures = all_captures(properties_query(), block, self.source());
        let mut flags = PropertyFlags::default();
        for attribute in sorted_nodes(&captures, "attributes") {
            let (key, value) = self.parse_attribute(attribute)?;
            match key.as_str() {
                "AbortSet" => flags.abort_set = value.as_bool(),
                "Abstract" => flags.is_abstract = value.as_bool(),
                "Constant" => flags.constant = value.as_bool(),
                "Dependent" => flags.dependent = value.as_bool(),
                "GetObservable" => flags.get_observable = value.as_bool(),
                "Hidden" => flags.hidden = value.as_bool(),
                "NonCopyable" => flags.non_copyable = value.as_bool(),
                "SetObservable" => flags.set_observable = value.as_bool(),
                "Transient" => flags.transient = value.as_bool(),
                "WeakHandle" => flags.weak_handle = value.as_bool(),
                "Access" => flags.access = AccessKind::from_attribute(value.as_text()),
                "GetAccess" => flags.get_access = AccessKind::from_attribute(value.as_text()),
                "SetAccess" => flags.set_access = AccessKind::from_attribute(value.as_text()),
                _ => {}
            }
        }
        for node in sorted_nodes(&captures, "properties") {
            let captures = all_captures(property_query(), node, self.source());
            let name = self.first_capture_text(&captures, "name", node)?;
            let object = Object::new(&name)
                .with_docstring(self.comment_docstring(&sorted_nodes(&captures, "comment"))?)
                .with_collection(collection.clone());
            let property = Arc::new(Property {
                object,
                ty: self.optional_expr(&captures, "type")?,
                dimensions: self.optional_texts(&captures, "dimensions")?,
                validators: self.optional_expr(&captures, "validators")?,
                default: self.optional_expr(&captures, "default")?,
                flags,
                getter: RwLock::new(None),
                setter: RwLock::new(None),
            });
            property.object.set_parent(class);
            class
                .object()
                .insert_member(name, Node::Entity(Entity::Property(property)));
        }
        Ok(())
    }

    /// One `methods ... end` block with its attributes. `get.`/`set.`
    /// accessors bind to the property of the same name instead of becoming
    /// members.
    fn parse_methods_block(
        &self,
        block: TsNode<'_>,
        class_entity: &Entity,
        class: &Arc<Class>,
        collection: &Option<CollectionHandle>,
    ) -> Result<()> {
        let captures = all_captures(methods_query(), block, self.source());
        let mut flags = MethodFlags::default();
        for attribute in sorted_nodes(&captures, "attributes") {
            let (key, value) = self.parse_attribute(attribute)?;
            match key.as_str() {
                "Abstract" => flags.is_abstract = value.as_bool(),
                "Hidden" => flags.hidden = value.as_bool(),
                "Sealed" => flags.sealed = value.as_bool(),
                "Static" => flags.is_static = value.as_bool(),
                "Access" => flags.access = AccessKind::from_attribute(value.as_text()),
                _ => {}
            }
        }
        for node in sorted_nodes(&captures, "methods") {
            let method = self.parse_function(node, Some(flags), collection)?;
            let name = method.object.name().to_owned();
            // The first positional argument of a non-static, non-constructor
            // method is the implicit instance.
            if name != self.stem() && !method.is_static() && !method.arguments().is_empty() {
                method.remove_leading_argument();
            }
            method.object.set_parent(class_entity);
            if (method.is_getter() || method.is_setter()) && class.object.contains_member(&name) {
                if let Some(Node::Entity(Entity::Property(property))) =
                    class.object.get_member(&name)
                {
                    if method.is_getter() {
                        property.bind_getter(method);
                    } else {
                        property.bind_setter(method);
                    }
                }
                // An accessor that shadows a non-property member may belong
                // to an inherited property; it is dropped here either way.
            } else {
                class
                    .object
                    .insert_member(name, Node::Entity(Entity::Function(method)));
            }
        }
        Ok(())
    }

    /// Parse a `function` definition, top-level or method.
    ///
    /// `method_flags` is `Some` for methods, which take their name from the
    /// captured identifier; top-level functions are named by the file stem.
    fn parse_function(
        &self,
        node: TsNode<'_>,
        method_flags: Option<MethodFlags>,
        collection: &Option<CollectionHandle>,
    ) -> Result<Arc<Function>> {
        let captures = first_match_captures(function_query(), node, self.source())
            .ok_or_else(|| self.syntax_error(node, "not a function definition"))?;

        let mut arguments: IndexMap<String, Argument> = IndexMap::new();
        for name in self.capture_texts(&captures, "input")? {
            arguments.insert(name.clone(), Argument::new(name));
        }
        let mut returns: IndexMap<String, Argument> = IndexMap::new();
        for name in self.capture_texts(&captures, "output")? {
            returns.insert(name.clone(), Argument::new(name));
        }

        let name = if method_flags.is_some() {
            self.first_capture_text(&captures, "name", node)?
        } else {
            self.stem().to_owned()
        };
        let docstring = self.comment_docstring(&sorted_nodes(&captures, "docstring"))?;
        let is_getter = captures.contains_key("getter");
        let is_setter = captures.contains_key("setter");

        for block in sorted_nodes(&captures, "arguments") {
            self.parse_arguments_block(block, &mut arguments, &mut returns)?;
        }

        let object = Object::new(name)
            .with_location(node.start_position().row + 1, node.end_position().row + 1)
            .with_filepath(&self.filepath)
            .with_docstring(docstring)
            .with_collection(collection.clone());
        Ok(Arc::new(Function {
            object,
            arguments: RwLock::new(Arguments::new(arguments.into_values().collect())),
            returns: RwLock::new(Arguments::new(returns.into_values().collect())),
            flags: method_flags.unwrap_or_default(),
            is_getter,
            is_setter,
        }))
    }

    /// One `arguments ... end` block, refining the declared inputs or
    /// outputs.
    ///
    /// An `options.NAME` qualifier declares a keyword-only argument and
    /// removes the `options` positional placeholder. A declaration naming
    /// neither a known input nor an `options.` qualifier refines nothing
    /// and is dropped.
    fn parse_arguments_block(
        &self,
        block: TsNode<'_>,
        arguments: &mut IndexMap<String, Argument>,
        returns: &mut IndexMap<String, Argument>,
    ) -> Result<()> {
        let captures = all_captures(arguments_query(), block, self.source());
        let attributes = self.capture_texts(&captures, "attributes")?;
        let is_input = attributes.is_empty()
            || attributes.iter().any(|a| a == "Input")
            || !attributes.iter().any(|a| a == "Output");

        for node in sorted_nodes(&captures, "arguments") {
            let captures = all_captures(property_query(), node, self.source());
            let name = self.first_capture_text(&captures, "name", node)?;
            let has_default = captures.contains_key("default");
            if captures.contains_key("options") {
                let options_name = self.first_capture_text(&captures, "options", node)?;
                arguments.shift_remove(&options_name);
                let mut argument = Argument::new(&name);
                argument.kind = ArgumentKind::KeywordOnly;
                self.refine_argument(&mut argument, &captures)?;
                arguments.insert(name, argument);
            } else {
                let map = if is_input { &mut *arguments } else { &mut *returns };
                let Some(argument) = map.get_mut(&name) else {
                    trace!("arguments block entry {name} does not match a declared name");
                    continue;
                };
                argument.kind = if argument.kind == ArgumentKind::Varargin {
                    ArgumentKind::Varargin
                } else if has_default {
                    ArgumentKind::Optional
                } else {
                    ArgumentKind::PositionalOnly
                };
                self.refine_argument(argument, &captures)?;
            }
        }
        Ok(())
    }

    /// Copy the validated-declaration fields onto an argument.
    fn refine_argument(&self, argument: &mut Argument, captures: &Captures<'_>) -> Result<()> {
        if captures.contains_key("dimensions") {
            argument.dimensions = self.optional_texts(captures, "dimensions")?;
        }
        if captures.contains_key("type") {
            argument.ty = self.optional_expr(captures, "type")?;
        }
        if captures.contains_key("validators") {
            argument.validators = self.optional_expr(captures, "validators")?;
        }
        if captures.contains_key("default") {
            argument.default = self.optional_expr(captures, "default")?;
        }
        if let Some(docstring) = self.comment_docstring(&sorted_nodes(captures, "comment"))? {
            if !docstring.is_empty() {
                argument.docstring = Some(docstring);
            }
        }
        Ok(())
    }

    /// Parse one `(name)` or `(name = value)` attribute node.
    fn parse_attribute(&self, node: TsNode<'_>) -> Result<(String, AttrValue)> {
        let captures = all_captures(attribute_query(), node, self.source());
        let key = self.first_capture_text(&captures, "name", node)?;
        let value = match captures.get("value") {
            None => AttrValue::Flag,
            Some(nodes) if nodes.first().map(TsNode::kind) == Some("boolean") => {
                AttrValue::Bool(strtobool(&self.first_capture_text(&captures, "value", node)?))
            }
            Some(_) => AttrValue::Text(self.first_capture_text(&captures, "value", node)?),
        };
        Ok((key, value))
    }

    /// Build a docstring from captured comment nodes.
    fn comment_docstring(&self, nodes: &[TsNode<'_>]) -> Result<Option<Docstring>> {
        if nodes.is_empty() {
            return Ok(None);
        }
        let blocks = nodes
            .iter()
            .map(|node| {
                Ok(CommentBlock {
                    text: self.node_text(*node)?,
                    lineno: node.start_position().row + 1,
                    endlineno: node.end_position().row + 1,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        docstring::from_comments(&blocks).map_err(|err| Error::Parse {
            path: self.filepath.clone(),
            line: err.lineno,
            column: 1,
            text: err.line,
        })
    }

    fn node_text(&self, node: TsNode<'_>) -> Result<String> {
        self.content
            .get(node.byte_range())
            .map(ToOwned::to_owned)
            .ok_or_else(|| self.syntax_error(node, "node range outside the source"))
    }

    fn capture_texts(&self, captures: &Captures<'_>, key: &str) -> Result<Vec<String>> {
        captures
            .get(key)
            .map(|nodes| nodes.iter().map(|node| self.node_text(*node)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn first_capture_text(
        &self,
        captures: &Captures<'_>,
        key: &str,
        context: TsNode<'_>,
    ) -> Result<String> {
        match captures.get(key).and_then(|nodes| nodes.first()) {
            Some(node) => self.node_text(*node),
            None => Err(self.syntax_error(context, &format!("missing @{key} capture"))),
        }
    }

    fn optional_texts(&self, captures: &Captures<'_>, key: &str) -> Result<Option<Vec<String>>> {
        if captures.contains_key(key) {
            Ok(Some(self.capture_texts(captures, key)?))
        } else {
            Ok(None)
        }
    }

    fn expr(&self, nodes: &[TsNode<'_>]) -> Result<Expr> {
        let mut sorted = nodes.to_vec();
        sorted.sort_by_key(TsNode::start_byte);
        Ok(Expr::new(
            sorted
                .iter()
                .map(|node| self.node_text(*node))
                .collect::<Result<Vec<_>>>()?,
        ))
    }

    fn optional_expr(&self, captures: &Captures<'_>, key: &str) -> Result<Option<Expr>> {
        match captures.get(key) {
            Some(nodes) => Ok(Some(self.expr(nodes)?)),
            None => Ok(None),
        }
    }

    /// A parse error pointing at the given node.
    fn syntax_error(&self, node: TsNode<'_>, message: &str) -> Error {
        let fragment = self
            .content
            .get(node.byte_range())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| message.to_owned());
        Error::Parse {
            path: self.filepath.clone(),
            line: node.start_position().row + 1,
            column: node.start_position().column + 1,
            text: fragment,
        }
    }
}
