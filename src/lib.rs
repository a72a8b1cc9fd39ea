// Copyright 2024 - 2026 Martin Pool

//! Parse MATLAB source trees into a lazily materialized, queryable object
//! graph.
//!
//! A [`PathsCollection`] mirrors MATLAB's own path semantics: it discovers
//! every addressable code unit under a set of root directories — plain
//! folders, `+namespace` and `@class` directories, functions, classes,
//! scripts — and resolves identifiers with the same shadowing rules as
//! `addpath`/`which`. Files are parsed on first access, through tree-sitter
//! queries, into typed entities with docstrings, arguments, properties,
//! and C3-linearized method resolution order.
//!
//! ```no_run
//! use matmap::PathsCollection;
//!
//! let collection = PathsCollection::new(["toolbox/src"], true)?;
//! let widget = collection.get("pkg.Widget")?.expect("Widget is on the path");
//! for (name, member) in widget.members() {
//!     println!("{name}: {}", member.target()?.kind());
//! }
//! # Ok::<(), matmap::Error>(())
//! ```

mod alias;
mod c3;
mod collection;
mod docstring;
mod error;
mod expr;
mod kind;
mod objects;
mod parser;
mod resolver;
mod walk;

pub use alias::Alias;
pub use collection::PathsCollection;
pub use docstring::Docstring;
pub use error::Error;
pub use expr::Expr;
pub use kind::{AccessKind, ArgumentKind, Kind};
pub use objects::{
    Argument, Arguments, Class, ClassFlags, Entity, Enumeration, Folder, Function, MethodFlags,
    Namespace, Node, Object, Property, PropertyFlags, Script,
};
pub use parser::FileParser;

/// A `Result` bound to this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
