// Copyright 2024 - 2026 Martin Pool

//! Closed enumerations describing MATLAB code elements.

use serde::Serialize;
use strum::{Display, EnumString};

/// The kind of a collected MATLAB object.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A directory on the search path that is neither a namespace nor a
    /// class folder.
    Folder,
    /// A `+name` directory.
    Namespace,
    /// A `classdef` unit.
    Class,
    /// A function or method.
    Function,
    /// A file with no top-level function or classdef.
    Script,
    /// A class property.
    Property,
    /// A class enumeration member.
    Enumeration,
    /// An unresolved indirection.
    Alias,
}

/// How a function argument can be passed.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq, Serialize)]
pub enum ArgumentKind {
    #[strum(serialize = "positional-only")]
    #[serde(rename = "positional-only")]
    PositionalOnly,
    /// Positional with a default value.
    #[strum(serialize = "optional")]
    #[serde(rename = "optional")]
    Optional,
    /// Declared through an `options.NAME` qualifier in an arguments block.
    #[strum(serialize = "keyword-only")]
    #[serde(rename = "keyword-only")]
    KeywordOnly,
    /// The trailing `varargin`/`varargout` catch-all.
    #[strum(serialize = "varargin")]
    #[serde(rename = "varargin")]
    Varargin,
}

/// Access level of a method or property.
#[derive(Clone, Copy, Debug, Default, Display, EnumString, Eq, Hash, PartialEq, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    #[default]
    Public,
    Protected,
    Private,
    Immutable,
}

impl AccessKind {
    /// Map an attribute value to an access kind.
    ///
    /// MATLAB also allows a class list as an access value; anything that is
    /// not one of the four keywords degrades to `Private`.
    pub fn from_attribute(value: &str) -> AccessKind {
        value.parse().unwrap_or(AccessKind::Private)
    }
}
