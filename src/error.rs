// Copyright 2024 - 2026 Martin Pool

//! The closed set of errors raised by the collection and the parser.
//!
//! There is deliberately no hierarchy: every failure the core can signal is
//! one variant of [`Error`], and callers match on the kind they care about.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Any error raised while collecting or materializing MATLAB objects.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A path was registered in the collection but no longer exists on disk
    /// at the time it is materialized.
    #[error("path does not exist: {path}")]
    FileNotFound { path: Utf8PathBuf },

    /// An alias chain revisited a path while being unwrapped.
    ///
    /// The chain lists every target path seen before the repeat, in order,
    /// ending with the repeated path.
    #[error("cyclic aliases detected:\n  {}", chain.join("\n  "))]
    CyclicAlias { chain: Vec<String> },

    /// C3 linearization encountered a class that is already part of the
    /// inheritance chain being walked.
    #[error("cannot compute C3 linearization, inheritance cycle detected: {}", chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    /// An object without a file path was asked for one and no ancestor
    /// supplies it either.
    #[error("object {name} has no file path")]
    FilePath { name: String },

    /// `resolve` exhausted the scope chain without finding the name.
    #[error("{name} could not be resolved in the scope of {scope}")]
    NameResolution { name: String, scope: String },

    /// The tree-sitter traversal of a source file failed.
    ///
    /// Line and column are 1-based and point at the most recently visited
    /// node; `text` is the offending source fragment.
    #[error("error parsing MATLAB file {path}:{line}:{column}: {text}")]
    Parse {
        path: Utf8PathBuf,
        line: usize,
        column: usize,
        text: String,
    },

    /// The caller passed a search-path root that cannot be used: not valid
    /// UTF-8, or not a directory.
    #[error("invalid search path root: {path:?}")]
    InvalidRoot { path: std::path::PathBuf },
}

impl Error {
    /// The file the error is about, when it names one.
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Error::FileNotFound { path } | Error::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn cyclic_alias_message_lists_the_chain() {
        let err = Error::CyclicAlias {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "cyclic aliases detected:\n  a\n  b\n  a"
        );
    }

    #[test]
    fn inheritance_cycle_message_uses_arrows() {
        let err = Error::InheritanceCycle {
            chain: vec!["C".into(), "A".into(), "C".into()],
        };
        assert_eq!(
            err.to_string(),
            "cannot compute C3 linearization, inheritance cycle detected: C -> A -> C"
        );
    }

    #[test]
    fn parse_error_carries_position() {
        let err = Error::Parse {
            path: "foo.m".into(),
            line: 3,
            column: 7,
            text: "function".into(),
        };
        assert_eq!(err.path().unwrap(), "foo.m");
        assert!(err.to_string().contains("foo.m:3:7"));
    }
}
