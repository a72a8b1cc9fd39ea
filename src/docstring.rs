// Copyright 2024 - 2026 Martin Pool

//! Turn captured comment blocks into docstrings.
//!
//! MATLAB has no first-class docstrings; by convention the leading comment
//! block of a file, function, class, property, or argument documents it.
//! The rules implemented here:
//!
//! - Contiguous `%`-prefixed lines form one block; a gap of more than one
//!   blank line between comment nodes ends the block.
//! - `%{ ... %}` opens a multi-line comment that ends at `%}` (text on the
//!   closing line before the marker is kept).
//! - A `%%` section header contributes the rest of its line.
//! - Compiler pragmas (`%#codegen` and friends) and snippet markers
//!   (`--8<--`) never reach the docstring.
//! - The result is dedented by the common leading whitespace of its
//!   non-blank lines.

use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;

/// A single pragma line, matched exactly after leading whitespace is
/// stripped.
fn pragma_re() -> &'static Regex {
    static PRAGMA_RE: OnceLock<Regex> = OnceLock::new();
    PRAGMA_RE.get_or_init(|| {
        Regex::new(r"^%#(codegen|eml|external|exclude|function|ok|mex)$").unwrap()
    })
}

const SNIPPET_MARKER: &str = "--8<--";

/// A documentation block attached to an object, with its source location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Docstring {
    value: String,
    lineno: Option<usize>,
    endlineno: Option<usize>,
}

impl Docstring {
    /// A docstring with no source location, e.g. lifted from a `README.md`.
    pub fn new(value: impl Into<String>) -> Docstring {
        Docstring {
            value: value.into(),
            lineno: None,
            endlineno: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 1-based first line of the comment block, if it came from a file.
    pub fn lineno(&self) -> Option<usize> {
        self.lineno
    }

    /// 1-based last line (inclusive) of the comment block.
    pub fn endlineno(&self) -> Option<usize> {
        self.endlineno
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// One decoded comment node from the syntax tree.
#[derive(Clone, Debug)]
pub(crate) struct CommentBlock {
    /// Decoded text of the node, possibly spanning several lines.
    pub text: String,
    /// 1-based starting row.
    pub lineno: usize,
    /// 1-based ending row (inclusive).
    pub endlineno: usize,
}

/// A line inside a comment node that does not start with `%`.
///
/// This means the captures handed in were not comments, which the caller
/// reports as a parse error.
#[derive(Debug)]
pub(crate) struct NotAComment {
    pub line: String,
    pub lineno: usize,
}

/// Extract a docstring from consecutive comment nodes.
///
/// Only the first run of nodes separated by at most one blank line is
/// considered; anything after a wider gap is a separate comment.
pub(crate) fn from_comments(
    nodes: &[CommentBlock],
) -> Result<Option<Docstring>, NotAComment> {
    if nodes.is_empty() {
        return Ok(None);
    }
    let first_gap = nodes
        .iter()
        .tuple_windows()
        .position(|(previous, next)| next.lineno > previous.endlineno + 1);
    let nodes = match first_gap {
        Some(i) => &nodes[..=i],
        None => nodes,
    };
    let lineno = nodes[0].lineno;
    let endlineno = nodes.last().unwrap().endlineno;
    let mut lines = nodes
        .iter()
        .flat_map(|node| node.text.lines().map(str::to_owned))
        .collect::<Vec<String>>()
        .into_iter();

    let mut docstring: Vec<String> = Vec::new();
    let mut uncommented: Vec<String> = Vec::new();

    while let Some(raw) = lines.next() {
        let line = raw.trim_start();

        if pragma_re().is_match(line) || line.contains(SNIPPET_MARKER) {
            continue;
        }

        if line.starts_with("%{") || line.starts_with("%%") {
            if !uncommented.is_empty() {
                docstring.extend(dedent_lines(&uncommented));
                uncommented.clear();
            }
            if line.starts_with("%%") {
                docstring.push(line[2..].trim_start().to_owned());
                continue;
            }
            // Multi-line %{ ... %} block. Lines inside keep their raw
            // indentation until the whole block is dedented.
            let mut block: Vec<String> = Vec::new();
            let mut line = line[2..].to_owned();
            loop {
                if let Some(end) = line.find("%}") {
                    if end > 0 {
                        block.push(line[..end].to_owned());
                    }
                    break;
                }
                block.push(line);
                match lines.next() {
                    Some(next) => line = next,
                    None => break,
                }
            }
            if let Some((first, rest)) = block.split_first() {
                docstring.push(first.clone());
                docstring.extend(dedent_lines(rest));
            }
        } else if let Some(rest) = line.strip_prefix('%') {
            uncommented.push(rest.to_owned());
        } else {
            return Err(NotAComment {
                line: line.to_owned(),
                lineno,
            });
        }
    }
    if !uncommented.is_empty() {
        docstring.extend(dedent_lines(&uncommented));
    }

    Ok(Some(Docstring {
        value: docstring.join("\n"),
        lineno: Some(lineno),
        endlineno: Some(endlineno),
    }))
}

/// Remove the common leading whitespace of the non-blank lines.
pub(crate) fn dedent_lines(lines: &[String]) -> Vec<String> {
    let margin = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.len() >= margin {
                line[margin..].to_owned()
            } else {
                line.trim_start().to_owned()
            }
        })
        .collect()
}
