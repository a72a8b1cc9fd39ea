// Copyright 2024 - 2026 Martin Pool

//! Opaque source expressions captured from the syntax tree.
//!
//! Types, validators, and default values are not interpreted: they are kept
//! as the ordered sequence of source tokens they were captured from, and
//! stringify by concatenation. The one piece of smarts is [`Expr::doc`],
//! which recognizes identifiers from an embedded table of MATLAB built-ins
//! and produces a link into the MathWorks reference documentation.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

const MATHWORKS_DOC_URL: &str = "https://www.mathworks.com/help/matlab";

static MATLAB_BUILTINS: OnceLock<HashMap<String, String>> = OnceLock::new();

/// The embedded identifier → documentation-path table.
fn matlab_builtins() -> &'static HashMap<String, String> {
    MATLAB_BUILTINS.get_or_init(|| {
        serde_json::from_str(include_str!("matlab_builtins.json"))
            .expect("embedded matlab_builtins.json is well-formed")
    })
}

/// An ordered sequence of source tokens forming one expression.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Expr {
    tokens: Vec<String>,
}

impl Expr {
    pub fn new(tokens: Vec<String>) -> Expr {
        Expr { tokens }
    }

    /// The tokens of this expression, in source order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// A documentation URL for the first token that names a MATLAB built-in,
    /// if any does.
    pub fn doc(&self) -> Option<String> {
        self.tokens().find_map(|token| {
            matlab_builtins()
                .get(token)
                .map(|page| format!("{MATHWORKS_DOC_URL}/{page}"))
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str(token)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Expr {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Expr {
        Expr::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Expr;

    #[test]
    fn display_concatenates_tokens() {
        let expr: Expr = ["zeros", "(", "3", ",", "1", ")"].into_iter().collect();
        assert_eq!(expr.to_string(), "zeros(3,1)");
    }

    #[test]
    fn doc_resolves_builtins() {
        let expr: Expr = ["zeros", "(", "3", ")"].into_iter().collect();
        assert_eq!(
            expr.doc().unwrap(),
            "https://www.mathworks.com/help/matlab/ref/zeros.html"
        );
    }

    #[test]
    fn doc_is_none_for_user_identifiers() {
        let expr: Expr = ["myWidget", "(", ")"].into_iter().collect();
        assert_eq!(expr.doc(), None);
    }

    #[test]
    fn empty_expression_displays_empty() {
        assert_eq!(Expr::default().to_string(), "");
        assert!(Expr::default().is_empty());
    }
}
