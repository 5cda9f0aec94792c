//! Character predicates used by the scanner.
//!
//! A [`Matcher`] answers one question: does this character belong to the
//! class? Matchers carry a human-readable description that ends up in lexical
//! diagnostics ("expected Double Quote"). They are plain `Copy` values so the
//! terminal character classes can be declared as constants and merged into
//! larger classes at compile time.

use std::fmt;

/// A predicate over a single character.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Matches exactly one character.
    Rune {
        /// Description used in diagnostics.
        desc: &'static str,
        /// The matched character.
        rune: char,
    },
    /// Matches any character contained in `runes`.
    AnyOf {
        /// Description used in diagnostics.
        desc: &'static str,
        /// The set of matched characters.
        runes: &'static str,
    },
    /// Matches every character for which `pred` returns `true`.
    Class {
        /// Description used in diagnostics.
        desc: &'static str,
        /// The predicate.
        pred: fn(char) -> bool,
    },
    /// Union of other matchers.
    Merge {
        /// Description used in diagnostics.
        desc: &'static str,
        /// The alternatives, tried in order.
        parts: &'static [Matcher],
    },
}

impl Matcher {
    /// Matcher for a single character.
    pub const fn rune(desc: &'static str, rune: char) -> Self {
        Matcher::Rune { desc, rune }
    }

    /// Matcher for any character of `runes`.
    pub const fn any_of(desc: &'static str, runes: &'static str) -> Self {
        Matcher::AnyOf { desc, runes }
    }

    /// Matcher backed by a predicate function.
    pub const fn class(desc: &'static str, pred: fn(char) -> bool) -> Self {
        Matcher::Class { desc, pred }
    }

    /// Union of `parts`.
    pub const fn merge(desc: &'static str, parts: &'static [Matcher]) -> Self {
        Matcher::Merge { desc, parts }
    }

    /// Reports whether `c` belongs to this class.
    pub fn matches(&self, c: char) -> bool {
        match self {
            Matcher::Rune { rune, .. } => *rune == c,
            Matcher::AnyOf { runes, .. } => runes.contains(c),
            Matcher::Class { pred, .. } => pred(c),
            Matcher::Merge { parts, .. } => parts.iter().any(|m| m.matches(c)),
        }
    }

    /// Human-readable description of the class.
    pub fn description(&self) -> &'static str {
        match self {
            Matcher::Rune { desc, .. }
            | Matcher::AnyOf { desc, .. }
            | Matcher::Class { desc, .. }
            | Matcher::Merge { desc, .. } => desc,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
