//! Source language handling
//!
//! The pipeline only cares about the language to pick a file extension for
//! the materialized source. Anything that is not Java is treated as a
//! generic script.

use serde::{Deserialize, Serialize};

/// Declared language of a submitted payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Java,
    Script,
}

impl Language {
    /// Classifies a declared language name
    ///
    /// Only an exact, case-insensitive `java` is Java. Surrounding
    /// whitespace is not stripped.
    pub fn classify(name: &str) -> Self {
        if name.eq_ignore_ascii_case("java") {
            Language::Java
        } else {
            Language::Script
        }
    }

    /// File extension used for the materialized source, including the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Java => ".java",
            Language::Script => ".py",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Java => write!(f, "java"),
            Language::Script => write!(f, "script"),
        }
    }
}
