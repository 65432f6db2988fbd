//! Frontend seam: turning source text into a [`SyntaxTree`].

use crate::tree::{SyntaxTree, TreeError};

/// Errors a frontend can raise while producing a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The grammar could not be loaded.
    #[error("failed to load {language} grammar: {message}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Underlying error message.
        message: String,
    },

    /// The source contains syntax errors.
    #[error("syntax error at line {line}")]
    Syntax {
        /// First line with an error.
        line: usize,
    },

    /// Syntax nests deeper than the frontend lowers.
    #[error("nesting at line {line} exceeds the limit of {limit} levels")]
    NestingTooDeep {
        /// Line of the first node past the limit.
        line: usize,
        /// Maximum supported depth.
        limit: usize,
    },

    /// The parser produced no tree at all.
    #[error("parser returned no tree")]
    NoTree,

    /// Lowering produced a tree the core rejects.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// A language frontend.
pub trait SourceParser: Send {
    /// Short language name (e.g., "java").
    fn language_id(&self) -> &'static str;

    /// File extensions handled by this parser, without the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Parses one file.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the source cannot be turned into a tree.
    fn parse(&mut self, source: &str) -> Result<SyntaxTree, ParseError>;
}

/// Type alias for boxed parser trait objects.
pub type ParserBox = Box<dyn SourceParser>;
