//! Nom parser tools and utilities for the branchwood interpreter.
//!
//! This module provides specialized types and utilities for parsing branchwood source
//! code using the nom parser combinator library. It includes source location tracking,
//! span handling, and helper functions for common parsing patterns.

use nom::character::complete::multispace0;
use nom::sequence::delimited;
use nom::Parser;
use nom_locate::LocatedSpan;
use std::fmt::Display;
use std::hash::Hash;
use std::ops::Range;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::ast::{Location, Position};
use crate::file::SourceFile;
use crate::parser::BranchwoodParserError;

/// Parser state threaded through every combinator call
///
/// Carries the source file being parsed plus an atomic counter available
/// for assigning stable ids to AST nodes if a future pass needs them.
#[derive(Debug, Clone)]
pub struct State {
    /// The source file being parsed
    pub file: SourceFile,
    /// Atomic counter, reserved for future node-id assignment
    pub indexer: Arc<AtomicUsize>,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.file.hash(state);
    }
}

impl State {
    /// Creates a new parser state for the given source file
    pub fn new(file: SourceFile) -> Self {
        Self {
            file,
            indexer: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Type alias for nom's `LocatedSpan` carrying branchwood's parser state
pub type NomSpan<'base, T = &'base str> = LocatedSpan<T, State>;

/// A span representing a portion of source code with location information
///
/// Combines the matched text with its byte position in the source and the
/// parser state, giving error values everything they need without borrowing
/// the combinator's input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span<'base> {
    /// The text content of this span
    pub text: &'base str,
    /// The byte position range in the source file
    pub position: Range<usize>,
    /// The parser state containing file information
    pub state: State,
}

impl Display for Span<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text)
    }
}

impl<'base> From<NomSpan<'base>> for Span<'base> {
    fn from(value: NomSpan<'base>) -> Self {
        Span {
            text: value.fragment(),
            position: value.to_range(),
            state: value.extra.clone(),
        }
    }
}

/// Span information detached from the parser's borrowed lifetime
///
/// Used by error values and collected AST that must outlive the parse call.
#[derive(Clone, Debug)]
pub struct SpanInfo {
    /// The byte position range in the source file
    pub position: Range<usize>,
    /// The source file this span belongs to
    pub file: SourceFile,
}

impl SpanInfo {
    /// Creates new span information with the given position and file
    pub fn new(position: Range<usize>, file: SourceFile) -> Self {
        Self { position, file }
    }
}

impl From<Span<'_>> for SpanInfo {
    fn from(span: Span<'_>) -> Self {
        SpanInfo::new(span.to_range(), span.state.file.clone())
    }
}

impl From<&Span<'_>> for SpanInfo {
    fn from(span: &Span<'_>) -> Self {
        SpanInfo::new(span.to_range(), span.state.file.clone())
    }
}

/// Trait for converting spans to byte position ranges
pub trait ToRange {
    /// Converts the span to a position range
    fn to_range(&self) -> Range<usize>;
}

impl ToRange for NomSpan<'_> {
    fn to_range(&self) -> Range<usize> {
        let start = self.location_offset();
        start..(start + self.fragment().len())
    }
}

impl ToRange for Span<'_> {
    fn to_range(&self) -> Range<usize> {
        self.position.clone()
    }
}

/// Builds the [`Location`] a single-line span covers.
///
/// Every token this parser recognizes (identifiers, literals, punctuation)
/// is confined to one source line, so `begin` and `end` share a line number
/// and only the column advances by the span's character count.
pub fn span_location(span: &NomSpan<'_>) -> Location {
    let line = span.location_line() as usize;
    let begin_column = span.get_utf8_column();
    let width = span.fragment().chars().count().max(1) - 1;
    Location::new(Position::new(line, begin_column), Position::new(line, begin_column + width), span.to_range()).expect("a single-line span always has begin <= end")
}

/// Parser combinator that wraps a parser with surrounding whitespace cleanup
///
/// Strips leading and trailing whitespace around the wrapped parser, which is
/// how every token-level combinator in this crate tolerates free-form layout.
pub fn cleanup<'base, O, F>(f: F) -> impl Parser<NomSpan<'base>, Output = O, Error = BranchwoodParserError<'base>>
where
    F: Parser<NomSpan<'base>, Output = O, Error = BranchwoodParserError<'base>>,
{
    delimited(multispace0, f, multispace0)
}
