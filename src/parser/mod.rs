//! Recursive-descent parser for branchwood source text.
//!
//! Tokenizing and parsing are fused: every combinator here consumes directly
//! from a [`NomSpan`] rather than a materialized token stream, the same
//! architecture the grounding repository uses. `VerboseError` accumulates
//! context frames during backtracking; [`parse`] converts a failure into
//! this crate's own [`crate::error::SyntaxError`] at the boundary.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1};
use nom::combinator::{cut, recognize};
use nom::error::context;
use nom::multi::many0_count;
use nom::sequence::pair;
use nom::{Err, IResult, Parser};
use nom_language::error::{VerboseError, VerboseErrorKind};

use crate::ast::Module;
use crate::nom_tools::{cleanup, NomSpan, State};

pub mod declaration;
pub mod expression;
pub mod primitive;
pub mod statement;
pub mod type_name;

/// Type alias for parser errors accumulated during combinator backtracking.
pub type BranchwoodParserError<'base> = VerboseError<NomSpan<'base>>;

/// Parses a complete module out of the source text carried by `state`.
///
/// Top-level items (`struct`, `enum`, `fn`) are parsed in any order and in
/// any quantity; anything left over once no alternative matches is a syntax
/// error naming the unconsumed text.
pub fn parse(state: &State) -> IResult<NomSpan<'_>, Module, BranchwoodParserError<'_>> {
    let input = NomSpan::new_extra(state.file.code().as_str(), state.clone());

    let mut module = Module::default();
    let mut remaining = input;
    loop {
        if remaining.fragment().trim().is_empty() {
            break;
        }

        let parsed = alt((
            cleanup(declaration::parse_struct_item),
            cleanup(declaration::parse_enum_item),
            cleanup(declaration::parse_function_item),
        ))
        .parse(remaining);

        match parsed {
            Ok((next, item)) => {
                declaration::install(&mut module, item);
                remaining = next;
            }
            Err(_) => {
                let error = VerboseError { errors: vec![(remaining, VerboseErrorKind::Context("unknown top-level syntax"))] };
                return Err(Err::Failure(error));
            }
        }
    }

    Ok((remaining, module))
}

/// Parses an identifier with a caller-supplied error message on failure.
pub fn expected_ident<'base>(message: &'static str, input: NomSpan<'base>) -> IResult<NomSpan<'base>, NomSpan<'base>, BranchwoodParserError<'base>> {
    context(message, cut(ident())).parse(input)
}

/// Parses a bare identifier: a letter, then any number of
/// alphanumeric-or-underscore characters. Whitespace around it is
/// automatically stripped.
pub fn ident<'base>() -> impl Parser<NomSpan<'base>, Output = NomSpan<'base>, Error = BranchwoodParserError<'base>> {
    cleanup(recognize(pair(alpha1, many0_count(alt((alphanumeric1, tag("_")))))))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::file::SourceFile;
    use crate::nom_tools::State;

    use super::*;

    #[rstest]
    #[case("struct Item {}", 1, 0, 0)]
    #[case("struct Item {} enum Elem {} fn main() {}", 1, 1, 1)]
    fn parses_top_level_items(#[case] code: &str, #[case] structs: usize, #[case] enums: usize, #[case] functions: usize) {
        let file = SourceFile::new(vec!["<memory>".into()], code.to_string());
        let state = State::new(file);
        let (_, module) = parse(&state).unwrap();
        assert_eq!(module.struct_declarations.len(), structs);
        assert_eq!(module.enum_declarations.len(), enums);
        assert_eq!(module.function_declarations.len(), functions);
    }

    #[test]
    fn rejects_unknown_top_level_syntax() {
        let file = SourceFile::new(vec!["<memory>".into()], "not a valid item".to_string());
        let state = State::new(file);
        assert!(parse(&state).is_err());
    }

    #[test]
    fn identifier_must_start_with_a_letter_not_an_underscore() {
        let file = SourceFile::new(vec!["<memory>".into()], "fn main() { let _total: i32 = 0; }".to_string());
        let state = State::new(file);
        assert!(parse(&state).is_err());
    }

    #[test]
    fn identifier_may_contain_an_underscore_after_the_first_letter() {
        let file = SourceFile::new(vec!["<memory>".into()], "fn main() { let my_total: i32 = 0; }".to_string());
        let state = State::new(file);
        assert!(parse(&state).is_ok());
    }
}
