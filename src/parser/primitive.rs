//! Literal parsing: integers, floats, strings, and booleans.
//!
//! Unlike a general-purpose numeric literal grammar, branchwood's literal
//! grammar is deliberately narrow: the language has exactly four primitive
//! types (`i32`, `f32`, `bool`, `str`), so there is no type-inference ladder
//! to climb. Integer literals that do not fit in `i32` are a syntax error
//! rather than silently widening to a larger type. Literals never carry a
//! leading sign — negation is the unary `-` operator, parsed one level up in
//! [`super::expression`].

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, none_of, one_of};
use nom::combinator::{consumed, opt, recognize, value};
use nom::multi::{fold, many1};
use nom::sequence::{delimited, preceded};
use nom::{Err, IResult, Parser};
use nom_language::error::VerboseErrorKind;

use crate::ast::ConstantValue;
use crate::nom_tools::{cleanup, NomSpan};

use super::BranchwoodParserError;

fn character(input: NomSpan<'_>) -> IResult<NomSpan<'_>, char, BranchwoodParserError<'_>> {
    let (input, c) = none_of("\"")(input)?;
    if c == '\\' {
        alt((
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
            value('\\', char('\\')),
            value('"', char('"')),
            value('/', char('/')),
        ))
        .parse(input)
    } else {
        Ok((input, c))
    }
}

/// Parses a double-quoted string literal, resolving `\n \r \t \\ \" \/` escapes.
pub fn string(input: NomSpan<'_>) -> IResult<NomSpan<'_>, ConstantValue, BranchwoodParserError<'_>> {
    let (input, text) = delimited(
        char('"'),
        fold(0.., character, String::new, |mut s, c| {
            s.push(c);
            s
        }),
        char('"'),
    )
    .parse(input)?;

    Ok((input, ConstantValue::Str(text)))
}

fn digits(input: NomSpan<'_>) -> IResult<NomSpan<'_>, NomSpan<'_>, BranchwoodParserError<'_>> {
    recognize(many1(one_of("0123456789"))).parse(input)
}

/// Parses an unsigned integer or floating-point literal.
///
/// A literal with a `.` fraction is `f32`; otherwise it must fit in `i32`
/// or parsing fails with a syntax error.
pub fn number<'base>(input: NomSpan<'base>) -> IResult<NomSpan<'base>, ConstantValue, BranchwoodParserError<'base>> {
    let (input, (integer_part, fraction)) = (digits, opt(preceded(char('.'), digits))).parse(input)?;

    match fraction {
        Some(fraction) => {
            let value: f64 = minimal_lexical::parse_float(integer_part.fragment().as_bytes().iter(), fraction.fragment().as_bytes().iter(), 0);
            Ok((input, ConstantValue::F32(value as f32)))
        }
        None => match integer_part.fragment().parse::<i32>() {
            Ok(value) => Ok((input, ConstantValue::I32(value))),
            Err(_) => Err(Err::Failure(BranchwoodParserError {
                errors: vec![(integer_part, VerboseErrorKind::Context("integer literal out of range for i32"))],
            })),
        },
    }
}

/// Parses a literal value: number, string, or boolean.
pub fn constant(input: NomSpan<'_>) -> IResult<NomSpan<'_>, (NomSpan<'_>, ConstantValue), BranchwoodParserError<'_>> {
    consumed(cleanup(alt((number, string, value(ConstantValue::Bool(true), tag("true")), value(ConstantValue::Bool(false), tag("false")))))).parse(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::file::SourceFile;
    use crate::nom_tools::State;

    use super::*;

    #[rstest]
    #[case(r#""hello""#, ConstantValue::Str("hello".into()))]
    #[case(r#""hello\nworld""#, ConstantValue::Str("hello\nworld".into()))]
    #[case(r#""hello\"world""#, ConstantValue::Str("hello\"world".into()))]
    fn string_test(#[case] code: &str, #[case] expected: ConstantValue) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());
        let state = State::new(source_file);
        let input = NomSpan::new_extra(code, state);
        let (_, parsed) = string(input).unwrap();
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("123", ConstantValue::I32(123))]
    #[case("0", ConstantValue::I32(0))]
    #[case("2147483647", ConstantValue::I32(2147483647))]
    fn integer_test(#[case] code: &str, #[case] expected: ConstantValue) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());
        let state = State::new(source_file);
        let input = NomSpan::new_extra(code, state);
        let (_, parsed) = number(input).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn integer_overflow_is_a_syntax_error() {
        let source_file = SourceFile::new(vec!["<memory>".into()], "99999999999999999999".to_string());
        let state = State::new(source_file);
        let input = NomSpan::new_extra("99999999999999999999", state);
        assert!(number(input).is_err());
    }

    #[rstest]
    #[case("1.5", 1.5f32)]
    #[case("0.25", 0.25f32)]
    fn float_test(#[case] code: &str, #[case] expected: f32) {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());
        let state = State::new(source_file);
        let input = NomSpan::new_extra(code, state);
        let (_, parsed) = number(input).unwrap();
        assert_eq!(parsed, ConstantValue::F32(expected));
    }
}
