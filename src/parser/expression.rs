//! Expression parsing with explicit precedence climbing.
//!
//! Each precedence level in `SPEC_FULL.md` §4.1 gets its own function, lowest
//! first: [`parse_or`] calls [`parse_and`] calls [`parse_relational`] and so
//! on down to [`parse_term`]. Relational is deliberately non-associative —
//! a second comparison operator in a chain is rejected rather than silently
//! accepted, unlike the grounding repository's fully left-associative
//! equality/relational levels.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{consumed, cut, not, opt, peek, value};
use nom::error::context;
use nom::multi::{many0, separated_list0};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{Err, IResult, Parser};
use nom_language::error::VerboseErrorKind;

use crate::ast::{BinaryOp, BoolOp, CompareMode, Expression, FieldAssignment, UnaryOp};
use crate::nom_tools::{cleanup, span_location, NomSpan};

use super::type_name::parse_type_use;
use super::{ident, primitive, BranchwoodParserError};

/// Entry point: parses a full expression at the lowest precedence level.
pub fn parse_expression(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    parse_or(input)
}

fn parse_or(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, first) = parse_and(input)?;
    let (input, rest) = many0(preceded(cleanup(terminated(tag("||"), not(char('|')))), parse_and)).parse(input)?;
    Ok((input, rest.into_iter().fold(first, |left, right| {
        let location = left.location().merge(&right.location());
        Expression::BoolOperation { op: BoolOp::Or, left: Box::new(left), right: Box::new(right), location }
    })))
}

fn parse_and(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, first) = parse_relational(input)?;
    let (input, rest) = many0(preceded(cleanup(terminated(tag("&&"), not(char('&')))), parse_relational)).parse(input)?;
    Ok((input, rest.into_iter().fold(first, |left, right| {
        let location = left.location().merge(&right.location());
        Expression::BoolOperation { op: BoolOp::And, left: Box::new(left), right: Box::new(right), location }
    })))
}

fn compare_mode(input: NomSpan<'_>) -> IResult<NomSpan<'_>, CompareMode, BranchwoodParserError<'_>> {
    cleanup(alt((
        value(CompareMode::Equal, tag("==")),
        value(CompareMode::NotEqual, tag("!=")),
        value(CompareMode::Less, terminated(char('<'), not(char('=')))),
        value(CompareMode::Greater, terminated(char('>'), not(char('=')))),
    )))
    .parse(input)
}

fn parse_relational(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, first) = parse_additive(input)?;
    let (input, chained) = opt(pair(compare_mode, parse_additive)).parse(input)?;

    let Some((mode, second)) = chained else {
        return Ok((input, first));
    };

    let (input, trailing) = opt(compare_mode).parse(input)?;
    if trailing.is_some() {
        let error = BranchwoodParserError { errors: vec![(input, VerboseErrorKind::Context("illegal chained comparison"))] };
        return Err(Err::Failure(error));
    }

    let location = first.location().merge(&second.location());
    Ok((input, Expression::Compare { mode, left: Box::new(first), right: Box::new(second), location }))
}

fn parse_additive(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, first) = parse_multiplicative(input)?;
    let (input, rest) = many0(pair(cleanup(alt((value(BinaryOp::Add, char('+')), value(BinaryOp::Sub, char('-'))))), parse_multiplicative)).parse(input)?;
    Ok((input, rest.into_iter().fold(first, |left, (op, right)| {
        let location = left.location().merge(&right.location());
        Expression::BinaryOperation { op, left: Box::new(left), right: Box::new(right), location }
    })))
}

fn parse_multiplicative(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, first) = parse_unary(input)?;
    let (input, rest) = many0(pair(cleanup(alt((value(BinaryOp::Mul, char('*')), value(BinaryOp::Div, char('/'))))), parse_unary)).parse(input)?;
    Ok((input, rest.into_iter().fold(first, |left, (op, right)| {
        let location = left.location().merge(&right.location());
        Expression::BinaryOperation { op, left: Box::new(left), right: Box::new(right), location }
    })))
}

fn parse_unary(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, op_span) = opt(consumed(cleanup(alt((value(UnaryOp::Negate, char('-')), value(UnaryOp::Not, char('!'))))))).parse(input)?;

    match op_span {
        Some((span, op)) => {
            let (input, operand) = context("expression expected after unary operator", cut(parse_cast)).parse(input)?;
            let location = span_location(&span).merge(&operand.location());
            Ok((input, Expression::UnaryOperation { op, operand: Box::new(operand), location }))
        }
        None => parse_cast(input),
    }
}

enum CastOrIs {
    Cast,
    Is,
}

fn parse_cast(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, value) = parse_term(input)?;
    let (input, suffix) = opt(pair(
        cleanup(alt((value(CastOrIs::Cast, tag("as")), value(CastOrIs::Is, tag("is"))))),
        context("type expected after `as`/`is`", cut(parse_type_use)),
    ))
    .parse(input)?;

    match suffix {
        Some((CastOrIs::Cast, to_type)) => {
            let location = value.location().merge(&to_type.location());
            Ok((input, Expression::Cast { value: Box::new(value), to_type, location }))
        }
        Some((CastOrIs::Is, is_type)) => {
            let location = value.location().merge(&is_type.location());
            Ok((input, Expression::IsCompare { value: Box::new(value), is_type, location }))
        }
        None => Ok((input, value)),
    }
}

fn parse_term(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    cleanup(alt((parse_constant, parse_fn_call_expression, parse_new_struct_expression, parse_parenthesized, parse_access_expression))).parse(input)
}

fn parse_constant(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, (span, value)) = primitive::constant(input)?;
    Ok((input, Expression::Constant { value, location: span_location(&span) }))
}

fn parse_parenthesized(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    delimited(cleanup(char('(')), parse_expression, cleanup(char(')'))).parse(input)
}

pub(crate) fn parse_fn_call_expression(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, (name_span, name)) = consumed(cleanup(ident())).parse(input)?;
    let (input, _) = peek(cleanup(char('('))).parse(input)?;
    let (input, (args_span, arguments)) =
        consumed(delimited(cleanup(char('(')), separated_list0(cleanup(char(',')), parse_expression), cleanup(char(')')))).parse(input)?;
    let location = span_location(&name_span).merge(&span_location(&args_span));
    Ok((input, Expression::FnCall { name: name.fragment().to_string(), arguments, location }))
}

pub(crate) fn parse_new_struct_expression(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, variant) = parse_type_use(input)?;
    let (input, _) = peek(cleanup(char('{'))).parse(input)?;
    let (input, (body_span, assignments)) =
        consumed(delimited(cleanup(char('{')), separated_list0(cleanup(char(',')), parse_field_assignment), cleanup(char('}')))).parse(input)?;
    let location = variant.location().merge(&span_location(&body_span));
    Ok((input, Expression::NewStruct { variant, assignments, location }))
}

fn parse_field_assignment(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FieldAssignment, BranchwoodParserError<'_>> {
    let (input, (name_span, name)) = consumed(cleanup(ident())).parse(input)?;
    let (input, _) = cleanup(char(':')).parse(input)?;
    let (input, value) = context("expression expected in field assignment", cut(parse_expression)).parse(input)?;
    let location = span_location(&name_span).merge(&value.location());
    Ok((input, FieldAssignment { name: name.fragment().to_string(), value, location }))
}

pub(crate) fn parse_access_expression(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Expression, BranchwoodParserError<'_>> {
    let (input, (first_span, first)) = consumed(cleanup(ident())).parse(input)?;
    let mut expression = Expression::Name { identifier: first.fragment().to_string(), location: span_location(&first_span) };

    let (input, segments) = many0(consumed(preceded(cleanup(char('.')), cleanup(ident())))).parse(input)?;
    for (segment_span, segment) in segments {
        let location = expression.location().merge(&span_location(&segment_span));
        expression = Expression::Access { parent: Box::new(expression), name: segment.fragment().to_string(), location };
    }

    Ok((input, expression))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::ast::ConstantValue;
    use crate::file::SourceFile;
    use crate::nom_tools::State;

    use super::*;

    fn parse(code: &str) -> Expression {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());
        let state = State::new(source_file);
        let input = NomSpan::new_extra(code, state);
        parse_expression(input).unwrap().1
    }

    #[test]
    fn precedence_mul_binds_tighter_than_add() {
        let expr = parse("1 + 2 * 3");
        match expr {
            Expression::BinaryOperation { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Expression::BinaryOperation { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn precedence_and_binds_tighter_than_or() {
        let expr = parse("7 || 9 && 5");
        match expr {
            Expression::BoolOperation { op: BoolOp::Or, left, right, .. } => {
                assert!(matches!(*left, Expression::Constant { value: ConstantValue::I32(7), .. }));
                assert!(matches!(*right, Expression::BoolOperation { op: BoolOp::And, .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn chained_comparison_is_rejected() {
        let source_file = SourceFile::new(vec!["<memory>".into()], "1 < 2 < 3".to_string());
        let state = State::new(source_file);
        let input = NomSpan::new_extra("1 < 2 < 3", state);
        assert!(parse_expression(input).is_err());
    }

    #[test]
    fn cast_and_is_parse() {
        let expr = parse("x as i32");
        assert!(matches!(expr, Expression::Cast { .. }));
        let expr = parse("x is f32");
        assert!(matches!(expr, Expression::IsCompare { .. }));
    }

    #[test]
    fn fn_call_parses_arguments() {
        let expr = parse("add(1, 2)");
        match expr {
            Expression::FnCall { name, arguments, .. } => {
                assert_eq!(name, "add");
                assert_eq!(arguments.len(), 2);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn new_struct_parses_field_assignments() {
        let expr = parse("Elem::Button { label: \"ok\" }");
        match expr {
            Expression::NewStruct { assignments, .. } => assert_eq!(assignments.len(), 1),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn access_chain_is_left_associative() {
        let expr = parse("a.b.c");
        match expr {
            Expression::Access { parent, name, .. } => {
                assert_eq!(name, "c");
                assert!(matches!(*parent, Expression::Access { .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }
}
