//! Statement and block parsing.
//!
//! A block is a brace-delimited sequence of statements; each statement kind
//! is tried in turn by [`parse_statement`]. Keyword-led forms (`let`,
//! `return`, `if`, `while`, `match`, a nested `{ ... }`) are unambiguous on
//! their first token. Identifier-led forms are ambiguous between a call
//! statement, a struct-literal statement, and an assignment, so those three
//! are tried in that order — an assignment's left-hand `access` parses the
//! same way a call's or literal's leading name would, but only succeeds all
//! the way through when it is in fact followed by `=`.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{consumed, cut, opt, peek};
use nom::error::context;
use nom::multi::many0;
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};

use crate::ast::{Block, If, Match, Matcher, Return, Statement, VariableDeclaration, While};
use crate::nom_tools::{cleanup, span_location, NomSpan};

use super::expression::parse_expression;
use super::type_name::parse_type_use;
use super::{ident, BranchwoodParserError};

/// Parses a brace-delimited sequence of statements.
pub fn parse_block(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Block, BranchwoodParserError<'_>> {
    let (input, (span, body)) = consumed(delimited(cleanup(char('{')), many0(parse_statement), cleanup(char('}')))).parse(input)?;
    Ok((input, Block { body, location: span_location(&span) }))
}

fn parse_statement(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    cleanup(alt((
        parse_nested_block,
        parse_variable_declaration,
        parse_return,
        parse_if,
        parse_while,
        parse_match,
        parse_fn_call_statement,
        parse_new_struct_statement,
        parse_assignment,
    )))
    .parse(input)
}

fn parse_nested_block(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, _) = peek(cleanup(char('{'))).parse(input)?;
    let (input, block) = parse_block(input)?;
    Ok((input, Statement::Block(block)))
}

fn parse_variable_declaration(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, start) = consumed(opt(cleanup(tag("mut")))).parse(input)?;
    let mutable = start.1.is_some();
    let (input, _) = cleanup(tag("let")).parse(input)?;
    let (input, (name_span, name)) = consumed(context("name expected after `let`", cut(cleanup(ident())))).parse(input)?;
    let (input, declared_type) = opt(preceded(cleanup(char(':')), context("type expected", cut(parse_type_use)))).parse(input)?;
    let (input, value) = opt(preceded(cleanup(char('=')), context("expression expected", cut(parse_expression)))).parse(input)?;
    let (input, end_span) = consumed(context("`;` expected", cut(cleanup(char(';'))))).parse(input)?;

    let location = span_location(&start.0).merge(&span_location(&end_span.0));
    Ok((
        input,
        Statement::VariableDeclaration(VariableDeclaration { name: name.fragment().to_string(), mutable, declared_type, value, location }),
    ))
}

fn parse_return(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, kw_span) = consumed(cleanup(tag("return"))).parse(input)?;
    let (input, value) = opt(parse_expression).parse(input)?;
    let (input, end_span) = consumed(context("`;` expected after `return`", cut(cleanup(char(';'))))).parse(input)?;
    let location = span_location(&kw_span.0).merge(&span_location(&end_span.0));
    Ok((input, Statement::Return(Return { value, location })))
}

fn parse_if(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, kw_span) = consumed(cleanup(tag("if"))).parse(input)?;
    let (input, condition) = delimited(
        context("`(` expected after `if`", cut(cleanup(char('(')))),
        context("expression expected", cut(parse_expression)),
        context("`)` expected", cut(cleanup(char(')')))),
    )
    .parse(input)?;
    let (input, then_branch) = context("block expected", cut(parse_block)).parse(input)?;
    let (input, else_branch) = opt(preceded(cleanup(tag("else")), context("block expected after `else`", cut(parse_block)))).parse(input)?;

    let location = span_location(&kw_span.0).merge(&else_branch.as_ref().map(|b| b.location.clone()).unwrap_or_else(|| then_branch.location.clone()));
    Ok((input, Statement::If(If { condition, then_branch, else_branch, location })))
}

fn parse_while(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, kw_span) = consumed(cleanup(tag("while"))).parse(input)?;
    let (input, condition) = delimited(
        context("`(` expected after `while`", cut(cleanup(char('(')))),
        context("expression expected", cut(parse_expression)),
        context("`)` expected", cut(cleanup(char(')')))),
    )
    .parse(input)?;
    let (input, body) = context("block expected", cut(parse_block)).parse(input)?;
    let location = span_location(&kw_span.0).merge(&body.location);
    Ok((input, Statement::While(While { condition, body, location })))
}

fn parse_matcher(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Matcher, BranchwoodParserError<'_>> {
    let (input, declared_type) = parse_type_use(input)?;
    let (input, binding_name) = context("binding name expected", cut(cleanup(ident()))).parse(input)?;
    let (input, _) = context("`=>` expected", cut(cleanup(tag("=>")))).parse(input)?;
    let (input, body) = context("block expected", cut(parse_block)).parse(input)?;
    let (input, _) = context("`;` expected after match arm", cut(cleanup(char(';')))).parse(input)?;
    let location = declared_type.location().merge(&body.location);
    Ok((input, Matcher { declared_type, binding_name: binding_name.fragment().to_string(), body, location }))
}

fn parse_match(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, kw_span) = consumed(cleanup(tag("match"))).parse(input)?;
    let (input, subject) = delimited(
        context("`(` expected after `match`", cut(cleanup(char('(')))),
        context("expression expected", cut(parse_expression)),
        context("`)` expected", cut(cleanup(char(')')))),
    )
    .parse(input)?;
    let (input, (body_span, matchers)) = consumed(delimited(
        context("`{` expected", cut(cleanup(char('{')))),
        nom::multi::many1(parse_matcher),
        context("`}` expected", cut(cleanup(char('}')))),
    ))
    .parse(input)?;

    let location = span_location(&kw_span.0).merge(&span_location(&body_span));
    Ok((input, Statement::Match(Match { subject, matchers, location })))
}

fn parse_fn_call_statement(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, expr) = super::expression::parse_fn_call_expression(input)?;
    let (input, _) = context("`;` expected", cut(cleanup(char(';')))).parse(input)?;
    Ok((input, Statement::Expression(expr)))
}

fn parse_new_struct_statement(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, expr) = super::expression::parse_new_struct_expression(input)?;
    let (input, _) = context("`;` expected", cut(cleanup(char(';')))).parse(input)?;
    Ok((input, Statement::Expression(expr)))
}

fn parse_assignment(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Statement, BranchwoodParserError<'_>> {
    let (input, access) = super::expression::parse_access_expression(input)?;
    let (input, _) = cleanup(char('=')).parse(input)?;
    let (input, value) = context("expression expected after `=`", cut(parse_expression)).parse(input)?;
    let (input, end_span) = consumed(context("`;` expected", cut(cleanup(char(';'))))).parse(input)?;
    let location = access.location().merge(&span_location(&end_span.0));
    Ok((input, Statement::Assignment(crate::ast::Assignment { access, value, location })))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::file::SourceFile;
    use crate::nom_tools::State;

    use super::*;

    fn parse(code: &str) -> Block {
        let source_file = SourceFile::new(vec!["<memory>".into()], code.to_string());
        let state = State::new(source_file);
        let input = NomSpan::new_extra(code, state);
        parse_block(input).unwrap().1
    }

    #[test]
    fn parses_let_and_assignment() {
        let block = parse("{ mut let x: i32 = 3; x = 4; }");
        assert_eq!(block.body.len(), 2);
        assert!(matches!(block.body[0], Statement::VariableDeclaration(ref v) if v.mutable && v.name == "x"));
        assert!(matches!(block.body[1], Statement::Assignment(_)));
    }

    #[test]
    fn parses_if_else() {
        let block = parse("{ if (x) { return 1; } else { return 2; } }");
        assert_eq!(block.body.len(), 1);
        assert!(matches!(block.body[0], Statement::If(ref i) if i.else_branch.is_some()));
    }

    #[test]
    fn parses_while() {
        let block = parse("{ while (x) { y = 1; } }");
        assert!(matches!(block.body[0], Statement::While(_)));
    }

    #[test]
    fn parses_match() {
        let block = parse("{ match (x) { i32 n => { return n; }; } }");
        assert!(matches!(block.body[0], Statement::Match(ref m) if m.matchers.len() == 1));
    }

    #[test]
    fn parses_fn_call_statement() {
        let block = parse("{ print(1, 2); }");
        assert!(matches!(block.body[0], Statement::Expression(crate::ast::Expression::FnCall { .. })));
    }

    #[test]
    fn parses_new_struct_statement() {
        let block = parse("{ Item { id: 1 }; }");
        assert!(matches!(block.body[0], Statement::Expression(crate::ast::Expression::NewStruct { .. })));
    }
}
