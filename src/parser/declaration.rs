//! Top-level and nested declaration parsing: `struct`, `enum`, `fn`.
//!
//! Enum variants recurse into this same struct/enum parsing pair, so a
//! deeply nested `enum Elem { enum Button { struct Active {}; } }` is parsed
//! by repeated application of [`parse_struct_decl`]/[`parse_enum_decl`]
//! rather than a separate "nested declaration" grammar.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{consumed, cut, opt};
use nom::error::context;
use nom::multi::{many0, separated_list0};
use nom::sequence::delimited;
use nom::{IResult, Parser};

use crate::ast::{EnumDeclaration, FieldDeclaration, FunctionDeclaration, Module, Parameter, StructDeclaration, TypeDeclaration};
use crate::nom_tools::{cleanup, span_location, NomSpan};

use super::statement::parse_block;
use super::type_name::parse_type_use;
use super::{expected_ident, ident, BranchwoodParserError};

/// A single top-level item, before it is sorted into its [`Module`] bucket.
pub enum Item {
    Struct(StructDeclaration),
    Enum(EnumDeclaration),
    Function(FunctionDeclaration),
}

/// Sorts a parsed top-level [`Item`] into the module's per-kind vectors.
pub fn install(module: &mut Module, item: Item) {
    match item {
        Item::Struct(s) => module.struct_declarations.push(s),
        Item::Enum(e) => module.enum_declarations.push(e),
        Item::Function(f) => module.function_declarations.push(f),
    }
}

pub fn parse_struct_item(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Item, BranchwoodParserError<'_>> {
    let (input, decl) = parse_struct_decl(input)?;
    Ok((input, Item::Struct(decl)))
}

pub fn parse_enum_item(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Item, BranchwoodParserError<'_>> {
    let (input, decl) = parse_enum_decl(input)?;
    Ok((input, Item::Enum(decl)))
}

pub fn parse_function_item(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Item, BranchwoodParserError<'_>> {
    let (input, decl) = parse_function_decl(input)?;
    Ok((input, Item::Function(decl)))
}

fn parse_field_decl(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FieldDeclaration, BranchwoodParserError<'_>> {
    let (input, (name_span, name)) = consumed(context("field name expected", cut(cleanup(ident())))).parse(input)?;
    let (input, _) = context("`:` expected", cut(cleanup(char(':')))).parse(input)?;
    let (input, declared_type) = context("field type expected", cut(parse_type_use)).parse(input)?;
    let (input, end_span) = consumed(context("`;` expected", cut(cleanup(char(';'))))).parse(input)?;
    let location = span_location(&name_span).merge(&span_location(&end_span.0));
    Ok((input, FieldDeclaration { name: name.fragment().to_string(), declared_type, location }))
}

/// Parses `struct NAME { FieldDeclaration* }`.
pub fn parse_struct_decl(input: NomSpan<'_>) -> IResult<NomSpan<'_>, StructDeclaration, BranchwoodParserError<'_>> {
    let (input, kw_span) = consumed(cleanup(tag("struct"))).parse(input)?;
    let (input, name) = expected_ident("struct name expected", input)?;
    let (input, (body_span, fields)) =
        consumed(delimited(context("`{` expected", cut(cleanup(char('{')))), many0(parse_field_decl), context("`}` expected", cut(cleanup(char('}')))))).parse(input)?;
    let location = span_location(&kw_span.0).merge(&span_location(&body_span));
    Ok((input, StructDeclaration { name: name.fragment().to_string(), fields, location }))
}

/// Parses `enum NAME { (StructDeclaration | EnumDeclaration) ';' ... }`.
pub fn parse_enum_decl(input: NomSpan<'_>) -> IResult<NomSpan<'_>, EnumDeclaration, BranchwoodParserError<'_>> {
    let (input, kw_span) = consumed(cleanup(tag("enum"))).parse(input)?;
    let (input, name) = expected_ident("enum name expected", input)?;

    let (input, (body_span, variants)) = consumed(delimited(
        context("`{` expected", cut(cleanup(char('{')))),
        many0(parse_enum_variant),
        context("`}` expected", cut(cleanup(char('}')))),
    ))
    .parse(input)?;

    let location = span_location(&kw_span.0).merge(&span_location(&body_span));
    Ok((input, EnumDeclaration { name: name.fragment().to_string(), variants, location }))
}

fn parse_enum_variant(input: NomSpan<'_>) -> IResult<NomSpan<'_>, TypeDeclaration, BranchwoodParserError<'_>> {
    let (input, variant) = alt((
        nom::combinator::map(parse_struct_decl, TypeDeclaration::Struct),
        nom::combinator::map(parse_enum_decl, TypeDeclaration::Enum),
    ))
    .parse(input)?;
    let (input, _) = context("`;` expected after enum variant", cut(cleanup(char(';')))).parse(input)?;
    Ok((input, variant))
}

fn parse_parameter(input: NomSpan<'_>) -> IResult<NomSpan<'_>, Parameter, BranchwoodParserError<'_>> {
    let (input, mutable_span) = consumed(opt(cleanup(tag("mut")))).parse(input)?;
    let mutable = mutable_span.1.is_some();
    let (input, (name_span, name)) = consumed(context("parameter name expected", cut(cleanup(ident())))).parse(input)?;
    let (input, _) = context("`:` expected", cut(cleanup(char(':')))).parse(input)?;
    let (input, declared_type) = context("parameter type expected", cut(parse_type_use)).parse(input)?;
    let location = span_location(&mutable_span.0).merge(&span_location(&name_span)).merge(&declared_type.location());
    Ok((input, Parameter { name: name.fragment().to_string(), mutable, declared_type, location }))
}

/// Parses `fn NAME '(' parameters? ')' ('->' type)? block`.
///
/// A trailing comma after the last parameter is rejected because
/// `separated_list0` does not consume a dangling separator.
pub fn parse_function_decl(input: NomSpan<'_>) -> IResult<NomSpan<'_>, FunctionDeclaration, BranchwoodParserError<'_>> {
    let (input, kw_span) = consumed(cleanup(tag("fn"))).parse(input)?;
    let (input, name) = expected_ident("function name expected", input)?;

    let (input, parameters) = delimited(
        context("`(` expected", cut(cleanup(char('(')))),
        separated_list0(cleanup(char(',')), parse_parameter),
        context("`)` expected", cut(cleanup(char(')')))),
    )
    .parse(input)?;

    let (input, returns) = opt(nom::sequence::preceded(cleanup(tag("->")), context("return type expected", cut(parse_type_use)))).parse(input)?;
    let (input, body) = context("function body expected", cut(parse_block)).parse(input)?;

    let location = span_location(&kw_span.0).merge(&body.location);
    Ok((input, FunctionDeclaration { name: name.fragment().to_string(), parameters, returns, body, location }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::file::SourceFile;
    use crate::nom_tools::State;

    use super::*;

    fn span(code: &str) -> NomSpan<'_> {
        NomSpan::new_extra(code, State::new(SourceFile::new(vec!["<memory>".into()], code.to_string())))
    }

    #[test]
    fn parses_empty_struct() {
        let code = "struct Item {}".to_string();
        let input = NomSpan::new_extra(code.as_str(), State::new(SourceFile::new(vec!["<memory>".into()], code.clone())));
        let (_, decl) = parse_struct_decl(input).unwrap();
        assert_eq!(decl.name, "Item");
        assert!(decl.fields.is_empty());
    }

    #[test]
    fn parses_struct_fields() {
        let code = "struct Item { id: i32; label: str; }".to_string();
        let input = NomSpan::new_extra(code.as_str(), State::new(SourceFile::new(vec!["<memory>".into()], code.clone())));
        let (_, decl) = parse_struct_decl(input).unwrap();
        assert_eq!(decl.fields.len(), 2);
        assert_eq!(decl.fields[0].name, "id");
    }

    #[test]
    fn parses_nested_enum() {
        let code = "enum Elem { enum Button { struct Disabled {}; struct Active {}; }; }".to_string();
        let input = NomSpan::new_extra(code.as_str(), State::new(SourceFile::new(vec!["<memory>".into()], code.clone())));
        let (_, decl) = parse_enum_decl(input).unwrap();
        assert_eq!(decl.name, "Elem");
        assert_eq!(decl.variants.len(), 1);
        assert!(decl.variants[0].is_enum());
    }

    #[test]
    fn parses_function_with_parameters_and_return() {
        let code = "fn add(a: i32, mut b: i32) -> i32 { return a; }".to_string();
        let input = NomSpan::new_extra(code.as_str(), State::new(SourceFile::new(vec!["<memory>".into()], code.clone())));
        let (_, decl) = parse_function_decl(input).unwrap();
        assert_eq!(decl.name, "add");
        assert_eq!(decl.parameters.len(), 2);
        assert!(decl.parameters[1].mutable);
        assert!(decl.returns.is_some());
    }

    #[test]
    fn rejects_trailing_comma_in_parameters() {
        let code = "fn add(a: i32,) -> i32 { return a; }".to_string();
        let input = span(&code);
        assert!(parse_function_decl(input).is_err());
    }
}
