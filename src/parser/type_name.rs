//! Type-use-site parsing: `NAME ('::' NAME)*`.
//!
//! A single identifier parses to [`TypeUse::Name`]; each further `::`
//! segment wraps the previous use in a left-associative
//! [`TypeUse::VariantAccess`], mirroring how the grounding repository builds
//! its dot-separated qualified type names, with `::` in place of `.`.

use nom::bytes::complete::tag;
use nom::combinator::consumed;
use nom::multi::many0;
use nom::sequence::preceded;
use nom::{IResult, Parser};

use crate::ast::TypeUse;
use crate::nom_tools::{cleanup, span_location, NomSpan};

use super::{ident, BranchwoodParserError};

/// Parses a `NAME ('::' NAME)*` chain into a [`TypeUse`].
pub fn parse_type_use(input: NomSpan<'_>) -> IResult<NomSpan<'_>, TypeUse, BranchwoodParserError<'_>> {
    let (input, (first_span, first_name)) = consumed(cleanup(ident())).parse(input)?;
    let mut use_ = TypeUse::Name { name: first_name.fragment().to_string(), location: span_location(&first_span) };

    let (input, segments) = many0(consumed(preceded(cleanup(tag("::")), cleanup(ident())))).parse(input)?;

    for (segment_span, segment) in segments {
        let location = use_.location().merge(&span_location(&segment_span));
        use_ = TypeUse::VariantAccess { parent: Box::new(use_), name: segment.fragment().to_string(), location };
    }

    Ok((input, use_))
}
