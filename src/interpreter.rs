//! Public driving API (§4.7, §6): owns the registries produced by
//! collection, runs validation once at construction, and exposes `run` as
//! the only way to execute a function afterward.
//!
//! Mirrors the grounding repository's `TirContext`-as-registry-holder shape
//! and its `process_code`/`process_ast` pipeline entry points, collapsed
//! into a single struct since this crate has one pipeline, not a multi-pass
//! type-checker with separate public stages.

use log::debug;
use nom_language::error::VerboseErrorKind;

use crate::ast::{Location, Module};
use crate::collector::collect;
use crate::error::{BranchwoodError, SyntaxError, SyntaxErrorItem};
use crate::eval::Evaluator;
use crate::file::SourceFile;
use crate::functions::FunctionsRegistry;
use crate::nom_tools::{span_location, State};
use crate::operations::OperationRegistry;
use crate::parser::{self, BranchwoodParserError};
use crate::types::TypesRegistry;
use crate::validator;
use crate::value::Value;

/// Parses `file` into a [`Module`], converting `nom` backtracking state into
/// this crate's own [`SyntaxError`] at the boundary — the same conversion
/// shape as the grounding repository's `handle_parser`.
pub fn parse_module(file: &SourceFile) -> Result<Module, BranchwoodError> {
    let state = State::new(file.clone());
    match parser::parse(&state) {
        Ok((_, module)) => Ok(module),
        Err(err) => Err(convert_parse_error(err, file).into()),
    }
}

fn convert_parse_error(err: nom::Err<BranchwoodParserError<'_>>, file: &SourceFile) -> SyntaxError {
    let errors = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.errors,
        nom::Err::Incomplete(_) => {
            return SyntaxError { items: vec![SyntaxErrorItem::new("unexpected end of input", &Location::synthetic(), file)] };
        }
    };

    let items = errors
        .iter()
        .map(|(span, kind)| {
            let message = match kind {
                VerboseErrorKind::Context(context) => context.to_string(),
                VerboseErrorKind::Char(c) => format!("expected `{c}`"),
                VerboseErrorKind::Nom(kind) => format!("{kind:?}"),
            };
            SyntaxErrorItem::new(message, &span_location(span), file)
        })
        .collect();
    SyntaxError { items }
}

/// A fully collected and validated module, ready to run entry functions
/// against. Construction does parsing, collection, and validation; `run`
/// only does evaluation.
pub struct Interpreter {
    types: TypesRegistry,
    functions: FunctionsRegistry,
    operations: OperationRegistry,
    file: SourceFile,
}

impl Interpreter {
    /// Parses, collects, and validates `file`, failing at the first phase
    /// that rejects it.
    pub fn load(file: SourceFile) -> Result<Self, BranchwoodError> {
        let module = parse_module(&file)?;
        let (types, functions) = collect(&module, &file)?;
        validator::validate(&module, &types, &functions, &file)?;
        debug!("loaded module with {} type(s), {} function(s)", types.len(), functions.len());
        Ok(Self { types, functions, operations: OperationRegistry::new(), file })
    }

    /// Runs the registered function `name` with `arguments`, returning the
    /// value carried by its `return` (or [`Value::unit`] if it falls off
    /// the end of its body).
    pub fn run(&self, name: &str, arguments: Vec<Value>) -> Result<Value, BranchwoodError> {
        let entry = self.functions.get(name).ok_or_else(|| BranchwoodError::UndefinedEntryFunction(name.to_string()))?;
        let evaluator = Evaluator::new(&self.types, &self.functions, &self.operations, &self.file);
        evaluator.call(name, arguments, &entry.declaring_position)
    }

    pub fn types(&self) -> &TypesRegistry {
        &self.types
    }

    pub fn functions(&self) -> &FunctionsRegistry {
        &self.functions
    }
}
