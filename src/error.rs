//! Error handling and diagnostics for the branchwood interpreter.
//!
//! Every failure in §7 of `SPEC_FULL.md` is represented as a typed,
//! location-bearing error. Leaf errors derive both `thiserror::Error` (for
//! `Display`/`std::error::Error`) and `miette::Diagnostic` (for source-span
//! labels and `help` text), so an embedder can render a full report with
//! `miette`'s own printer without this crate owning a CLI.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::{Location, TypeName};
use crate::file::SourceFile;

fn span_of(location: &Location) -> SourceSpan {
    let start = location.byte_range.start;
    let len = location.byte_range.end.saturating_sub(start);
    (start, len).into()
}

fn source_of(file: &SourceFile) -> NamedSource<String> {
    file.into()
}

/// A single syntax-error frame collected from a failed parse attempt.
#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(branchwood::syntax))]
pub struct SyntaxErrorItem {
    pub message: String,
    #[source_code]
    pub source_code: NamedSource<String>,
    #[label("{message}")]
    pub span: SourceSpan,
}

impl SyntaxErrorItem {
    pub fn new(message: impl Into<String>, location: &Location, file: &SourceFile) -> Self {
        Self { message: message.into(), source_code: source_of(file), span: span_of(location) }
    }
}

/// All syntax errors encountered while parsing a single source file.
#[derive(Debug, Error, Diagnostic)]
#[error("failed to parse source")]
pub struct SyntaxError {
    #[related]
    pub items: Vec<SyntaxErrorItem>,
}

/// Static errors raised while registering types (§4.2) or resolving
/// references to them.
#[derive(Debug, Error, Diagnostic)]
pub enum TypeError {
    #[error("type `{name}` is already declared")]
    #[diagnostic(code(branchwood::type_redeclaration), help("rename one of the two declarations"))]
    Redeclaration {
        name: TypeName,
        #[label("redeclared here")]
        new_span: SourceSpan,
        #[label("first declared here")]
        old_span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("unknown type `{name}`")]
    #[diagnostic(code(branchwood::unknown_type))]
    UnknownType {
        name: TypeName,
        #[label("referenced here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },
}

impl TypeError {
    pub fn redeclaration(name: TypeName, new_location: &Location, old_location: &Location, file: &SourceFile) -> Self {
        TypeError::Redeclaration {
            name,
            new_span: span_of(new_location),
            old_span: span_of(old_location),
            source_code: source_of(file),
        }
    }

    pub fn unknown_type(name: TypeName, location: &Location, file: &SourceFile) -> Self {
        TypeError::UnknownType { name, span: span_of(location), source_code: source_of(file) }
    }
}

/// Static errors raised while registering functions (§4.3) and validating
/// calls to them (§4.4 FnCallValidator).
#[derive(Debug, Error, Diagnostic)]
pub enum FunctionError {
    #[error("function `{name}` is already declared")]
    #[diagnostic(code(branchwood::function_redeclaration))]
    Redeclaration {
        name: String,
        #[label("redeclared here")]
        new_span: SourceSpan,
        #[label("first declared here")]
        old_span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("unknown function `{name}`")]
    #[diagnostic(code(branchwood::unknown_function))]
    UnknownFunction {
        name: String,
        #[label("called here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("function `{name}` expects {expected} argument(s), found {found}")]
    #[diagnostic(code(branchwood::arity_mismatch))]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        #[label("called here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },
}

impl FunctionError {
    pub fn redeclaration(name: String, new_location: &Location, old_location: &Location, file: &SourceFile) -> Self {
        FunctionError::Redeclaration {
            name,
            new_span: span_of(new_location),
            old_span: span_of(old_location),
            source_code: source_of(file),
        }
    }

    pub fn unknown_function(name: String, location: &Location, file: &SourceFile) -> Self {
        FunctionError::UnknownFunction { name, span: span_of(location), source_code: source_of(file) }
    }

    pub fn arity_mismatch(name: String, expected: usize, found: usize, location: &Location, file: &SourceFile) -> Self {
        FunctionError::ArityMismatch { name, expected, found, span: span_of(location), source_code: source_of(file) }
    }
}

/// Static errors raised by the `NewStruct` and `Return` validators (§4.4).
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("`{type_name}` is not a struct type")]
    #[diagnostic(code(branchwood::not_a_struct))]
    NotAStruct {
        type_name: TypeName,
        #[label("constructed here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("unknown field `{field}` on struct `{type_name}`")]
    #[diagnostic(code(branchwood::unknown_field))]
    UnknownField {
        type_name: TypeName,
        field: String,
        #[label("assigned here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("missing field `{field}` on struct `{type_name}` (no default form)")]
    #[diagnostic(code(branchwood::missing_field))]
    MissingField {
        type_name: TypeName,
        field: String,
        #[label("struct literal is missing this field")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("function `{function}` has a control-flow path without a return")]
    #[diagnostic(code(branchwood::missing_return))]
    MissingReturn {
        function: String,
        #[label("declared to return a value here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("function `{function}` returning void must not return a value")]
    #[diagnostic(code(branchwood::unexpected_return_value))]
    UnexpectedReturnValue {
        function: String,
        #[label("returns a value here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },
}

impl ValidationError {
    pub fn not_a_struct(type_name: TypeName, location: &Location, file: &SourceFile) -> Self {
        ValidationError::NotAStruct { type_name, span: span_of(location), source_code: source_of(file) }
    }

    pub fn unknown_field(type_name: TypeName, field: String, location: &Location, file: &SourceFile) -> Self {
        ValidationError::UnknownField { type_name, field, span: span_of(location), source_code: source_of(file) }
    }

    pub fn missing_field(type_name: TypeName, field: String, location: &Location, file: &SourceFile) -> Self {
        ValidationError::MissingField { type_name, field, span: span_of(location), source_code: source_of(file) }
    }

    pub fn missing_return(function: String, location: &Location, file: &SourceFile) -> Self {
        ValidationError::MissingReturn { function, span: span_of(location), source_code: source_of(file) }
    }

    pub fn unexpected_return_value(function: String, location: &Location, file: &SourceFile) -> Self {
        ValidationError::UnexpectedReturnValue { function, span: span_of(location), source_code: source_of(file) }
    }
}

/// Runtime failures raised during evaluation (§4.7).
#[derive(Debug, Error, Diagnostic)]
pub enum RuntimeError {
    #[error("unbound name `{name}`")]
    #[diagnostic(code(branchwood::unbound_name))]
    UnboundName {
        name: String,
        #[label("used here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("cannot assign to immutable variable `{name}`")]
    #[diagnostic(code(branchwood::immutable_assignment))]
    ImmutableAssignment {
        name: String,
        #[label("assigned here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    #[diagnostic(code(branchwood::type_mismatch))]
    TypeMismatch {
        expected: TypeName,
        found: TypeName,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("operation `{operator}` is not defined for `{left}` and `{right}`")]
    #[diagnostic(code(branchwood::operation_undefined))]
    OperationUndefined {
        operator: String,
        left: TypeName,
        right: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("match is not exhaustive for this value")]
    #[diagnostic(code(branchwood::non_exhaustive_match))]
    NonExhaustiveMatch {
        #[label("no matcher accepted the subject's type")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("division by zero")]
    #[diagnostic(code(branchwood::division_by_zero))]
    DivisionByZero {
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },

    #[error("`{name}` is already declared in this frame")]
    #[diagnostic(code(branchwood::variable_redeclaration), help("rename one of the two bindings, or drop the shadowing declaration"))]
    Redeclaration {
        name: String,
        #[label("redeclared here")]
        new_span: SourceSpan,
        #[label("first declared here")]
        old_span: SourceSpan,
        #[source_code]
        source_code: NamedSource<String>,
    },
}

impl RuntimeError {
    pub fn unbound_name(name: String, location: &Location, file: &SourceFile) -> Self {
        RuntimeError::UnboundName { name, span: span_of(location), source_code: source_of(file) }
    }

    pub fn immutable_assignment(name: String, location: &Location, file: &SourceFile) -> Self {
        RuntimeError::ImmutableAssignment { name, span: span_of(location), source_code: source_of(file) }
    }

    pub fn type_mismatch(expected: TypeName, found: TypeName, location: &Location, file: &SourceFile) -> Self {
        RuntimeError::TypeMismatch { expected, found, span: span_of(location), source_code: source_of(file) }
    }

    pub fn operation_undefined(operator: impl Into<String>, left: TypeName, right: Option<TypeName>, location: &Location, file: &SourceFile) -> Self {
        let right = right.map(|t| t.to_string()).unwrap_or_default();
        RuntimeError::OperationUndefined { operator: operator.into(), left, right, span: span_of(location), source_code: source_of(file) }
    }

    pub fn non_exhaustive_match(location: &Location, file: &SourceFile) -> Self {
        RuntimeError::NonExhaustiveMatch { span: span_of(location), source_code: source_of(file) }
    }

    pub fn division_by_zero(location: &Location, file: &SourceFile) -> Self {
        RuntimeError::DivisionByZero { span: span_of(location), source_code: source_of(file) }
    }

    pub fn redeclaration(name: String, new_location: &Location, old_location: &Location, file: &SourceFile) -> Self {
        RuntimeError::Redeclaration {
            name,
            new_span: span_of(new_location),
            old_span: span_of(old_location),
            source_code: source_of(file),
        }
    }
}

/// The top-level error type returned by every public entry point. Each
/// phase (`parse`, `collect`, `validate`, `run`) contributes one variant.
#[derive(Debug, Error, Diagnostic)]
pub enum BranchwoodError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Function(#[from] FunctionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("undefined entry function `{0}`")]
    #[diagnostic(code(branchwood::undefined_entry_function))]
    UndefinedEntryFunction(String),
}
