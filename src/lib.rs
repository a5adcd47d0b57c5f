//! `branchwood`: a tree-walking interpreter core for a small, statically
//! typed expression language with nested enumerations, algebraic struct
//! variants, lexical scoping, and runtime-dispatched operators.
//!
//! An embedder builds an [`Interpreter`] from a [`SourceFile`], then calls
//! [`Interpreter::run`] with an entry function name and argument [`Value`]s.
//! Every fallible phase (parse, collect, validate, run) returns a
//! [`BranchwoodError`] that carries a precise [`miette::Diagnostic`] span
//! into the original source.

pub mod ast;
pub mod collector;
pub mod error;
pub mod eval;
pub mod file;
pub mod frame;
pub mod functions;
pub mod interpreter;
pub mod nom_tools;
pub mod operations;
pub mod parser;
pub mod types;
pub mod validator;
pub mod value;

pub use error::BranchwoodError;
pub use file::SourceFile;
pub use interpreter::Interpreter;
pub use value::Value;
