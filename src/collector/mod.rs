//! Types Collector and Functions Collector (§4.2, §4.3), run in that order
//! to populate the registries a [`crate::validator`] pass and the evaluator
//! then treat as read-only.

pub mod functions_collector;
pub mod types_collector;

use crate::ast::Module;
use crate::error::BranchwoodError;
use crate::file::SourceFile;
use crate::functions::FunctionsRegistry;
use crate::types::TypesRegistry;

/// Runs the Types Collector then the Functions Collector over `module`,
/// producing both read-only registries the evaluator will query.
pub fn collect(module: &Module, file: &SourceFile) -> Result<(TypesRegistry, FunctionsRegistry), BranchwoodError> {
    let types = types_collector::collect_types(module, file)?;
    let functions = match functions_collector::collect_functions(module, &types, file) {
        Ok(registry) => registry,
        Err(functions_collector::FunctionsCollectError::Type(e)) => return Err(e.into()),
        Err(functions_collector::FunctionsCollectError::Function(e)) => return Err(e.into()),
    };
    Ok((types, functions))
}
