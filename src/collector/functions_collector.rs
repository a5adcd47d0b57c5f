//! Functions Collector (§4.3): registers every top-level function under its
//! single-segment `TypeName`, resolving parameter and return types against
//! an already-populated [`TypesRegistry`].

use indexmap::IndexMap;

use crate::ast::Module;
use crate::error::{FunctionError, TypeError};
use crate::file::SourceFile;
use crate::functions::{FunctionImplementation, FunctionsRegistry};
use crate::types::TypesRegistry;

/// Error union for the functions-collection pass: a parameter/return type
/// may be unknown, or the function name itself may already be declared.
#[derive(Debug, thiserror::Error)]
pub enum FunctionsCollectError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Function(#[from] FunctionError),
}

pub fn collect_functions(module: &Module, types: &TypesRegistry, file: &SourceFile) -> Result<FunctionsRegistry, FunctionsCollectError> {
    let mut registry = FunctionsRegistry::new();

    for decl in &module.function_declarations {
        let mut parameters = IndexMap::new();
        for parameter in &decl.parameters {
            let type_name = parameter.declared_type.to_type_name();
            if !types.is_known(&type_name) {
                return Err(TypeError::unknown_type(type_name, &parameter.location, file).into());
            }
            parameters.insert(parameter.name.clone(), (parameter.mutable, type_name));
        }

        let return_type = match &decl.returns {
            Some(use_) => {
                let type_name = use_.to_type_name();
                if !types.is_known(&type_name) {
                    return Err(TypeError::unknown_type(type_name, &use_.location(), file).into());
                }
                Some(type_name)
            }
            None => None,
        };

        let implementation = FunctionImplementation {
            name: decl.name.clone(),
            parameters,
            return_type,
            body: decl.body.clone(),
            declaring_position: decl.location.clone(),
        };
        registry.register(implementation, file)?;
    }

    Ok(registry)
}
