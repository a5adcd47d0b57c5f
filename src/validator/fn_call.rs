//! FnCallValidator (§4.4): every call names a registered function at the
//! right arity. Argument *types* are left to the evaluator (§4.7); this
//! pass only checks what is knowable without running anything.

use crate::ast::{Expression, Module};
use crate::error::FunctionError;
use crate::file::SourceFile;
use crate::functions::FunctionsRegistry;

pub fn validate_fn_calls(module: &Module, functions: &FunctionsRegistry, file: &SourceFile) -> Result<(), FunctionError> {
    for decl in &module.function_declarations {
        let mut calls = Vec::new();
        super::walk_expressions_in_block(&decl.body, &mut |expr| {
            if matches!(expr, Expression::FnCall { .. }) {
                calls.push(expr);
            }
        });

        for expr in calls {
            let Expression::FnCall { name, arguments, location } = expr else {
                unreachable!("filtered to FnCall above");
            };
            let implementation = functions.get(name).ok_or_else(|| FunctionError::unknown_function(name.clone(), location, file))?;
            let expected = implementation.parameters.len();
            let found = arguments.len();
            if expected != found {
                return Err(FunctionError::arity_mismatch(name.clone(), expected, found, location, file));
            }
        }
    }
    Ok(())
}
