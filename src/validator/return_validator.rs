//! ReturnValidator (§4.4): a function declared with a return type must
//! return a value on every control-flow path; a function without one must
//! never `return` a value.
//!
//! Path coverage is a conservative syntactic check, not a full
//! control-flow analysis: a statement "returns" if it is itself a
//! `return`, an `if`/`else` whose both branches return, or a `match`
//! whose every written arm returns. `while` bodies never guarantee a
//! return, since the loop may run zero times.

use crate::ast::{Block, Module, Statement};
use crate::error::ValidationError;
use crate::file::SourceFile;

fn statement_returns(statement: &Statement) -> bool {
    match statement {
        Statement::Return(_) => true,
        Statement::Block(block) => block_returns(block),
        Statement::If(if_stmt) => match &if_stmt.else_branch {
            Some(else_branch) => block_returns(&if_stmt.then_branch) && block_returns(else_branch),
            None => false,
        },
        Statement::Match(match_stmt) => !match_stmt.matchers.is_empty() && match_stmt.matchers.iter().all(|matcher| block_returns(&matcher.body)),
        Statement::While(_) | Statement::VariableDeclaration(_) | Statement::Assignment(_) | Statement::Expression(_) => false,
    }
}

fn block_returns(block: &Block) -> bool {
    block.body.iter().any(statement_returns)
}

pub fn validate_returns(module: &Module, file: &SourceFile) -> Result<(), ValidationError> {
    for decl in &module.function_declarations {
        if decl.returns.is_some() && !block_returns(&decl.body) {
            return Err(ValidationError::missing_return(decl.name.clone(), &decl.location, file));
        }

        if decl.returns.is_none() {
            let mut returns = Vec::new();
            super::walk_statements_in_block(&decl.body, &mut |statement| {
                if let Statement::Return(r) = statement {
                    returns.push(r);
                }
            });
            for r in returns {
                if r.value.is_some() {
                    return Err(ValidationError::unexpected_return_value(decl.name.clone(), &r.location, file));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ast::{ConstantValue, Expression, FunctionDeclaration, If, Location, Position, Return};

    use super::*;

    fn loc() -> Location {
        Location::new(Position::new(1, 1), Position::new(1, 1), 0..1).unwrap()
    }

    fn file() -> SourceFile {
        SourceFile::new(vec!["<memory>".into()], String::new())
    }

    fn value() -> Expression {
        Expression::Constant { value: ConstantValue::I32(1), location: loc() }
    }

    fn func(returns_value_type: bool, body: Vec<Statement>) -> FunctionDeclaration {
        FunctionDeclaration {
            name: "f".into(),
            parameters: vec![],
            returns: returns_value_type.then(|| crate::ast::TypeUse::Name { name: "i32".into(), location: loc() }),
            body: Block { body, location: loc() },
            location: loc(),
        }
    }

    #[test]
    fn accepts_a_function_that_always_returns() {
        let module = Module { function_declarations: vec![func(true, vec![Statement::Return(Return { value: Some(value()), location: loc() })])], ..Default::default() };
        assert!(validate_returns(&module, &file()).is_ok());
    }

    #[test]
    fn rejects_a_value_returning_function_missing_a_return() {
        let module = Module { function_declarations: vec![func(true, vec![])], ..Default::default() };
        let err = validate_returns(&module, &file()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingReturn { .. }));
    }

    #[test]
    fn accepts_an_if_else_where_both_branches_return() {
        let then_branch = Block { body: vec![Statement::Return(Return { value: Some(value()), location: loc() })], location: loc() };
        let else_branch = Block { body: vec![Statement::Return(Return { value: Some(value()), location: loc() })], location: loc() };
        let if_stmt = Statement::If(If { condition: value(), then_branch, else_branch: Some(else_branch), location: loc() });
        let module = Module { function_declarations: vec![func(true, vec![if_stmt])], ..Default::default() };
        assert!(validate_returns(&module, &file()).is_ok());
    }

    #[test]
    fn rejects_a_void_function_that_returns_a_value() {
        let module = Module { function_declarations: vec![func(false, vec![Statement::Return(Return { value: Some(value()), location: loc() })])], ..Default::default() };
        let err = validate_returns(&module, &file()).unwrap_err();
        assert!(matches!(err, ValidationError::UnexpectedReturnValue { .. }));
    }

    #[test]
    fn allows_a_void_function_to_return_without_a_value() {
        let module = Module { function_declarations: vec![func(false, vec![Statement::Return(Return { value: None, location: loc() })])], ..Default::default() };
        assert!(validate_returns(&module, &file()).is_ok());
    }
}
