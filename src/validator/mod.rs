//! Semantic Validators (§4.4): three independent tree walks over a fully
//! collected module, each failing on its first violation.
//!
//! The walking helpers here are shared by all three validators so each one
//! only has to describe what it is looking for, not how to reach every
//! statement or expression in a function body.

pub mod fn_call;
pub mod new_struct;
pub mod return_validator;

use crate::ast::{Block, Expression, Module, Statement};
use crate::error::BranchwoodError;
use crate::file::SourceFile;
use crate::functions::FunctionsRegistry;
use crate::types::TypesRegistry;

/// Runs the FnCallValidator, NewStructValidator, and ReturnValidator, in
/// that order, over `module`.
pub fn validate(module: &Module, types: &TypesRegistry, functions: &FunctionsRegistry, file: &SourceFile) -> Result<(), BranchwoodError> {
    fn_call::validate_fn_calls(module, functions, file)?;
    new_struct::validate_new_structs(module, types, file)?;
    return_validator::validate_returns(module, file)?;
    Ok(())
}

pub(crate) fn walk_statements_in_block<'a>(block: &'a Block, f: &mut impl FnMut(&'a Statement)) {
    for statement in &block.body {
        f(statement);
        match statement {
            Statement::Block(b) => walk_statements_in_block(b, f),
            Statement::If(i) => {
                walk_statements_in_block(&i.then_branch, f);
                if let Some(else_branch) = &i.else_branch {
                    walk_statements_in_block(else_branch, f);
                }
            }
            Statement::While(w) => walk_statements_in_block(&w.body, f),
            Statement::Match(m) => {
                for matcher in &m.matchers {
                    walk_statements_in_block(&matcher.body, f);
                }
            }
            Statement::VariableDeclaration(_) | Statement::Assignment(_) | Statement::Return(_) | Statement::Expression(_) => {}
        }
    }
}

pub(crate) fn walk_expressions_in_block<'a>(block: &'a Block, f: &mut impl FnMut(&'a Expression)) {
    for statement in &block.body {
        walk_expressions_in_statement(statement, f);
    }
}

fn walk_expressions_in_statement<'a>(statement: &'a Statement, f: &mut impl FnMut(&'a Expression)) {
    match statement {
        Statement::Block(b) => walk_expressions_in_block(b, f),
        Statement::VariableDeclaration(v) => {
            if let Some(value) = &v.value {
                walk_expression(value, f);
            }
        }
        Statement::Assignment(a) => {
            walk_expression(&a.access, f);
            walk_expression(&a.value, f);
        }
        Statement::Return(r) => {
            if let Some(value) = &r.value {
                walk_expression(value, f);
            }
        }
        Statement::If(i) => {
            walk_expression(&i.condition, f);
            walk_expressions_in_block(&i.then_branch, f);
            if let Some(else_branch) = &i.else_branch {
                walk_expressions_in_block(else_branch, f);
            }
        }
        Statement::While(w) => {
            walk_expression(&w.condition, f);
            walk_expressions_in_block(&w.body, f);
        }
        Statement::Match(m) => {
            walk_expression(&m.subject, f);
            for matcher in &m.matchers {
                walk_expressions_in_block(&matcher.body, f);
            }
        }
        Statement::Expression(e) => walk_expression(e, f),
    }
}

fn walk_expression<'a>(expr: &'a Expression, f: &mut impl FnMut(&'a Expression)) {
    f(expr);
    match expr {
        Expression::Constant { .. } | Expression::Name { .. } => {}
        Expression::Access { parent, .. } => walk_expression(parent, f),
        Expression::UnaryOperation { operand, .. } => walk_expression(operand, f),
        Expression::BinaryOperation { left, right, .. } | Expression::BoolOperation { left, right, .. } | Expression::Compare { left, right, .. } => {
            walk_expression(left, f);
            walk_expression(right, f);
        }
        Expression::Cast { value, .. } | Expression::IsCompare { value, .. } => walk_expression(value, f),
        Expression::FnCall { arguments, .. } => {
            for argument in arguments {
                walk_expression(argument, f);
            }
        }
        Expression::NewStruct { assignments, .. } => {
            for assignment in assignments {
                walk_expression(&assignment.value, f);
            }
        }
    }
}
