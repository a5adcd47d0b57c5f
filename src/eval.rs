//! Evaluator (§4.7): executes a `Module`'s function bodies against a lexical
//! frame stack, dispatching operators through the [`OperationRegistry`].
//!
//! Every match arm returns its `Value`/`TypeName` directly; there is no
//! mutable "current value" or "current name" slot threaded through the
//! walk (see `SPEC_FULL.md` §9 on why that box is not carried over here).

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use log::trace;

use crate::ast::{Assignment, Block, Expression, FieldAssignment, If, Match, Statement, TypeUse, VariableDeclaration, While};
use crate::error::{BranchwoodError, FunctionError, RuntimeError};
use crate::file::SourceFile;
use crate::frame::{Frame, Variable};
use crate::functions::FunctionsRegistry;
use crate::operations::OperationRegistry;
use crate::types::TypesRegistry;
use crate::value::Value;

/// How a statement or block finished: either it ran to completion, or a
/// `return` was encountered and is propagating up to the enclosing call.
enum Flow {
    Normal,
    Return(Value),
}

/// Drives evaluation of a single already-collected, already-validated
/// [`crate::ast::Module`]. Holds only shared references to the read-only
/// registries populated by collection; owns no mutable state of its own —
/// all mutable state lives in the [`Frame`] chain threaded through a call.
pub struct Evaluator<'a> {
    types: &'a TypesRegistry,
    functions: &'a FunctionsRegistry,
    operations: &'a OperationRegistry,
    file: &'a SourceFile,
}

impl<'a> Evaluator<'a> {
    pub fn new(types: &'a TypesRegistry, functions: &'a FunctionsRegistry, operations: &'a OperationRegistry, file: &'a SourceFile) -> Self {
        Self { types, functions, operations, file }
    }

    /// Calls the registered function named `name` with already-evaluated
    /// `arguments`, binding each to its parameter in a fresh root frame.
    pub fn call(&self, name: &str, arguments: Vec<Value>, call_location: &crate::ast::Location) -> Result<Value, BranchwoodError> {
        let function = self.functions.get(name).ok_or_else(|| FunctionError::unknown_function(name.to_string(), call_location, self.file))?;
        if arguments.len() != function.parameters.len() {
            return Err(FunctionError::arity_mismatch(name.to_string(), function.parameters.len(), arguments.len(), call_location, self.file).into());
        }

        let frame = Frame::root();
        for ((parameter_name, (mutable, declared_type)), value) in function.parameters.iter().zip(arguments) {
            if &value.type_name != declared_type {
                return Err(RuntimeError::type_mismatch(declared_type.clone(), value.type_name.clone(), call_location, self.file).into());
            }
            frame
                .borrow_mut()
                .declare(parameter_name.clone(), Variable { mutable: *mutable, value }, call_location.clone())
                .expect("a fresh frame never already contains its own just-declared parameter");
        }

        trace!("calling `{name}`");
        match self.eval_block(&function.body, &frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::unit()),
        }
    }

    fn eval_block(&self, block: &Block, parent: &Rc<RefCell<Frame>>) -> Result<Flow, BranchwoodError> {
        let frame = Frame::push(parent);
        for statement in &block.body {
            match self.eval_statement(statement, &frame)? {
                Flow::Normal => {}
                returning @ Flow::Return(_) => return Ok(returning),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_statement(&self, statement: &Statement, frame: &Rc<RefCell<Frame>>) -> Result<Flow, BranchwoodError> {
        trace!("evaluating statement: {:?}", std::mem::discriminant(statement));
        match statement {
            Statement::Block(block) => self.eval_block(block, frame),
            Statement::VariableDeclaration(declaration) => self.eval_variable_declaration(declaration, frame).map(|()| Flow::Normal),
            Statement::Assignment(assignment) => self.eval_assignment(assignment, frame).map(|()| Flow::Normal),
            Statement::Return(ret) => {
                let value = match &ret.value {
                    Some(expression) => self.eval_expression(expression, frame)?,
                    None => Value::unit(),
                };
                Ok(Flow::Return(value))
            }
            Statement::If(if_) => self.eval_if(if_, frame),
            Statement::While(while_) => self.eval_while(while_, frame),
            Statement::Match(match_) => self.eval_match(match_, frame),
            Statement::Expression(expression) => self.eval_expression(expression, frame).map(|_| Flow::Normal),
        }
    }

    fn eval_variable_declaration(&self, declaration: &VariableDeclaration, frame: &Rc<RefCell<Frame>>) -> Result<(), BranchwoodError> {
        let declared_type = declaration.declared_type.as_ref().map(TypeUse::to_type_name);

        let value = match &declaration.value {
            Some(initializer) => self.eval_expression(initializer, frame)?,
            None => {
                let zero_type = declared_type.clone().ok_or_else(|| RuntimeError::unbound_name(declaration.name.clone(), &declaration.location, self.file))?;
                Value::zero_of(&zero_type).ok_or_else(|| RuntimeError::type_mismatch(zero_type.clone(), zero_type, &declaration.location, self.file))?
            }
        };

        if let Some(expected) = &declared_type {
            if &value.type_name != expected {
                return Err(RuntimeError::type_mismatch(expected.clone(), value.type_name.clone(), &declaration.location, self.file).into());
            }
        }

        frame
            .borrow_mut()
            .declare(declaration.name.clone(), Variable { mutable: declaration.mutable, value }, declaration.location.clone())
            .map_err(|old_location| RuntimeError::redeclaration(declaration.name.clone(), &declaration.location, &old_location, self.file))?;
        Ok(())
    }

    fn eval_assignment(&self, assignment: &Assignment, frame: &Rc<RefCell<Frame>>) -> Result<(), BranchwoodError> {
        let value = self.eval_expression(&assignment.value, frame)?;
        let (root_name, field_path) = access_path(&assignment.access);

        let mut variable = frame
            .borrow()
            .get(&root_name)
            .ok_or_else(|| RuntimeError::unbound_name(root_name.clone(), &assignment.location, self.file))?;
        if !variable.mutable {
            return Err(RuntimeError::immutable_assignment(root_name, &assignment.location, self.file).into());
        }

        if field_path.is_empty() {
            if variable.value.type_name != value.type_name {
                return Err(RuntimeError::type_mismatch(variable.value.type_name.clone(), value.type_name, &assignment.location, self.file).into());
            }
            variable.value = value;
        } else {
            set_field_path(&mut variable.value, &field_path, value, &assignment.location, self.file)?;
        }

        if !frame.borrow_mut().set(&root_name, variable.value) {
            return Err(RuntimeError::unbound_name(root_name, &assignment.location, self.file).into());
        }
        Ok(())
    }

    fn eval_if(&self, if_: &If, frame: &Rc<RefCell<Frame>>) -> Result<Flow, BranchwoodError> {
        let condition = self.eval_expression(&if_.condition, frame)?;
        if condition.truthy() {
            self.eval_block(&if_.then_branch, frame)
        } else if let Some(else_branch) = &if_.else_branch {
            self.eval_block(else_branch, frame)
        } else {
            Ok(Flow::Normal)
        }
    }

    fn eval_while(&self, while_: &While, frame: &Rc<RefCell<Frame>>) -> Result<Flow, BranchwoodError> {
        loop {
            let condition = self.eval_expression(&while_.condition, frame)?;
            if !condition.truthy() {
                return Ok(Flow::Normal);
            }
            match self.eval_block(&while_.body, frame)? {
                Flow::Normal => continue,
                returning @ Flow::Return(_) => return Ok(returning),
            }
        }
    }

    fn eval_match(&self, match_: &Match, frame: &Rc<RefCell<Frame>>) -> Result<Flow, BranchwoodError> {
        let subject = self.eval_expression(&match_.subject, frame)?;
        for matcher in &match_.matchers {
            if matcher.declared_type.to_type_name() != subject.type_name {
                continue;
            }
            let arm_frame = Frame::push(frame);
            arm_frame
                .borrow_mut()
                .declare(matcher.binding_name.clone(), Variable { mutable: false, value: subject }, matcher.location.clone())
                .expect("a fresh frame never already contains its own just-declared match binding");
            return self.eval_block(&matcher.body, &arm_frame);
        }
        Err(RuntimeError::non_exhaustive_match(&match_.location, self.file).into())
    }

    fn eval_expression(&self, expression: &Expression, frame: &Rc<RefCell<Frame>>) -> Result<Value, BranchwoodError> {
        match expression {
            Expression::Constant { value, .. } => Ok(constant_value(value)),

            Expression::Name { identifier, location } => frame
                .borrow()
                .get(identifier)
                .map(|variable| variable.value)
                .ok_or_else(|| RuntimeError::unbound_name(identifier.clone(), location, self.file).into()),

            Expression::Access { .. } => self.eval_access(expression, frame),

            Expression::UnaryOperation { op, operand, location } => {
                let operand = self.eval_expression(operand, frame)?;
                Ok(self.operations.unary(*op, &operand, location, self.file)?)
            }

            Expression::BinaryOperation { op, left, right, location } => {
                let left = self.eval_expression(left, frame)?;
                let right = self.eval_expression(right, frame)?;
                Ok(self.operations.binary(*op, &left, &right, location, self.file)?)
            }

            Expression::BoolOperation { op, left, right, location } => {
                let left = self.eval_expression(left, frame)?;
                let right = self.eval_expression(right, frame)?;
                Ok(self.operations.boolean(*op, &left, &right, location, self.file)?)
            }

            Expression::Compare { mode, left, right, location } => {
                let left = self.eval_expression(left, frame)?;
                let right = self.eval_expression(right, frame)?;
                Ok(self.operations.compare(*mode, &left, &right, location, self.file)?)
            }

            Expression::Cast { value, to_type, location } => {
                let value = self.eval_expression(value, frame)?;
                Ok(self.operations.cast(&value, &to_type.to_type_name(), location, self.file)?)
            }

            Expression::IsCompare { value, is_type, .. } => {
                let value = self.eval_expression(value, frame)?;
                Ok(self.operations.is_test(&value, &is_type.to_type_name()))
            }

            Expression::FnCall { name, arguments, location } => {
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.eval_expression(argument, frame)?);
                }
                self.call(name, values, location)
            }

            Expression::NewStruct { variant, assignments, location } => self.eval_new_struct(variant, assignments, location, frame),
        }
    }

    fn eval_access(&self, expression: &Expression, frame: &Rc<RefCell<Frame>>) -> Result<Value, BranchwoodError> {
        let (root_name, field_path) = access_path(expression);
        let root = frame
            .borrow()
            .get(&root_name)
            .map(|variable| variable.value)
            .ok_or_else(|| RuntimeError::unbound_name(root_name.clone(), &expression.location(), self.file))?;

        let mut current = root;
        for field in &field_path {
            let fields = current
                .as_struct_fields()
                .ok_or_else(|| RuntimeError::unbound_name(format!("{root_name}.{field}"), &expression.location(), self.file))?;
            current = fields
                .get(field)
                .cloned()
                .ok_or_else(|| RuntimeError::unbound_name(format!("{root_name}.{field}"), &expression.location(), self.file))?;
        }
        Ok(current)
    }

    fn eval_new_struct(&self, variant: &TypeUse, assignments: &[FieldAssignment], location: &crate::ast::Location, frame: &Rc<RefCell<Frame>>) -> Result<Value, BranchwoodError> {
        let type_name = variant.to_type_name();
        let implementation = self
            .types
            .get(&type_name)
            .and_then(|implementation| implementation.as_struct())
            .ok_or_else(|| crate::error::ValidationError::not_a_struct(type_name.clone(), location, self.file))?;

        let mut fields = IndexMap::new();
        for assignment in assignments {
            let value = self.eval_expression(&assignment.value, frame)?;
            fields.insert(assignment.name.clone(), value);
        }
        for (field_name, field_type) in &implementation.fields {
            if !fields.contains_key(field_name) {
                if let Some(zero) = Value::zero_of(field_type) {
                    fields.insert(field_name.clone(), zero);
                }
            }
        }
        Ok(Value::struct_(type_name, fields))
    }
}

/// Flattens a left-associative `Access`/`Name` chain into its root
/// identifier and the dotted field path leading to the accessed value.
fn access_path(expression: &Expression) -> (String, Vec<String>) {
    fn walk(expression: &Expression, path: &mut Vec<String>) -> String {
        match expression {
            Expression::Name { identifier, .. } => identifier.clone(),
            Expression::Access { parent, name, .. } => {
                let root = walk(parent, path);
                path.push(name.clone());
                root
            }
            _ => unreachable!("assignment/access targets are always Name or Access chains"),
        }
    }
    let mut path = Vec::new();
    let root = walk(expression, &mut path);
    (root, path)
}

fn set_field_path(target: &mut Value, path: &[String], value: Value, location: &crate::ast::Location, file: &SourceFile) -> Result<(), BranchwoodError> {
    let (field, rest) = path.split_first().expect("non-empty field path");
    let fields = target
        .as_struct_fields()
        .ok_or_else(|| RuntimeError::type_mismatch(crate::ast::TypeName::single("<struct>"), target.type_name.clone(), location, file))?;
    let mut current = fields.get(field).cloned().ok_or_else(|| RuntimeError::unbound_name(field.clone(), location, file))?;

    if rest.is_empty() {
        if current.type_name != value.type_name {
            return Err(RuntimeError::type_mismatch(current.type_name.clone(), value.type_name, location, file).into());
        }
        current = value;
    } else {
        set_field_path(&mut current, rest, value, location, file)?;
    }

    match &mut target.payload {
        crate::value::Payload::Struct(fields) => {
            fields.insert(field.clone(), current);
        }
        _ => unreachable!("checked above"),
    }
    Ok(())
}

fn constant_value(value: &crate::ast::ConstantValue) -> Value {
    match value {
        crate::ast::ConstantValue::I32(n) => Value::i32(*n),
        crate::ast::ConstantValue::F32(f) => Value::f32(*f),
        crate::ast::ConstantValue::Bool(b) => Value::bool(*b),
        crate::ast::ConstantValue::Str(s) => Value::str(s.clone()),
    }
}
