//! NewStructValidator (§4.4): a struct literal's variant must resolve to a
//! registered struct, every assignment must name a declared field, and any
//! field omitted from the literal must have a primitive (zero-form) type.

use std::collections::HashSet;

use crate::ast::{is_primitive_type_name, Expression, FieldAssignment, Module, TypeUse};
use crate::error::ValidationError;
use crate::file::SourceFile;
use crate::types::TypesRegistry;

pub fn validate_new_structs(module: &Module, types: &TypesRegistry, file: &SourceFile) -> Result<(), ValidationError> {
    for decl in &module.function_declarations {
        let mut literals = Vec::new();
        super::walk_expressions_in_block(&decl.body, &mut |expr| {
            if matches!(expr, Expression::NewStruct { .. }) {
                literals.push(expr);
            }
        });

        for expr in literals {
            let Expression::NewStruct { variant, assignments, .. } = expr else {
                unreachable!("filtered to NewStruct above");
            };
            validate_literal(variant, assignments, types, file)?;
        }
    }
    Ok(())
}

fn validate_literal(variant: &TypeUse, assignments: &[FieldAssignment], types: &TypesRegistry, file: &SourceFile) -> Result<(), ValidationError> {
    let type_name = variant.to_type_name();
    let struct_impl = types
        .get(&type_name)
        .and_then(|implementation| implementation.as_struct())
        .ok_or_else(|| ValidationError::not_a_struct(type_name.clone(), &variant.location(), file))?;

    let mut assigned = HashSet::new();
    for assignment in assignments {
        if !struct_impl.fields.contains_key(&assignment.name) {
            return Err(ValidationError::unknown_field(type_name.clone(), assignment.name.clone(), &assignment.location, file));
        }
        assigned.insert(assignment.name.as_str());
    }

    for (field_name, field_type) in &struct_impl.fields {
        if assigned.contains(field_name.as_str()) {
            continue;
        }
        if !is_primitive_type_name(field_type) {
            return Err(ValidationError::missing_field(type_name.clone(), field_name.clone(), &variant.location(), file));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::ast::{Block, ConstantValue, FunctionDeclaration, Location, Position, Statement, TypeName};
    use crate::types::{StructImplementation, TypeImplementation};

    use super::*;

    fn loc() -> Location {
        Location::new(Position::new(1, 1), Position::new(1, 1), 0..1).unwrap()
    }

    fn file() -> SourceFile {
        SourceFile::new(vec!["<memory>".into()], String::new())
    }

    fn registry_with_item(extra_field_type: Option<TypeName>) -> TypesRegistry {
        let mut fields = IndexMap::new();
        fields.insert("id".to_string(), TypeName::single("i32"));
        if let Some(t) = extra_field_type {
            fields.insert("owner".to_string(), t);
        }
        let mut registry = TypesRegistry::new();
        registry.register(TypeName::single("Item"), TypeImplementation::Struct(StructImplementation { name: TypeName::single("Item"), fields }), &loc(), &file()).unwrap();
        registry
    }

    fn module_with(literal: Expression) -> Module {
        let decl = FunctionDeclaration {
            name: "main".into(),
            parameters: vec![],
            returns: None,
            body: Block { body: vec![Statement::Expression(literal)], location: loc() },
            location: loc(),
        };
        Module { function_declarations: vec![decl], ..Default::default() }
    }

    fn field(name: &str, value: i32) -> FieldAssignment {
        FieldAssignment { name: name.into(), value: Expression::Constant { value: ConstantValue::I32(value), location: loc() }, location: loc() }
    }

    #[test]
    fn accepts_a_fully_assigned_literal() {
        let registry = registry_with_item(None);
        let literal = Expression::NewStruct { variant: TypeUse::Name { name: "Item".into(), location: loc() }, assignments: vec![field("id", 1)], location: loc() };
        let module = module_with(literal);
        assert!(validate_new_structs(&module, &registry, &file()).is_ok());
    }

    #[test]
    fn allows_omitting_a_primitive_field() {
        let registry = registry_with_item(None);
        let literal = Expression::NewStruct { variant: TypeUse::Name { name: "Item".into(), location: loc() }, assignments: vec![], location: loc() };
        let module = module_with(literal);
        assert!(validate_new_structs(&module, &registry, &file()).is_ok());
    }

    #[test]
    fn rejects_omitting_a_struct_typed_field() {
        let registry = registry_with_item(Some(TypeName::single("Owner")));
        let literal = Expression::NewStruct { variant: TypeUse::Name { name: "Item".into(), location: loc() }, assignments: vec![field("id", 1)], location: loc() };
        let module = module_with(literal);
        let err = validate_new_structs(&module, &registry, &file()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { .. }));
    }

    #[test]
    fn rejects_an_unknown_field() {
        let registry = registry_with_item(None);
        let literal = Expression::NewStruct { variant: TypeUse::Name { name: "Item".into(), location: loc() }, assignments: vec![field("id", 1), field("bogus", 2)], location: loc() };
        let module = module_with(literal);
        let err = validate_new_structs(&module, &registry, &file()).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }

    #[test]
    fn rejects_a_non_struct_variant() {
        let registry = TypesRegistry::new();
        let literal = Expression::NewStruct { variant: TypeUse::Name { name: "Ghost".into(), location: loc() }, assignments: vec![], location: loc() };
        let module = module_with(literal);
        let err = validate_new_structs(&module, &registry, &file()).unwrap_err();
        assert!(matches!(err, ValidationError::NotAStruct { .. }));
    }
}
