//! Type registry: qualified-name to type-implementation mapping (§3, §4.2).
//!
//! Entries here outlive the parse that produced them, so duplicate
//! tracking is done with an owned [`Location`] per key rather than a
//! borrowed source span.

use indexmap::IndexMap;
use log::debug;

use crate::ast::{Location, TypeName};
use crate::error::TypeError;
use crate::file::SourceFile;

/// A registered struct type: its fields, in declaration order, resolved to
/// [`TypeName`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct StructImplementation {
    pub name: TypeName,
    pub fields: IndexMap<String, TypeName>,
}

/// A registered enum type: its variants, in declaration order, each itself a
/// nested [`TypeImplementation`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnumImplementation {
    pub name: TypeName,
    pub variants: IndexMap<String, TypeImplementation>,
}

/// Either shape a registered, non-primitive type can take.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeImplementation {
    Struct(StructImplementation),
    Enum(EnumImplementation),
}

impl TypeImplementation {
    pub fn name(&self) -> &TypeName {
        match self {
            TypeImplementation::Struct(s) => &s.name,
            TypeImplementation::Enum(e) => &e.name,
        }
    }

    pub fn as_struct(&self) -> Option<&StructImplementation> {
        match self {
            TypeImplementation::Struct(s) => Some(s),
            TypeImplementation::Enum(_) => None,
        }
    }
}

/// Qualified-name to [`TypeImplementation`] mapping, populated once by the
/// types collector and read-only afterward.
#[derive(Debug, Default)]
pub struct TypesRegistry {
    implementations: IndexMap<TypeName, TypeImplementation>,
    declared_at: IndexMap<TypeName, Location>,
}

impl TypesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `implementation` under `name`, or fails with a
    /// [`TypeError::Redeclaration`] if `name` was already registered.
    pub fn register(&mut self, name: TypeName, implementation: TypeImplementation, location: &Location, file: &SourceFile) -> Result<(), TypeError> {
        if let Some(old_location) = self.declared_at.get(&name) {
            return Err(TypeError::redeclaration(name, location, old_location, file));
        }
        debug!("registering type `{name}`");
        self.declared_at.insert(name.clone(), location.clone());
        self.implementations.insert(name, implementation);
        Ok(())
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeImplementation> {
        self.implementations.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.implementations.contains_key(name)
    }

    /// True when `name` names either a primitive or a registered type,
    /// i.e. it is a legal type reference anywhere in a program.
    pub fn is_known(&self, name: &TypeName) -> bool {
        crate::ast::is_primitive_type_name(name) || self.contains(name)
    }

    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeName, &TypeImplementation)> {
        self.implementations.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ast::Position;

    use super::*;

    fn loc() -> Location {
        Location::new(Position::new(1, 1), Position::new(1, 1), 0..1).unwrap()
    }

    fn file() -> SourceFile {
        SourceFile::new(vec!["<memory>".into()], String::new())
    }

    #[test]
    fn registers_and_looks_up_a_struct() {
        let mut registry = TypesRegistry::new();
        let name = TypeName::single("Item");
        let implementation = TypeImplementation::Struct(StructImplementation { name: name.clone(), fields: IndexMap::new() });
        registry.register(name.clone(), implementation, &loc(), &file()).unwrap();
        assert!(registry.contains(&name));
        assert_eq!(registry.get(&name).unwrap().name(), &name);
    }

    #[test]
    fn rejects_redeclaration() {
        let mut registry = TypesRegistry::new();
        let name = TypeName::single("Item");
        let implementation = || TypeImplementation::Struct(StructImplementation { name: name.clone(), fields: IndexMap::new() });
        registry.register(name.clone(), implementation(), &loc(), &file()).unwrap();
        let err = registry.register(name.clone(), implementation(), &loc(), &file()).unwrap_err();
        assert!(matches!(err, TypeError::Redeclaration { .. }));
    }

    #[test]
    fn primitive_names_are_known_without_registration() {
        let registry = TypesRegistry::new();
        assert!(registry.is_known(&TypeName::single("i32")));
        assert!(!registry.is_known(&TypeName::single("Item")));
    }
}
