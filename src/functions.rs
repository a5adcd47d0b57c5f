//! Function registry: qualified-name to function-implementation mapping
//! (§3, §4.3).
//!
//! Same reasoning as [`crate::types::TypesRegistry`]: a function outlives
//! the parse that produced it, so redeclaration tracking keeps its own
//! owned [`Location`] instead of borrowing a source span.

use indexmap::IndexMap;
use log::debug;

use crate::ast::{Block, Location, TypeName};
use crate::error::FunctionError;
use crate::file::SourceFile;

/// A registered function signature plus its body, ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionImplementation {
    pub name: String,
    /// Parameter name to `(mutable, declared type)`, in declaration order.
    pub parameters: IndexMap<String, (bool, TypeName)>,
    pub return_type: Option<TypeName>,
    pub body: Block,
    pub declaring_position: Location,
}

/// Single-segment-`TypeName`-keyed function registry, populated once by the
/// functions collector and read-only afterward.
#[derive(Debug, Default)]
pub struct FunctionsRegistry {
    implementations: IndexMap<TypeName, FunctionImplementation>,
}

impl FunctionsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `implementation`, or fails with
    /// [`FunctionError::Redeclaration`] if its name is already registered.
    pub fn register(&mut self, implementation: FunctionImplementation, file: &SourceFile) -> Result<(), FunctionError> {
        let key = TypeName::single(implementation.name.clone());
        if let Some(existing) = self.implementations.get(&key) {
            return Err(FunctionError::redeclaration(
                implementation.name.clone(),
                &implementation.declaring_position,
                &existing.declaring_position,
                file,
            ));
        }
        debug!("registering function `{}`", implementation.name);
        self.implementations.insert(key, implementation);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FunctionImplementation> {
        self.implementations.get(&TypeName::single(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.implementations.contains_key(&TypeName::single(name))
    }

    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
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

    fn sample(name: &str) -> FunctionImplementation {
        FunctionImplementation {
            name: name.to_string(),
            parameters: IndexMap::new(),
            return_type: None,
            body: Block { body: vec![], location: loc() },
            declaring_position: loc(),
        }
    }

    #[test]
    fn registers_and_looks_up_a_function() {
        let mut registry = FunctionsRegistry::new();
        registry.register(sample("main"), &file()).unwrap();
        assert!(registry.contains("main"));
        assert_eq!(registry.get("main").unwrap().name, "main");
    }

    #[test]
    fn rejects_redeclaration() {
        let mut registry = FunctionsRegistry::new();
        registry.register(sample("main"), &file()).unwrap();
        let err = registry.register(sample("main"), &file()).unwrap_err();
        assert!(matches!(err, FunctionError::Redeclaration { .. }));
    }
}
