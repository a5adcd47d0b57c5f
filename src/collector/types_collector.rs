//! Types Collector (§4.2): registers every struct/enum, including deeply
//! nested enum variants, under its fully qualified path.
//!
//! Field types are recorded on the first DFS pass without checking that
//! they exist yet, so a struct can reference a sibling type declared later
//! or a type that (transitively) contains itself; a second pass then
//! verifies every recorded field type is either a primitive or now
//! registered. This is how cyclic type graphs are supported without a
//! forward-declaration syntax.

use indexmap::IndexMap;

use crate::ast::{EnumDeclaration, Location, Module, StructDeclaration, TypeDeclaration, TypeName};
use crate::error::TypeError;
use crate::file::SourceFile;
use crate::types::{EnumImplementation, StructImplementation, TypeImplementation, TypesRegistry};

fn qualify(parent: Option<&TypeName>, name: &str) -> TypeName {
    match parent {
        Some(p) => p.extend(name),
        None => TypeName::single(name),
    }
}

fn collect_struct(
    parent: Option<&TypeName>,
    decl: &StructDeclaration,
    registry: &mut TypesRegistry,
    file: &SourceFile,
    pending_field_types: &mut Vec<(TypeName, Location)>,
) -> Result<TypeName, TypeError> {
    let qualified = qualify(parent, &decl.name);
    let mut fields = IndexMap::new();
    for field in &decl.fields {
        let field_type = field.declared_type.to_type_name();
        pending_field_types.push((field_type.clone(), field.location.clone()));
        fields.insert(field.name.clone(), field_type);
    }
    let implementation = TypeImplementation::Struct(StructImplementation { name: qualified.clone(), fields });
    registry.register(qualified.clone(), implementation, &decl.location, file)?;
    Ok(qualified)
}

fn collect_variant(
    parent: Option<&TypeName>,
    variant: &TypeDeclaration,
    registry: &mut TypesRegistry,
    file: &SourceFile,
    pending_field_types: &mut Vec<(TypeName, Location)>,
) -> Result<TypeName, TypeError> {
    match variant {
        TypeDeclaration::Struct(s) => collect_struct(parent, s, registry, file, pending_field_types),
        TypeDeclaration::Enum(e) => collect_enum(parent, e, registry, file, pending_field_types),
    }
}

fn collect_enum(
    parent: Option<&TypeName>,
    decl: &EnumDeclaration,
    registry: &mut TypesRegistry,
    file: &SourceFile,
    pending_field_types: &mut Vec<(TypeName, Location)>,
) -> Result<TypeName, TypeError> {
    let qualified = qualify(parent, &decl.name);
    let mut variants = IndexMap::new();
    for variant in &decl.variants {
        let variant_name = collect_variant(Some(&qualified), variant, registry, file, pending_field_types)?;
        let variant_implementation = registry.get(&variant_name).expect("just registered above").clone();
        variants.insert(variant.name().to_string(), variant_implementation);
    }
    let implementation = TypeImplementation::Enum(EnumImplementation { name: qualified.clone(), variants });
    registry.register(qualified.clone(), implementation, &decl.location, file)?;
    Ok(qualified)
}

/// Walks every top-level declaration in `module`, registering the full
/// nested type tree into a fresh [`TypesRegistry`].
pub fn collect_types(module: &Module, file: &SourceFile) -> Result<TypesRegistry, TypeError> {
    let mut registry = TypesRegistry::new();
    let mut pending_field_types = Vec::new();

    for decl in &module.struct_declarations {
        collect_struct(None, decl, &mut registry, file, &mut pending_field_types)?;
    }
    for decl in &module.enum_declarations {
        collect_enum(None, decl, &mut registry, file, &mut pending_field_types)?;
    }

    for (field_type, location) in pending_field_types {
        if !registry.is_known(&field_type) {
            return Err(TypeError::unknown_type(field_type, &location, file));
        }
    }

    Ok(registry)
}
