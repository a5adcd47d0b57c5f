//! Operation Registry (§4.5): four sub-registries (binary, boolean,
//! compare, unary) plus a cast table and an `is`-test table, each keyed by
//! operand type name with `*`/`&` wildcard fallback.
//!
//! `*` in a registered left-type slot matches any concrete left operand
//! type; `&` in a right-type slot matches any concrete right operand type.
//! Lookup tries, in order: exact/exact, exact/wildcard, wildcard/exact,
//! wildcard/wildcard — first match wins.

use std::collections::HashMap;

use crate::ast::{BinaryOp, BoolOp, CompareMode, Location, TypeName, UnaryOp};
use crate::error::RuntimeError;
use crate::file::SourceFile;
use crate::value::Value;

type BinaryFn = fn(&Value, &Value, &Location, &SourceFile) -> Result<Value, RuntimeError>;
type UnaryFn = fn(&Value, &Location, &SourceFile) -> Result<Value, RuntimeError>;
type CastFn = fn(&Value, &Location, &SourceFile) -> Result<Value, RuntimeError>;

fn left_wildcard() -> TypeName {
    TypeName::single("*")
}

fn right_wildcard() -> TypeName {
    TypeName::single("&")
}

fn lookup<'a, K: Eq + std::hash::Hash + Clone>(table: &'a HashMap<(K, TypeName, TypeName), BinaryFn>, key: &K, left: &TypeName, right: &TypeName) -> Option<&'a BinaryFn> {
    table
        .get(&(key.clone(), left.clone(), right.clone()))
        .or_else(|| table.get(&(key.clone(), left.clone(), right_wildcard())))
        .or_else(|| table.get(&(key.clone(), left_wildcard(), right.clone())))
        .or_else(|| table.get(&(key.clone(), left_wildcard(), right_wildcard())))
}

/// Dispatch table for `(op, left-type, right-type) -> (Value, Value) ->
/// Value` (plus unary, cast, and `is`), pre-loaded with the mandatory
/// minimum set and a fuller numeric/boolean/string set atop it.
pub struct OperationRegistry {
    binary: HashMap<(BinaryOp, TypeName, TypeName), BinaryFn>,
    boolean: HashMap<(BoolOp, TypeName, TypeName), BinaryFn>,
    compare: HashMap<(CompareMode, TypeName, TypeName), BinaryFn>,
    unary: HashMap<(UnaryOp, TypeName), UnaryFn>,
    cast: HashMap<(TypeName, TypeName), CastFn>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        let mut registry = Self { binary: HashMap::new(), boolean: HashMap::new(), compare: HashMap::new(), unary: HashMap::new(), cast: HashMap::new() };
        registry.register_minimum();
        registry.register_extended();
        registry
    }
}

macro_rules! t {
    ($name:expr) => {
        TypeName::single($name)
    };
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register_minimum(&mut self) {
        self.binary.insert((BinaryOp::Mul, t!("i32"), t!("i32")), |l, r, loc, file| Ok(Value::i32(operand_i32(l, loc, file)? * operand_i32(r, loc, file)?)));
        self.unary.insert((UnaryOp::Negate, t!("i32")), |v, loc, file| Ok(Value::i32(-operand_i32(v, loc, file)?)));
        self.cast.insert((t!("i32"), t!("i32")), |v, loc, file| Ok(Value::i32(operand_i32(v, loc, file)?)));
        self.compare.insert((CompareMode::Equal, left_wildcard(), right_wildcard()), |l, r, _, _| Ok(Value::bool(l == r)));
        self.boolean.insert((BoolOp::And, left_wildcard(), right_wildcard()), |l, r, _, _| Ok(Value::bool(l.truthy() && r.truthy())));
    }

    fn register_extended(&mut self) {
        // Arithmetic on i32/f32.
        self.binary.insert((BinaryOp::Add, t!("i32"), t!("i32")), |l, r, loc, file| Ok(Value::i32(operand_i32(l, loc, file)? + operand_i32(r, loc, file)?)));
        self.binary.insert((BinaryOp::Sub, t!("i32"), t!("i32")), |l, r, loc, file| Ok(Value::i32(operand_i32(l, loc, file)? - operand_i32(r, loc, file)?)));
        self.binary.insert((BinaryOp::Div, t!("i32"), t!("i32")), |l, r, loc, file| {
            let divisor = operand_i32(r, loc, file)?;
            if divisor == 0 {
                return Err(RuntimeError::division_by_zero(loc, file));
            }
            Ok(Value::i32(operand_i32(l, loc, file)? / divisor))
        });
        self.binary.insert((BinaryOp::Add, t!("f32"), t!("f32")), |l, r, loc, file| Ok(Value::f32(operand_f32(l, loc, file)? + operand_f32(r, loc, file)?)));
        self.binary.insert((BinaryOp::Sub, t!("f32"), t!("f32")), |l, r, loc, file| Ok(Value::f32(operand_f32(l, loc, file)? - operand_f32(r, loc, file)?)));
        self.binary.insert((BinaryOp::Mul, t!("f32"), t!("f32")), |l, r, loc, file| Ok(Value::f32(operand_f32(l, loc, file)? * operand_f32(r, loc, file)?)));
        self.binary.insert((BinaryOp::Div, t!("f32"), t!("f32")), |l, r, loc, file| {
            let divisor = operand_f32(r, loc, file)?;
            if divisor == 0.0 {
                return Err(RuntimeError::division_by_zero(loc, file));
            }
            Ok(Value::f32(operand_f32(l, loc, file)? / divisor))
        });

        // Equality/inequality on every primitive.
        for ty in ["i32", "f32", "bool", "str"] {
            self.compare.insert((CompareMode::Equal, t!(ty), t!(ty)), |l, r, _, _| Ok(Value::bool(l == r)));
            self.compare.insert((CompareMode::NotEqual, t!(ty), t!(ty)), |l, r, _, _| Ok(Value::bool(l != r)));
        }

        // Ordering on i32/f32/str/bool.
        self.compare.insert((CompareMode::Less, t!("i32"), t!("i32")), |l, r, loc, file| Ok(Value::bool(operand_i32(l, loc, file)? < operand_i32(r, loc, file)?)));
        self.compare.insert((CompareMode::Greater, t!("i32"), t!("i32")), |l, r, loc, file| Ok(Value::bool(operand_i32(l, loc, file)? > operand_i32(r, loc, file)?)));
        self.compare.insert((CompareMode::Less, t!("f32"), t!("f32")), |l, r, loc, file| Ok(Value::bool(operand_f32(l, loc, file)? < operand_f32(r, loc, file)?)));
        self.compare.insert((CompareMode::Greater, t!("f32"), t!("f32")), |l, r, loc, file| Ok(Value::bool(operand_f32(l, loc, file)? > operand_f32(r, loc, file)?)));
        self.compare.insert((CompareMode::Less, t!("str"), t!("str")), |l, r, loc, file| Ok(Value::bool(operand_str(l, loc, file)? < operand_str(r, loc, file)?)));
        self.compare.insert((CompareMode::Greater, t!("str"), t!("str")), |l, r, loc, file| Ok(Value::bool(operand_str(l, loc, file)? > operand_str(r, loc, file)?)));
        self.compare.insert((CompareMode::Less, t!("bool"), t!("bool")), |l, r, loc, file| Ok(Value::bool(operand_bool(l, loc, file)? < operand_bool(r, loc, file)?)));
        self.compare.insert((CompareMode::Greater, t!("bool"), t!("bool")), |l, r, loc, file| Ok(Value::bool(operand_bool(l, loc, file)? > operand_bool(r, loc, file)?)));

        // Boolean logic.
        self.boolean.insert((BoolOp::And, t!("bool"), t!("bool")), |l, r, loc, file| Ok(Value::bool(operand_bool(l, loc, file)? && operand_bool(r, loc, file)?)));
        self.boolean.insert((BoolOp::Or, t!("bool"), t!("bool")), |l, r, loc, file| Ok(Value::bool(operand_bool(l, loc, file)? || operand_bool(r, loc, file)?)));
        self.boolean.insert((BoolOp::Or, left_wildcard(), right_wildcard()), |l, r, _, _| Ok(Value::bool(l.truthy() || r.truthy())));

        // Unary.
        self.unary.insert((UnaryOp::Negate, t!("f32")), |v, loc, file| Ok(Value::f32(-operand_f32(v, loc, file)?)));
        self.unary.insert((UnaryOp::Not, t!("bool")), |v, loc, file| Ok(Value::bool(!operand_bool(v, loc, file)?)));

        // Casts: identities plus numeric widening/narrowing.
        self.cast.insert((t!("f32"), t!("f32")), |v, loc, file| Ok(Value::f32(operand_f32(v, loc, file)?)));
        self.cast.insert((t!("str"), t!("str")), |v, loc, file| Ok(Value::str(operand_str(v, loc, file)?.to_string())));
        self.cast.insert((t!("bool"), t!("bool")), |v, loc, file| Ok(Value::bool(operand_bool(v, loc, file)?)));
        self.cast.insert((t!("i32"), t!("f32")), |v, loc, file| Ok(Value::f32(operand_i32(v, loc, file)? as f32)));
        self.cast.insert((t!("f32"), t!("i32")), |v, loc, file| Ok(Value::i32(operand_f32(v, loc, file)? as i32)));
    }

    pub fn binary(&self, op: BinaryOp, left: &Value, right: &Value, location: &Location, file: &SourceFile) -> Result<Value, RuntimeError> {
        match lookup(&self.binary, &op, &left.type_name, &right.type_name) {
            Some(f) => f(left, right, location, file),
            None => Err(RuntimeError::operation_undefined(op.to_string(), left.type_name.clone(), Some(right.type_name.clone()), location, file)),
        }
    }

    pub fn boolean(&self, op: BoolOp, left: &Value, right: &Value, location: &Location, file: &SourceFile) -> Result<Value, RuntimeError> {
        match lookup(&self.boolean, &op, &left.type_name, &right.type_name) {
            Some(f) => f(left, right, location, file),
            None => Err(RuntimeError::operation_undefined(op.to_string(), left.type_name.clone(), Some(right.type_name.clone()), location, file)),
        }
    }

    pub fn compare(&self, mode: CompareMode, left: &Value, right: &Value, location: &Location, file: &SourceFile) -> Result<Value, RuntimeError> {
        match lookup(&self.compare, &mode, &left.type_name, &right.type_name) {
            Some(f) => f(left, right, location, file),
            None => Err(RuntimeError::operation_undefined(mode.to_string(), left.type_name.clone(), Some(right.type_name.clone()), location, file)),
        }
    }

    pub fn unary(&self, op: UnaryOp, operand: &Value, location: &Location, file: &SourceFile) -> Result<Value, RuntimeError> {
        let wildcard = left_wildcard();
        let f = self.unary.get(&(op, operand.type_name.clone())).or_else(|| self.unary.get(&(op, wildcard)));
        match f {
            Some(f) => f(operand, location, file),
            None => Err(RuntimeError::operation_undefined(op.to_string(), operand.type_name.clone(), None, location, file)),
        }
    }

    pub fn cast(&self, operand: &Value, to_type: &TypeName, location: &Location, file: &SourceFile) -> Result<Value, RuntimeError> {
        match self.cast.get(&(operand.type_name.clone(), to_type.clone())) {
            Some(f) => f(operand, location, file),
            None => Err(RuntimeError::operation_undefined("as", operand.type_name.clone(), Some(to_type.clone()), location, file)),
        }
    }

    /// `is` is universal: it only ever compares the operand's runtime
    /// `type_name` to the right-hand textual `TypeName`, so no per-type
    /// table lookup is needed (equivalent to a single `(*, *)` entry).
    pub fn is_test(&self, operand: &Value, target_type: &TypeName) -> Value {
        Value::bool(&operand.type_name == target_type)
    }
}

fn operand_i32(value: &Value, location: &Location, file: &SourceFile) -> Result<i32, RuntimeError> {
    value.as_i32().ok_or_else(|| RuntimeError::type_mismatch(TypeName::single("i32"), value.type_name.clone(), location, file))
}

fn operand_f32(value: &Value, location: &Location, file: &SourceFile) -> Result<f32, RuntimeError> {
    value.as_f32().ok_or_else(|| RuntimeError::type_mismatch(TypeName::single("f32"), value.type_name.clone(), location, file))
}

fn operand_bool(value: &Value, location: &Location, file: &SourceFile) -> Result<bool, RuntimeError> {
    value.as_bool().ok_or_else(|| RuntimeError::type_mismatch(TypeName::single("bool"), value.type_name.clone(), location, file))
}

fn operand_str<'a>(value: &'a Value, location: &Location, file: &SourceFile) -> Result<&'a str, RuntimeError> {
    value.as_str().ok_or_else(|| RuntimeError::type_mismatch(TypeName::single("str"), value.type_name.clone(), location, file))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::ast::Position;

    use super::*;

    fn loc() -> Location {
        Location::new(Position::new(1, 1), Position::new(1, 1), 0..1).unwrap()
    }

    fn file() -> SourceFile {
        SourceFile::new(vec!["<memory>".into()], String::new())
    }

    #[rstest]
    #[case(BinaryOp::Add, 3, 4, 7)]
    #[case(BinaryOp::Sub, 10, 4, 6)]
    #[case(BinaryOp::Mul, 3, 4, 12)]
    #[case(BinaryOp::Div, 10, 4, 2)]
    fn i32_arithmetic(#[case] op: BinaryOp, #[case] left: i32, #[case] right: i32, #[case] expected: i32) {
        let registry = OperationRegistry::new();
        let result = registry.binary(op, &Value::i32(left), &Value::i32(right), &loc(), &file()).unwrap();
        assert_eq!(result, Value::i32(expected));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let registry = OperationRegistry::new();
        let err = registry.binary(BinaryOp::Div, &Value::i32(1), &Value::i32(0), &loc(), &file()).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let registry = OperationRegistry::new();
        let err = registry.binary(BinaryOp::Add, &Value::str("a"), &Value::bool(true), &loc(), &file()).unwrap_err();
        assert!(matches!(err, RuntimeError::OperationUndefined { .. }));
    }

    #[test]
    fn strict_and_evaluates_both_operands_truthiness() {
        let registry = OperationRegistry::new();
        let result = registry.boolean(BoolOp::And, &Value::bool(true), &Value::bool(false), &loc(), &file()).unwrap();
        assert_eq!(result, Value::bool(false));
    }

    #[test]
    fn is_test_compares_type_names() {
        let registry = OperationRegistry::new();
        assert_eq!(registry.is_test(&Value::i32(5), &TypeName::single("i32")), Value::bool(true));
        assert_eq!(registry.is_test(&Value::i32(5), &TypeName::single("f32")), Value::bool(false));
    }

    #[test]
    fn unary_negate_and_not() {
        let registry = OperationRegistry::new();
        assert_eq!(registry.unary(UnaryOp::Negate, &Value::i32(6), &loc(), &file()).unwrap(), Value::i32(-6));
        assert_eq!(registry.unary(UnaryOp::Not, &Value::bool(true), &loc(), &file()).unwrap(), Value::bool(false));
    }

    #[test]
    fn numeric_widening_and_narrowing_casts() {
        let registry = OperationRegistry::new();
        assert_eq!(registry.cast(&Value::i32(3), &TypeName::single("f32"), &loc(), &file()).unwrap(), Value::f32(3.0));
        assert_eq!(registry.cast(&Value::f32(3.9), &TypeName::single("i32"), &loc(), &file()).unwrap(), Value::i32(3));
    }
}
