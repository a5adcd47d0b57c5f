//! Integration tests driving the public `Interpreter`/`Value` API end to
//! end: parse, collect, validate, evaluate, against full source strings.

use branchwood::ast::{BoolOp, Expression, Statement};
use branchwood::error::{BranchwoodError, RuntimeError, TypeError};
use branchwood::interpreter::parse_module;
use branchwood::{Interpreter, SourceFile, Value};

fn source(code: &str) -> SourceFile {
    SourceFile::new(vec!["<test>".into()], code.to_string())
}

#[test]
fn empty_struct_registers_with_no_fields() {
    let interpreter = Interpreter::load(source("struct Item {}")).unwrap();
    let item = interpreter.types().get(&branchwood::ast::TypeName::single("Item")).unwrap();
    assert!(item.as_struct().unwrap().fields.is_empty());
}

#[test]
fn nested_enum_registers_every_level_as_a_distinct_key() {
    let code = "enum Elem { enum Button { struct Disabled {}; struct Active {}; }; }";
    let interpreter = Interpreter::load(source(code)).unwrap();

    let paths: [&[&str]; 4] = [&["Elem"], &["Elem", "Button"], &["Elem", "Button", "Disabled"], &["Elem", "Button", "Active"]];
    for path in paths {
        let name = branchwood::ast::TypeName::new(path.iter().map(|s| s.to_string()).collect());
        assert!(interpreter.types().contains(&name), "missing {name}");
    }
}

#[test]
fn arithmetic_eval_scenario_returns_four_after_mutating_y_to_negative_six() {
    let code = r#"
        fn main() -> i32 {
            let x: i32 = 3;
            mut let y: i32 = x;
            y = -y as i32;
            y = y * 2;
            return 4;
        }
    "#;
    let interpreter = Interpreter::load(source(code)).unwrap();
    assert_eq!(interpreter.run("main", vec![]).unwrap(), Value::i32(4));
}

#[test]
fn or_binds_looser_than_and() {
    let module = parse_module(&source("fn f() -> bool { return 7 || 9 && 5; }")).unwrap();
    let body = &module.function_declarations[0].body.body;
    let Statement::Return(ret) = &body[0] else { panic!("expected a return statement") };
    let Expression::BoolOperation { op, left, right, .. } = ret.value.as_ref().unwrap() else {
        panic!("expected a top-level BoolOperation")
    };
    assert_eq!(*op, BoolOp::Or);
    assert!(matches!(left.as_ref(), Expression::Constant { .. }));
    assert!(matches!(right.as_ref(), Expression::BoolOperation { op: BoolOp::And, .. }));
}

#[test]
fn cast_then_is_compare_scenario() {
    let code = r#"
        fn check_i32(user: i32) -> bool {
            return user is i32;
        }
        fn check_f32(user: i32) -> bool {
            return user is f32;
        }
    "#;
    let interpreter = Interpreter::load(source(code)).unwrap();
    assert_eq!(interpreter.run("check_i32", vec![Value::i32(5)]).unwrap(), Value::bool(true));
    assert_eq!(interpreter.run("check_f32", vec![Value::i32(5)]).unwrap(), Value::bool(false));
}

#[test]
fn redeclaration_fails_collection_pointing_at_the_second_declaration() {
    let err = Interpreter::load(source("struct X {} struct X {}")).unwrap_err();
    assert!(matches!(err, BranchwoodError::Type(TypeError::Redeclaration { .. })));
}

#[test]
fn frame_lexicality_across_a_full_program() {
    let code = r#"
        fn scoped() -> i32 {
            mut let total: i32 = 0;
            {
                mut let total: i32 = 100;
                total = total + 1;
            }
            total = total + 1;
            return total;
        }
    "#;
    let interpreter = Interpreter::load(source(code)).unwrap();
    assert_eq!(interpreter.run("scoped", vec![]).unwrap(), Value::i32(1));
}

#[test]
fn calling_a_function_with_the_wrong_argument_type_is_a_runtime_error() {
    let code = "fn needs_i32(n: i32) -> i32 { return n; }";
    let interpreter = Interpreter::load(source(code)).unwrap();
    let err = interpreter.run("needs_i32", vec![Value::str("nope")]).unwrap_err();
    assert!(matches!(err, BranchwoodError::Runtime(RuntimeError::TypeMismatch { .. })));
}
