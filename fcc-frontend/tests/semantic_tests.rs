//! Semantic errors reported for whole programs

mod common;

use common::*;
use fcc_common::CompilerError;
use fcc_frontend::ast::{BinaryOp, Program, RelationalOp};
use fcc_frontend::{CompilationContext, Frontend, SemanticError};

fn analyze(program: &Program) -> Result<(), SemanticError> {
    let mut ctx = CompilationContext::default();
    Frontend::analyze(program, &mut ctx).map(|_| ())
}

fn diagnostic(program: &Program) -> String {
    match Frontend::compile(program, &bare()) {
        Err(CompilerError::Semantic { message, .. }) => message,
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn test_shadowing_in_nested_block() {
    // int x = 1; { byte x = 2b; byte y = x; } int z = x;
    let program = main_with(vec![
        declare("int", "x", Some(int("1"))),
        block(vec![
            declare("byte", "x", Some(byte("2"))),
            declare("byte", "y", Some(id("x"))),
        ]),
        declare("int", "z", Some(id("x"))),
    ]);
    assert_eq!(analyze(&program), Ok(()));
}

#[test]
fn test_outer_binding_is_restored_after_block() {
    // int x = 1; { byte x = 2b; } byte y = x;   (int does not narrow to byte)
    let program = main_with(vec![
        declare("int", "x", Some(int("1"))),
        block(vec![declare("byte", "x", Some(byte("2")))]),
        on_line(3, declare("byte", "y", Some(id("x")))),
    ]);
    assert_eq!(diagnostic(&program), "line 3: type mismatch");
}

#[test]
fn test_block_local_is_gone_after_block() {
    let program = main_with(vec![
        block(vec![declare("int", "inner", None)]),
        on_line(4, assign("inner", int("1"))),
    ]);
    assert_eq!(diagnostic(&program), "line 4: variable inner is not defined");
}

#[test]
fn test_redefinition_in_same_block() {
    let program = main_with(vec![
        declare("int", "x", None),
        on_line(2, declare("bool", "x", None)),
    ]);
    assert_eq!(diagnostic(&program), "line 2: identifier x is already defined");
}

#[test]
fn test_parameter_redefined_in_function_scope() {
    let program = Program {
        functions: vec![
            function("f", "void", &[("int", "a")], vec![on_line(2, declare("int", "a", None))]),
            function("main", "void", &[], vec![]),
        ],
    };
    assert_eq!(diagnostic(&program), "line 2: identifier a is already defined");
}

#[test]
fn test_duplicate_function() {
    let program = Program {
        functions: vec![
            function("main", "void", &[], vec![]),
            function("main", "void", &[], vec![]),
        ],
    };
    assert!(matches!(analyze(&program), Err(SemanticError::Redefinition { .. })));
}

#[test]
fn test_runtime_function_cannot_be_redefined() {
    let program = Program {
        functions: vec![
            function("print", "void", &[("string", "s")], vec![]),
            function("main", "void", &[], vec![]),
        ],
    };
    assert!(analyze(&program).is_err());
}

#[test]
fn test_missing_entry_point_before_any_code() {
    let program = Program {
        functions: vec![function("helper", "void", &[], vec![])],
    };
    assert_eq!(analyze(&program), Err(SemanticError::MissingEntryPoint));
    assert_eq!(diagnostic(&program), "Program has no 'void main()' function");
}

#[test]
fn test_main_returning_int_is_not_an_entry_point() {
    let program = Program {
        functions: vec![function("main", "int", &[], vec![ret(Some(int("0")))])],
    };
    assert_eq!(analyze(&program), Err(SemanticError::MissingEntryPoint));
}

#[test]
fn test_call_before_definition_is_undefined() {
    let program = Program {
        functions: vec![
            function("main", "void", &[], vec![on_line(1, eval(call("later", vec![])))]),
            function("later", "void", &[], vec![]),
        ],
    };
    assert!(matches!(
        analyze(&program),
        Err(SemanticError::UndefinedFunction { .. })
    ));
}

#[test]
fn test_recursion_is_allowed() {
    let program = Program {
        functions: vec![
            function(
                "countdown",
                "void",
                &[("int", "n")],
                vec![if_then(
                    relational(RelationalOp::Greater, id("n"), int("0")),
                    block(vec![eval(call(
                        "countdown",
                        vec![binary(BinaryOp::Sub, id("n"), int("1"))],
                    ))]),
                    None,
                )],
            ),
            function("main", "void", &[], vec![eval(call("countdown", vec![int("3")]))]),
        ],
    };
    assert_eq!(analyze(&program), Ok(()));
}

#[test]
fn test_prototype_mismatch_on_argument_count() {
    // reported at the call, not at the enclosing statement
    let program = main_with(vec![on_line(6, eval(call("printi", vec![int("1"), int("2")])))]);
    assert_eq!(
        diagnostic(&program),
        "line 1: prototype mismatch, function printi expects arguments (INT)"
    );
}

#[test]
fn test_calling_a_variable() {
    let program = main_with(vec![
        declare("int", "f", None),
        eval(call("f", vec![])),
    ]);
    assert!(matches!(
        analyze(&program),
        Err(SemanticError::UndefinedFunction { .. })
    ));
}

#[test]
fn test_non_bool_condition() {
    let program = main_with(vec![while_loop(int("1"), block(vec![]))]);
    assert!(matches!(analyze(&program), Err(SemanticError::TypeMismatch { .. })));
}

#[test]
fn test_break_inside_if_inside_while_is_legal() {
    let program = main_with(vec![while_loop(
        boolean(true),
        block(vec![if_then(boolean(true), block(vec![brk()]), Some(cont()))]),
    )]);
    assert_eq!(analyze(&program), Ok(()));
}

#[test]
fn test_break_after_loop_is_rejected() {
    let program = main_with(vec![
        while_loop(boolean(false), block(vec![])),
        on_line(3, brk()),
    ]);
    assert_eq!(diagnostic(&program), "line 3: unexpected break statement");
}

#[test]
fn test_continue_outside_loop() {
    let program = main_with(vec![on_line(2, cont())]);
    assert_eq!(diagnostic(&program), "line 2: unexpected continue statement");
}

#[test]
fn test_byte_literal_out_of_range() {
    let program = main_with(vec![declare("byte", "b", Some(byte("256")))]);
    assert_eq!(diagnostic(&program), "line 1: byte value 256 out of range");
}

#[test]
fn test_return_value_from_void_function() {
    let program = main_with(vec![ret(Some(int("1")))]);
    assert!(matches!(analyze(&program), Err(SemanticError::TypeMismatch { .. })));
}

#[test]
fn test_string_only_flows_into_print() {
    let program = main_with(vec![eval(call("printi", vec![string("no")]))]);
    assert!(matches!(
        analyze(&program),
        Err(SemanticError::PrototypeMismatch { .. })
    ));
}

#[test]
fn test_first_error_wins() {
    // the undefined variable on line 2 is found before the bad break on line 3
    let program = main_with(vec![
        on_line(2, assign("missing", int("1"))),
        on_line(3, brk()),
    ]);
    assert!(matches!(
        analyze(&program),
        Err(SemanticError::UndefinedVariable { .. })
    ));
}

#[test]
fn test_condition_is_checked_before_its_branch() {
    let program = main_with(vec![on_line(
        5,
        if_then(int("1"), on_line(6, brk()), None),
    )]);
    assert_eq!(diagnostic(&program), "line 1: type mismatch");
}
