//! Runtime support emitted ahead of user code

use super::CodeBuffer;
use fcc_common::TypeKind;

/// Signatures of the runtime functions visible to every program
pub const RUNTIME_FUNCTIONS: &[(&str, TypeKind, &[TypeKind])] = &[
    ("print", TypeKind::Void, &[TypeKind::String]),
    ("printi", TypeKind::Void, &[TypeKind::Int]),
];

/// Called by guarded divisions when the divisor is zero
pub const ZERO_DIVISION_HANDLER: &str = "@error_zero_div";

const GLOBALS: &[&str] = &[
    "declare i32 @printf(i8*, ...)",
    "declare void @exit(i32)",
    r#"@.int_specifier = constant [4 x i8] c"%d\0A\00""#,
    r#"@.str_specifier = constant [4 x i8] c"%s\0A\00""#,
    r#"@.zero_div_message = constant [23 x i8] c"Error division by zero\00""#,
];

/// (header, body) of each runtime function
const FUNCTIONS: &[(&str, &[&str])] = &[
    (
        "define void @printi(i32) {",
        &[
            "%spec_ptr = getelementptr [4 x i8], [4 x i8]* @.int_specifier, i32 0, i32 0",
            "call i32 (i8*, ...) @printf(i8* %spec_ptr, i32 %0)",
            "ret void",
        ],
    ),
    (
        "define void @print(i8*) {",
        &[
            "%spec_ptr = getelementptr [4 x i8], [4 x i8]* @.str_specifier, i32 0, i32 0",
            "call i32 (i8*, ...) @printf(i8* %spec_ptr, i8* %0)",
            "ret void",
        ],
    ),
    (
        "define void @error_zero_div() {",
        &[
            "%message = getelementptr [23 x i8], [23 x i8]* @.zero_div_message, i32 0, i32 0",
            "call void @print(i8* %message)",
            "call void @exit(i32 0)",
            "ret void",
        ],
    ),
];

/// External declarations for code linked against a separately built runtime
const DECLARATIONS: &[&str] = &[
    "declare void @exit(i32)",
    "declare void @print(i8*)",
    "declare void @printi(i32)",
    "declare void @error_zero_div()",
];

pub fn emit_runtime(buffer: &mut CodeBuffer) {
    for global in GLOBALS {
        buffer.emit_global(*global);
    }

    for (header, body) in FUNCTIONS {
        buffer.emit(header);
        buffer.increase_indent();
        for line in *body {
            buffer.emit(line);
        }
        buffer.decrease_indent();
        buffer.emit("}");
        buffer.emit("");
    }
}

/// Declare the runtime functions without defining them
pub fn emit_runtime_declarations(buffer: &mut CodeBuffer) {
    for declaration in DECLARATIONS {
        buffer.emit_global(*declaration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_defines_every_declared_function() {
        let mut buffer = CodeBuffer::new(4);
        emit_runtime(&mut buffer);
        let text = buffer.render();
        for (name, _, _) in RUNTIME_FUNCTIONS {
            assert!(text.contains(&format!("@{name}(")), "{name} missing");
        }
        assert!(text.contains(&format!("define void {ZERO_DIVISION_HANDLER}()")));
        assert!(text.starts_with("declare i32 @printf"));
    }

    #[test]
    fn test_declarations_cover_everything_generated_code_calls() {
        let mut buffer = CodeBuffer::new(4);
        emit_runtime_declarations(&mut buffer);
        let text = buffer.render();
        for (name, _, _) in RUNTIME_FUNCTIONS {
            assert!(text.contains(&format!("declare void @{name}(")), "{name} missing");
        }
        assert!(text.contains(&format!("declare void {ZERO_DIVISION_HANDLER}()")));
        assert!(text.contains("declare void @exit(i32)"));
        assert!(!text.contains("define"));
    }
}
