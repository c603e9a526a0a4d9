//! The FanC type catalog
//!
//! The language has a fixed, finite set of types. This module defines them
//! together with the conversion and widening rules every compiler phase
//! relies on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operand index of a function parameter or local storage slot
pub type Offset = i32;

/// Every type a FanC expression or declaration can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// unsigned 8-bit value, stored in a 32-bit cell
    Byte,
    /// signed 32-bit value
    Int,
    Bool,
    /// string literal, only usable as a call argument
    String,
    Void,
    /// Sentinel for a failed lookup or an incompatible combination
    Invalid,
}

impl TypeKind {
    /// Parse a type keyword as written in source
    pub fn parse(name: &str) -> Self {
        match name {
            "byte" => TypeKind::Byte,
            "int" => TypeKind::Int,
            "bool" => TypeKind::Bool,
            "string" => TypeKind::String,
            "void" => TypeKind::Void,
            _ => TypeKind::Invalid,
        }
    }

    /// Check if arithmetic and ordering comparisons apply to this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeKind::Byte | TypeKind::Int)
    }

    /// Check if values of this type cannot be stored in a variable
    pub fn is_special(&self) -> bool {
        matches!(self, TypeKind::String | TypeKind::Void | TypeKind::Invalid)
    }

    /// Check if numeric operations on this type use signed semantics
    pub fn is_signed(&self) -> bool {
        matches!(self, TypeKind::Int)
    }

    /// Result type of combining two operands
    ///
    /// Identical types combine to themselves; two different numeric types
    /// widen to `Int`. Anything else is `Invalid`.
    pub fn cast_up(left: TypeKind, right: TypeKind) -> TypeKind {
        if left == TypeKind::Invalid || right == TypeKind::Invalid {
            return TypeKind::Invalid;
        }

        if left == right {
            return left;
        }

        if left.is_numeric() && right.is_numeric() {
            return TypeKind::Int;
        }

        TypeKind::Invalid
    }

    /// Check if a value of this type may be used where `target` is expected
    pub fn is_implicitly_convertible(&self, target: TypeKind) -> bool {
        if *self == TypeKind::Invalid {
            return false;
        }

        *self == target || (*self == TypeKind::Byte && target == TypeKind::Int)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Byte => write!(f, "BYTE"),
            TypeKind::Int => write!(f, "INT"),
            TypeKind::Bool => write!(f, "BOOL"),
            TypeKind::String => write!(f, "STRING"),
            TypeKind::Void => write!(f, "VOID"),
            TypeKind::Invalid => write!(f, "INVALID"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(TypeKind::parse("byte"), TypeKind::Byte);
        assert_eq!(TypeKind::parse("int"), TypeKind::Int);
        assert_eq!(TypeKind::parse("bool"), TypeKind::Bool);
        assert_eq!(TypeKind::parse("string"), TypeKind::String);
        assert_eq!(TypeKind::parse("void"), TypeKind::Void);
        assert_eq!(TypeKind::parse("float"), TypeKind::Invalid);
    }

    #[test]
    fn test_cast_up_widens_mixed_numeric() {
        assert_eq!(TypeKind::cast_up(TypeKind::Byte, TypeKind::Byte), TypeKind::Byte);
        assert_eq!(TypeKind::cast_up(TypeKind::Byte, TypeKind::Int), TypeKind::Int);
        assert_eq!(TypeKind::cast_up(TypeKind::Int, TypeKind::Byte), TypeKind::Int);
        assert_eq!(TypeKind::cast_up(TypeKind::Bool, TypeKind::Bool), TypeKind::Bool);
        assert_eq!(TypeKind::cast_up(TypeKind::Bool, TypeKind::Int), TypeKind::Invalid);
        assert_eq!(TypeKind::cast_up(TypeKind::Invalid, TypeKind::Invalid), TypeKind::Invalid);
    }

    #[test]
    fn test_implicit_conversion_is_byte_to_int_only() {
        assert!(TypeKind::Byte.is_implicitly_convertible(TypeKind::Int));
        assert!(!TypeKind::Int.is_implicitly_convertible(TypeKind::Byte));
        assert!(TypeKind::Bool.is_implicitly_convertible(TypeKind::Bool));
        assert!(!TypeKind::Bool.is_implicitly_convertible(TypeKind::Int));
        assert!(!TypeKind::Invalid.is_implicitly_convertible(TypeKind::Invalid));
    }

    #[test]
    fn test_special_types() {
        assert!(TypeKind::Void.is_special());
        assert!(TypeKind::String.is_special());
        assert!(!TypeKind::Bool.is_special());
        assert!(!TypeKind::Byte.is_special());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TypeKind::Int.to_string(), "INT");
        assert_eq!(TypeKind::Byte.to_string(), "BYTE");
    }
}
