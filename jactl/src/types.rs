//! The value-type lattice: primitives with a boxed flag, reference atoms,
//! instance/class pairs, parameterized arrays, and the `Unknown` inference
//! placeholder used by `var`, plus the binary-operator result algebra,
//! `common_super_type`, and `is_convertible_to`.
//!
//! Modelled as a plain enum with free functions for the lattice operations:
//! a closed, `serde`-derivable enum rather than a trait hierarchy.

use serde::{Deserialize, Serialize};

use jactl_parser::ast::{BinaryOp, ConstValue, DeclaredType};

use crate::descriptor::ClassDescriptorId;
use crate::error::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Boolean,
    Byte,
    Int,
    Long,
    Double,
}

impl Primitive {
    /// Position in the numeric widening order `Byte < Int < Long < Double`
    /// (Boolean is not numeric and has no widening rank).
    fn numeric_rank(self) -> Option<u8> {
        match self {
            Primitive::Byte => Some(0),
            Primitive::Int => Some(1),
            Primitive::Long => Some(2),
            Primitive::Double => Some(3),
            Primitive::Boolean => None,
        }
    }

    fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }
}

/// A value type in the lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueType {
    Primitive {
        kind: Primitive,
        /// Whether this value is currently held in its boxed Object-shape.
        /// Boxed primitives count as reference types for convertibility
        /// purposes, but `boxed()`/`unboxed()` never change `kind`.
        boxed: bool,
    },

    Decimal,
    String,
    Map,
    List,
    Any,
    Function,
    Iterator,
    Number,
    RegexMatcher,
    Continuation,
    HeapLocal,

    /// An object of a user-defined class. `descriptor` may be unresolved
    /// (a bare class-path name) before the resolver runs.
    Instance {
        descriptor: Option<ClassDescriptorId>,
        class_path: Vec<String>,
    },
    /// The meta-form of `Instance`: denotes the class itself (LHS of `new`,
    /// static member access).
    Class {
        descriptor: Option<ClassDescriptorId>,
        class_path: Vec<String>,
    },

    Array(Box<ValueType>),

    /// Placeholder used by `var`; must be resolved away before emission — a
    /// remaining `Unknown` at emission time is a bug, not a runtime error.
    Unknown,
}

impl ValueType {
    pub fn int() -> Self {
        ValueType::Primitive { kind: Primitive::Int, boxed: false }
    }

    pub fn boolean() -> Self {
        ValueType::Primitive { kind: Primitive::Boolean, boxed: false }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, ValueType::Primitive { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Primitive { kind, .. } if kind.is_numeric())
            || matches!(self, ValueType::Decimal | ValueType::Number)
    }

    /// Change only the boxed bit; never changes `kind`.
    pub fn boxed(&self) -> ValueType {
        match self {
            ValueType::Primitive { kind, .. } => ValueType::Primitive { kind: *kind, boxed: true },
            other => other.clone(),
        }
    }

    pub fn unboxed(&self) -> ValueType {
        match self {
            ValueType::Primitive { kind, .. } => ValueType::Primitive { kind: *kind, boxed: false },
            other => other.clone(),
        }
    }

    /// All `Instance`-vs-`Instance` pairs match at the kind level regardless
    /// of which class; exact identity needs a descriptor/class-path compare.
    pub fn is(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Instance { .. }, ValueType::Instance { .. }) => true,
            (ValueType::Class { .. }, ValueType::Class { .. }) => true,
            (ValueType::Array(a), ValueType::Array(b)) => a.is(b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }

    fn numeric_rank(&self) -> Option<u8> {
        match self {
            ValueType::Primitive { kind, .. } => kind.numeric_rank(),
            ValueType::Decimal => Some(4),
            _ => None,
        }
    }
}

/// Binary operator tags the result algebra and the emitter both key off of
/// . This is a closed, emitter-facing set; `jactl_parser::BinaryOp`
/// maps onto it 1:1 once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Compare,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    In,
    NotIn,
    RegexMatch,
    RegexNotMatch,
}

impl OpTag {
    /// Maps a parsed `BinaryOp` onto its emitter-facing tag. `InstanceOf` has
    /// no tag of its own: it is resolved through `ExprKind::InstanceOf`/
    /// `ExprKind::Binary { op: BinaryOp::InstanceOf, .. }` directly to a
    /// boolean without going through the operator result algebra.
    pub fn from_binary_op(op: BinaryOp) -> Option<OpTag> {
        Some(match op {
            BinaryOp::Add => OpTag::Add,
            BinaryOp::Subtract => OpTag::Subtract,
            BinaryOp::Multiply => OpTag::Multiply,
            BinaryOp::Divide => OpTag::Divide,
            BinaryOp::Modulo => OpTag::Modulo,
            BinaryOp::Equal => OpTag::Equal,
            BinaryOp::NotEqual => OpTag::NotEqual,
            BinaryOp::Identical => OpTag::Identical,
            BinaryOp::NotIdentical => OpTag::NotIdentical,
            BinaryOp::Less => OpTag::Less,
            BinaryOp::LessEqual => OpTag::LessEqual,
            BinaryOp::Greater => OpTag::Greater,
            BinaryOp::GreaterEqual => OpTag::GreaterEqual,
            BinaryOp::Compare => OpTag::Compare,
            BinaryOp::And => OpTag::And,
            BinaryOp::Or => OpTag::Or,
            BinaryOp::BitAnd => OpTag::BitAnd,
            BinaryOp::BitOr => OpTag::BitOr,
            BinaryOp::BitXor => OpTag::BitXor,
            BinaryOp::ShiftLeft => OpTag::ShiftLeft,
            BinaryOp::ShiftRight => OpTag::ShiftRight,
            BinaryOp::UnsignedShiftRight => OpTag::UnsignedShiftRight,
            BinaryOp::In => OpTag::In,
            BinaryOp::NotIn => OpTag::NotIn,
            BinaryOp::RegexMatch => OpTag::RegexMatch,
            BinaryOp::RegexNotMatch => OpTag::RegexNotMatch,
            BinaryOp::InstanceOf => return None,
        })
    }
}

/// Maps a folded literal constant onto its value type.
pub fn const_value_type(value: &ConstValue) -> ValueType {
    match value {
        ConstValue::Boolean(_) => ValueType::boolean(),
        ConstValue::Byte(_) => ValueType::Primitive { kind: Primitive::Byte, boxed: false },
        ConstValue::Int(_) => ValueType::int(),
        ConstValue::Long(_) => ValueType::Primitive { kind: Primitive::Long, boxed: false },
        ConstValue::Double(_) => ValueType::Primitive { kind: Primitive::Double, boxed: false },
        ConstValue::String(_) => ValueType::String,
        ConstValue::Null => ValueType::Any,
        ConstValue::List(_) => ValueType::List,
        ConstValue::Map(_) => ValueType::Map,
    }
}

/// Maps a syntactic type annotation onto a lattice type. `Def`/`Var` resolve
/// to `Unknown` here; narrowing them from an initialiser or merge point is
/// the resolver's job, not this mapping's.
pub fn from_declared_type(declared: &DeclaredType) -> ValueType {
    match declared {
        DeclaredType::Def | DeclaredType::Var => ValueType::Unknown,
        DeclaredType::Boolean => ValueType::boolean(),
        DeclaredType::Byte => ValueType::Primitive { kind: Primitive::Byte, boxed: false },
        DeclaredType::Int => ValueType::int(),
        DeclaredType::Long => ValueType::Primitive { kind: Primitive::Long, boxed: false },
        DeclaredType::Double => ValueType::Primitive { kind: Primitive::Double, boxed: false },
        DeclaredType::Decimal => ValueType::Decimal,
        DeclaredType::String => ValueType::String,
        DeclaredType::Map => ValueType::Map,
        DeclaredType::List => ValueType::List,
        DeclaredType::Object => ValueType::Any,
        DeclaredType::ClassPath(path) => ValueType::Instance { descriptor: None, class_path: path.clone() },
        DeclaredType::Array(elem) => ValueType::Array(Box::new(from_declared_type(elem))),
    }
}

fn numeric_widen(a: &ValueType, b: &ValueType) -> ValueType {
    match (a.numeric_rank(), b.numeric_rank()) {
        (Some(ra), Some(rb)) => {
            let winner = if ra >= rb { a } else { b };
            winner.unboxed()
        }
        _ => ValueType::Any,
    }
}

fn is_container_like(t: &ValueType) -> bool {
    matches!(t, ValueType::Map | ValueType::List | ValueType::String | ValueType::Iterator | ValueType::Any)
}

/// `result(T1, O, T2)` . Complete
/// coverage of the admissible set is required; everything outside it is a
/// structured [`CompileError::BadOperandTypes`].
pub fn result(left: &ValueType, op: OpTag, right: &ValueType) -> Result<ValueType, CompileError> {
    use OpTag::*;
    match op {
        Equal | NotEqual | Identical | NotIdentical | And | Or => Ok(ValueType::boolean()),

        Less | LessEqual | Greater | GreaterEqual => {
            let admissible = matches!(left, ValueType::Any) || matches!(right, ValueType::Any)
                || (left.is_numeric() && right.is_numeric())
                || matches!((left, right), (ValueType::Primitive { kind: Primitive::Boolean, .. }, ValueType::Primitive { kind: Primitive::Boolean, .. }))
                || matches!((left, right), (ValueType::String, ValueType::String));
            if admissible {
                Ok(ValueType::boolean())
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        Compare => {
            let admissible = matches!(left, ValueType::Any) || matches!(right, ValueType::Any)
                || (left.is_numeric() && right.is_numeric())
                || matches!((left, right), (ValueType::Primitive { kind: Primitive::Boolean, .. }, ValueType::Primitive { kind: Primitive::Boolean, .. }))
                || matches!((left, right), (ValueType::String, ValueType::String));
            if admissible {
                Ok(ValueType::int())
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        In | NotIn => {
            if is_container_like(right) {
                Ok(ValueType::boolean())
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        RegexMatch | RegexNotMatch => {
            let admissible = matches!(left, ValueType::String | ValueType::Any)
                && matches!(right, ValueType::String | ValueType::Any);
            if admissible {
                Ok(ValueType::boolean())
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        Add => {
            if matches!(left, ValueType::String) || matches!(right, ValueType::String) {
                Ok(ValueType::String)
            } else if matches!(left, ValueType::List) {
                Ok(ValueType::List)
            } else if matches!(left, ValueType::Map) && matches!(right, ValueType::Map | ValueType::Any) {
                Ok(ValueType::Map)
            } else if left.is_numeric() && right.is_numeric() {
                Ok(numeric_widen(left, right))
            } else if matches!(left, ValueType::Any) || matches!(right, ValueType::Any) {
                Ok(ValueType::Any)
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        Subtract => {
            if matches!(left, ValueType::Map) {
                Ok(ValueType::Map)
            } else if left.is_numeric() && right.is_numeric() {
                Ok(numeric_widen(left, right))
            } else if matches!(left, ValueType::Any) || matches!(right, ValueType::Any) {
                Ok(ValueType::Any)
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        Multiply => {
            if matches!(left, ValueType::String) && right.is_numeric() {
                Ok(ValueType::String)
            } else if left.is_numeric() && right.is_numeric() {
                Ok(numeric_widen(left, right))
            } else if matches!(left, ValueType::Any) || matches!(right, ValueType::Any) {
                Ok(ValueType::Any)
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        Divide | Modulo => {
            if left.is_numeric() && right.is_numeric() {
                Ok(numeric_widen(left, right))
            } else if matches!(left, ValueType::Any) || matches!(right, ValueType::Any) {
                Ok(ValueType::Any)
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        BitAnd | BitOr | BitXor => {
            if is_bitwise_operand(left) && is_bitwise_operand(right) {
                Ok(widest_bit_type(left, right))
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }

        ShiftLeft | ShiftRight | UnsignedShiftRight => {
            if is_bitwise_operand(left) && is_bitwise_operand(right) {
                Ok(left.unboxed())
            } else {
                Err(bad_operand_types(left, op, right))
            }
        }
    }
}

fn is_bitwise_operand(t: &ValueType) -> bool {
    matches!(
        t,
        ValueType::Primitive { kind: Primitive::Int | Primitive::Byte | Primitive::Long, .. } | ValueType::Any
    )
}

fn widest_bit_type(a: &ValueType, b: &ValueType) -> ValueType {
    if matches!(a, ValueType::Any) || matches!(b, ValueType::Any) {
        return ValueType::Any;
    }
    numeric_widen(a, b)
}

fn bad_operand_types(left: &ValueType, op: OpTag, right: &ValueType) -> CompileError {
    CompileError::BadOperandTypes {
        left: format!("{left:?}"),
        op: format!("{op:?}"),
        right: format!("{right:?}"),
    }
}

/// Lub operator for control-flow merges.
/// Class-hierarchy walk for `Instance` pairs is left to the resolver (which
/// owns the descriptor graph); here we only handle the structural cases that
/// don't need it, falling back to `Any` for unrelated instances.
pub fn common_super_type(a: &ValueType, b: &ValueType) -> ValueType {
    if a == b {
        return a.clone();
    }
    match (a, b) {
        (ValueType::Array(ea), ValueType::Array(eb)) => ValueType::Array(Box::new(common_super_type(ea, eb))),
        _ if a.is_numeric() && b.is_numeric() => numeric_widen(a, b),
        _ => ValueType::Any,
    }
}

/// Two-mode convertibility . `is_cast` selects
/// the stricter cast-mode rules; coercion mode additionally allows the
/// anything-to-String / String-to-numeric / Instance-Map widening moves.
pub fn is_convertible_to(from: &ValueType, target: &ValueType, is_cast: bool) -> bool {
    if from.is(target) {
        return true;
    }
    match (from, target) {
        (ValueType::Primitive { .. }, ValueType::Primitive { .. }) => true,
        (ValueType::Map, ValueType::Instance { .. }) | (ValueType::Instance { .. }, ValueType::Map) => true,
        (ValueType::List, ValueType::Iterator) | (ValueType::Iterator, ValueType::List) => true,
        (ValueType::List, ValueType::Array(_)) | (ValueType::Array(_), ValueType::List) => true,
        (ValueType::String, ValueType::Array(elem)) if matches!(**elem, ValueType::Primitive { kind: Primitive::Byte, .. }) => true,
        (ValueType::Array(elem), ValueType::String) if matches!(**elem, ValueType::Primitive { kind: Primitive::Byte, .. }) => true,
        _ if !is_cast => match (from, target) {
            (_, ValueType::String) => true,
            (ValueType::String, t) if t.is_numeric() => true,
            (ValueType::String, ValueType::List) => true,
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_comparison_requires_admissible_operands() {
        let n = ValueType::int();
        let s = ValueType::String;
        assert!(result(&n, OpTag::Less, &n).is_ok());
        assert!(result(&n, OpTag::Less, &s).is_err());
    }

    #[test]
    fn string_plus_numeric_is_string() {
        assert_eq!(result(&ValueType::String, OpTag::Add, &ValueType::int()).unwrap(), ValueType::String);
    }

    #[test]
    fn numeric_widening_order() {
        let byte = ValueType::Primitive { kind: Primitive::Byte, boxed: false };
        let long = ValueType::Primitive { kind: Primitive::Long, boxed: false };
        assert_eq!(numeric_widen(&byte, &long), long);
    }

    #[test]
    fn boxed_toggle_never_changes_kind() {
        let n = ValueType::int();
        assert_eq!(n.boxed().unboxed(), n);
    }

    #[test]
    fn common_super_type_of_unrelated_instances_is_any() {
        let a = ValueType::Instance { descriptor: None, class_path: vec!["A".into()] };
        let b = ValueType::Instance { descriptor: None, class_path: vec!["B".into()] };
        assert_eq!(common_super_type(&a, &b), ValueType::Any);
    }

    #[test]
    fn coercion_mode_allows_string_to_numeric() {
        assert!(is_convertible_to(&ValueType::String, &ValueType::int(), false));
        assert!(!is_convertible_to(&ValueType::String, &ValueType::int(), true));
    }
}
