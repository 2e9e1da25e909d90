//! Expression AST nodes.

use super::decl::{ExprId, FunDeclId, VarDeclId};
use crate::span::Span;

/// Binary operators recognised by the precedence climber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
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
    InstanceOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

/// How a field-path step was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// `.field`
    Dot,
    /// `?.field`
    OptionalDot,
    /// `[expr]`
    Bracket,
    /// `?[expr]`
    OptionalBracket,
}

impl AccessKind {
    pub fn is_optional(self) -> bool {
        matches!(self, AccessKind::OptionalDot | AccessKind::OptionalBracket)
    }
}

/// A literal container key in a map literal: either a bare/quoted string key
/// or a general expression key (`(expr): value`).
#[derive(Debug, Clone)]
pub enum MapKey {
    Name(String),
    Expr(ExprId),
}

/// One segment of an interpolated expression string.
#[derive(Debug, Clone)]
pub enum StringPart {
    Literal(String),
    Interpolation(ExprId),
}

/// A compile-time constant folded out of a literal container.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Boolean(bool),
    Byte(u8),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Null,
    List(Vec<ConstValue>),
    Map(Vec<(String, ConstValue)>),
}

/// One `case` arm of a `switch` expression.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub patterns: Vec<SwitchPattern>,
    pub guard: Option<ExprId>,
    pub body: ExprId,
    pub span: Span,
}

/// Switch-case patterns: literals, types with optional
/// constructor-argument pattern, regex, wildcard, bindings, list/map
/// patterns, `$n` capture-group identifiers, or `$ { expr }` blocks.
#[derive(Debug, Clone)]
pub enum SwitchPattern {
    Literal(ConstValue),
    Wildcard,
    /// `Type` or `Type(p1, p2, ...)` constructor-argument pattern.
    TypePattern {
        class_path: Vec<String>,
        ctor_args: Option<Vec<SwitchPattern>>,
    },
    Regex(String),
    /// A bare identifier that binds the matched value.
    Binding(String),
    List(Vec<SwitchPattern>),
    Map(Vec<(String, SwitchPattern)>),
    /// `$1`, `$2`, ... bound from a preceding regex pattern's capture groups.
    CaptureGroup(u32),
    /// `$( expr )` — an arbitrary expression pattern.
    ExprPattern(ExprId),
}

/// A call argument: positional or named (`name: expr`).
#[derive(Debug, Clone)]
pub struct Arg {
    pub name: Option<String>,
    pub value: ExprId,
    /// `*expr` spread into positional arguments.
    pub is_spread: bool,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(ConstValue),
    Identifier(VarDeclId),
    /// An identifier that hasn't been resolved to a declaration yet, filled
    /// in later by the resolver.
    UnresolvedIdentifier(String),
    /// `$1` etc. used outside a switch-pattern position.
    CaptureIdentifier(u32),

    Binary {
        left: ExprId,
        op: BinaryOp,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Ternary {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    /// `cond ?: default` (elvis).
    Elvis {
        cond: ExprId,
        default: ExprId,
    },

    /// `parent.field`, `parent?.field`, `parent[idx]`, `parent?[idx]`.
    FieldAccess {
        parent: ExprId,
        field: ExprId,
        kind: AccessKind,
        create_if_missing: bool,
    },

    Call {
        callee: ExprId,
        args: Vec<Arg>,
    },
    MethodCall {
        parent: ExprId,
        name: String,
        args: Vec<Arg>,
        optional: bool,
    },

    New {
        class_path: Vec<String>,
        args: Vec<Arg>,
    },
    InstanceOf {
        expr: ExprId,
        class_path: Vec<String>,
    },

    ListLiteral(Vec<ExprId>),
    MapLiteral(Vec<(MapKey, ExprId)>),

    /// `{ params -> body }` or a bare block that was disambiguated into a
    /// closure.
    Closure(FunDeclId),

    /// An interpolated string: `"x=${1+2}"`.
    ExprString(Vec<StringPart>),

    /// `=~` / `!~` against a regex literal, with an optional substitution
    /// replacement part for `s/pattern/replacement/` forms.
    RegexMatch {
        subject: ExprId,
        pattern: Vec<StringPart>,
        replace: Option<Vec<StringPart>>,
        negated: bool,
        global: bool,
    },

    /// Plain `identifier = rhs` (compound or simple) on a simple variable
    /// . `target` is the
    /// lvalue identifier expression (`Identifier`/`UnresolvedIdentifier`);
    /// kept as an `ExprId` rather than a `VarDeclId` since the parser builds
    /// this before names are resolved.
    VarOpAssign {
        target: ExprId,
        op: Option<BinaryOp>,
        value: ExprId,
    },
    /// A field-path write rewritten from `P.f1....fn op= rhs` . `value` is `Noop op rhs`; the
    /// emitter substitutes the loaded current value for [`ExprKind::Noop`].
    FieldOpAssign {
        parent: ExprId,
        accessor: AccessKind,
        field: ExprId,
        value: ExprId,
    },
    /// Sentinel substituted by the emitter with the freshly loaded current
    /// value of the lvalue being compound-assigned.
    Noop,

    /// `(x, y) = expr` re-assigning existing variables: binds a synthesised temp once, then assigns each
    /// target lvalue from the corresponding element. The `def`/`var`
    /// declaring form is rewritten straight into a `Block` of `VarDecl`
    /// statements by the parser and never produces this variant.
    MultiAssign {
        temp: VarDeclId,
        targets: Vec<ExprId>,
        value: ExprId,
    },

    Print {
        arg: ExprId,
        newline: bool,
    },
    Die {
        arg: ExprId,
    },
    Eval {
        source: ExprId,
    },
    Sleep {
        duration: ExprId,
        result: Option<ExprId>,
    },

    Switch {
        subject: ExprId,
        cases: Vec<SwitchCase>,
        default: Option<ExprId>,
    },

    /// A parenthesised sub-expression, kept so `wasNested` can be recovered
    /// without a separate flag walk.
    Nested(ExprId),
}

/// Flags carried by every expression node.
#[derive(Debug, Clone, Default)]
pub struct ExprFlags {
    pub is_result_used: bool,
    pub is_callee: bool,
    pub is_const: bool,
    pub const_value: Option<ConstValue>,
    pub is_async: bool,
    pub could_be_null: bool,
    pub create_if_missing: bool,
    pub was_nested: bool,
}

#[derive(Debug, Clone)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub span: Span,
    pub flags: ExprFlags,
}
