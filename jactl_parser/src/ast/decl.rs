//! Declared types, variable/function/class declarations.

use crate::span::Span;

/// A syntactic type annotation as written in source. This is *not* the full
/// value-type lattice — that lattice lives in the `jactl`
/// crate and is built from this during resolution, once class paths have
/// been looked up and `var`/`def` placeholders have been inferred.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    /// `def` — dynamically typed; resolves to `Any` unless narrowed.
    Def,
    /// `var` — infer the concrete type from the initialiser.
    Var,
    Boolean,
    Byte,
    Int,
    Long,
    Double,
    Decimal,
    String,
    Map,
    List,
    Object,
    /// A (possibly unresolved) class path, e.g. `Point` or `a.b.Point`.
    ClassPath(Vec<String>),
    Array(Box<DeclaredType>),
}

impl DeclaredType {
    pub fn is_var_like(&self) -> bool {
        matches!(self, DeclaredType::Def | DeclaredType::Var)
    }
}

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(ExprId);
arena_id!(StmtId);
arena_id!(VarDeclId);
arena_id!(FunDeclId);
arena_id!(ClassDeclId);

/// The non-exclusive roles a variable declaration can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarDeclRoles {
    pub is_param: bool,
    pub is_field: bool,
    pub is_global: bool,
    pub is_heap_local: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_const: bool,
}

/// A variable declaration. Lives in the AST arena; referenced by
/// stable [`VarDeclId`] from both the declaring site and every identifier
/// expression and closure capture that reads it, which is what lets closures
/// hold a "weak" back-reference without creating a reference cycle.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub declared_type: DeclaredType,
    pub initializer: Option<ExprId>,
    pub roles: VarDeclRoles,
    /// Local-slot index, -1 until the resolver/operand tracker allocates one.
    pub slot: i32,
    /// Label used by the debugger / source-line mapping.
    pub label: String,
    /// For parameters/locals captured by a closure: the declaration in the
    /// enclosing function that this one was promoted from.
    pub original_decl: Option<VarDeclId>,
    /// The function that owns this declaration (None for fields/globals).
    pub owner: Option<FunDeclId>,
    pub span: Span,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, declared_type: DeclaredType, span: Span) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            declared_type,
            initializer: None,
            roles: VarDeclRoles::default(),
            slot: -1,
            original_decl: None,
            owner: None,
            span,
        }
    }
}

/// A function (or closure) declaration. Every declared function implicitly
/// gets a uniform-signature *wrapper* form; `has_wrapper` is always true for user
/// functions and is only false for the synthetic entry point of a script.
#[derive(Debug, Clone)]
pub struct FunDecl {
    pub name: String,
    pub params: Vec<VarDeclId>,
    pub return_type: DeclaredType,
    pub body: StmtId,
    /// True for `{ -> ... }` / bare-block closures; false for `def f(...) {}`.
    pub is_closure: bool,
    /// Set when a closure had no declared parameter list and was given the
    /// implicit single parameter `it: Any` . Cleared if the closure is later found unused as a
    /// callable and degraded to a plain block.
    pub implicit_it_param: bool,
    pub has_wrapper: bool,
    /// Filled in by the resolver: true if any transitively reachable call
    /// site is async.
    pub is_async: bool,
    /// Heap-locals captured from an enclosing scope, prepended to the real
    /// parameter list at call sites.
    pub heap_locals: Vec<VarDeclId>,
    pub span: Span,
}

/// A class declaration.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub base_class: Option<Vec<String>>,
    pub fields: Vec<VarDeclId>,
    pub methods: Vec<FunDeclId>,
    pub inner_classes: Vec<ClassDeclId>,
    pub span: Span,
}
