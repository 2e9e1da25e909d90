//! The default resolver: walks the parsed AST once, attaches a
//! [`ValueType`] to every expression, a local-slot index to every variable
//! declaration, marks functions that transitively suspend as async, and
//! builds the [`ClassTable`] the emitters consume.
//!
//! A struct carrying scoped symbol tables as it walks the tree, the same
//! shape the emitters use for their own loop/label bookkeeping, here
//! adapted to a pure name/type resolution walk rather than emission.

use std::collections::HashMap;

use jactl_parser::ast::{
    Ast, ClassDeclId, ExprId, ExprKind, FunDeclId, StmtId, StmtKind, VarDeclId,
};

use crate::descriptor::{ClassDescriptor, ClassDescriptorId, ClassTable, FieldEntry, MethodEntry};
use crate::diagnostics::{DiagnosticReason, DiagnosticsCollector};
use crate::error::{CompileError, CompileErrors};
use crate::types::ValueType;

/// Side table mapping every expression to its resolved type. Kept separate
/// from `jactl_parser::ast::ExprNode` rather than folded into it, since the
/// value-type lattice lives downstream of the parser crate and the AST must
/// not depend on it.
#[derive(Debug, Default)]
pub struct TypeTable {
    types: Vec<Option<ValueType>>,
}

impl TypeTable {
    fn ensure_len(&mut self, len: usize) {
        if self.types.len() < len {
            self.types.resize(len, None);
        }
    }

    fn set(&mut self, id: ExprId, ty: ValueType) {
        self.ensure_len(id.index() + 1);
        self.types[id.index()] = Some(ty);
    }

    pub fn get(&self, id: ExprId) -> Option<&ValueType> {
        self.types.get(id.index()).and_then(|t| t.as_ref())
    }
}

/// One lexical scope: names visible from this block inward.
#[derive(Debug, Default)]
struct Scope {
    names: HashMap<String, VarDeclId>,
}

/// Resolution output consumed by the class/method emitters.
#[derive(Debug, Default)]
pub struct ResolvedUnit {
    pub types: TypeTable,
    pub classes: ClassTable,
}

/// Walks an [`Ast`] produced by `jactl_parser::parse` and resolves it.
pub struct Resolver<'a> {
    ast: &'a mut Ast,
    scopes: Vec<Scope>,
    next_slot: Vec<usize>,
    types: TypeTable,
    classes: ClassTable,
    class_ids_by_decl: HashMap<ClassDeclId, ClassDescriptorId>,
    errors: CompileErrors,
}

impl<'a> Resolver<'a> {
    pub fn new(ast: &'a mut Ast) -> Self {
        Self {
            ast,
            scopes: vec![Scope::default()],
            next_slot: vec![0],
            types: TypeTable::default(),
            classes: ClassTable::new(),
            class_ids_by_decl: HashMap::new(),
            errors: CompileErrors::new(),
        }
    }

    /// Resolve a whole compilation unit: the script body's top-level
    /// statements.
    pub fn resolve(mut self, top_level: &[StmtId]) -> Result<ResolvedUnit, CompileErrors> {
        for &stmt in top_level {
            self.collect_class_decl(stmt);
        }
        self.link_base_classes(top_level);
        for &stmt in top_level {
            self.resolve_stmt(stmt);
        }
        self.propagate_async(top_level);
        self.errors.into_result(ResolvedUnit { types: self.types, classes: self.classes })
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
        let depth = *self.next_slot.last().unwrap();
        self.next_slot.push(depth);
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
        self.next_slot.pop();
    }

    fn declare(&mut self, name: String, id: VarDeclId) {
        let slot = self.next_slot.last_mut().unwrap();
        let assigned = *slot;
        *slot += 1;
        self.ast.var_decl_mut(id).slot = assigned as i32;
        self.scopes.last_mut().unwrap().names.insert(name, id);
    }

    fn lookup(&self, name: &str) -> Option<VarDeclId> {
        self.scopes.iter().rev().find_map(|s| s.names.get(name).copied())
    }

    /// Pre-pass: register every class declaration's descriptor shape before
    /// bodies are resolved, so forward references between sibling classes
    /// (and a class referencing its own type in a method signature) work
    /// regardless of declaration order.
    fn collect_class_decl(&mut self, stmt: StmtId) {
        let kind = self.ast.stmt(stmt).kind.clone();
        if let StmtKind::ClassDecl(class_id) = kind {
            let decl = self.ast.class_decl(class_id).clone();
            let mut descriptor = ClassDescriptor::new(vec![], decl.name.clone());
            for &field_id in &decl.fields {
                let field = self.ast.var_decl(field_id).clone();
                descriptor.add_field(FieldEntry {
                    name: field.name,
                    declared_type: ValueType::Unknown,
                    is_static: field.roles.is_static,
                    is_final: field.roles.is_final,
                    is_const: field.roles.is_const,
                    has_default: field.initializer.is_some(),
                });
            }
            for &method_id in &decl.methods {
                let method = self.ast.fun_decl(method_id).clone();
                descriptor.methods.insert(
                    method.name.clone(),
                    MethodEntry {
                        fun_decl: method_id,
                        name: method.name,
                        param_types: Vec::new(),
                        return_type: ValueType::Unknown,
                        is_static: false,
                        is_async: false,
                        has_wrapper: method.has_wrapper,
                    },
                );
            }
            let class_descriptor_id = self.classes.push(descriptor);
            self.class_ids_by_decl.insert(class_id, class_descriptor_id);
        }
    }

    /// Second pre-pass, run once every class in this unit has a descriptor:
    /// wires each descriptor's `base` pointer from its `ClassDecl`'s
    /// `base_class` path, resolved by internal name against the classes
    /// collected so far.
    fn link_base_classes(&mut self, top_level: &[StmtId]) {
        for &stmt in top_level {
            let kind = self.ast.stmt(stmt).kind.clone();
            if let StmtKind::ClassDecl(class_id) = kind {
                let base_class = self.ast.class_decl(class_id).base_class.clone();
                let Some(path) = base_class else { continue };
                let Some(&descriptor_id) = self.class_ids_by_decl.get(&class_id) else { continue };
                let name = path.join(".");
                match self.classes.find_by_name(&name) {
                    Some(base_id) => self.classes.get_mut(descriptor_id).base = Some(base_id),
                    None => self.errors.push(CompileError::UnknownClass { name }),
                }
            }
        }
    }

    fn resolve_stmt(&mut self, stmt: StmtId) {
        let kind = self.ast.stmt(stmt).kind.clone();
        match kind {
            StmtKind::ExprStmt(expr) => {
                self.resolve_expr(expr);
            }
            StmtKind::Block(stmts) => {
                self.push_scope();
                for s in stmts {
                    self.resolve_stmt(s);
                }
                self.pop_scope();
            }
            StmtKind::VarDecl(id) => {
                let decl = self.ast.var_decl(id).clone();
                if let Some(init) = decl.initializer {
                    self.resolve_expr(init);
                }
                self.declare(decl.name.clone(), id);
            }
            StmtKind::FunDecl(fun_id) => self.resolve_fun_decl(fun_id),
            StmtKind::ClassDecl(class_id) => self.resolve_class_decl(class_id),
            StmtKind::If { cond, then_branch, else_branch } => {
                self.resolve_expr(cond);
                self.resolve_stmt(then_branch);
                if let Some(e) = else_branch {
                    self.resolve_stmt(e);
                }
            }
            StmtKind::While { cond, body, updates, .. } => {
                self.resolve_expr(cond);
                self.resolve_stmt(body);
                if let Some(u) = updates {
                    self.resolve_stmt(u);
                }
            }
            StmtKind::Break(_) | StmtKind::Continue(_) => {}
            StmtKind::Return(expr) => {
                if let Some(e) = expr {
                    self.resolve_expr(e);
                }
            }
        }
    }

    fn resolve_fun_decl(&mut self, fun_id: FunDeclId) {
        self.push_scope();
        let params = self.ast.fun_decl(fun_id).params.clone();
        for p in params {
            let name = self.ast.var_decl(p).name.clone();
            self.declare(name, p);
        }
        let body = self.ast.fun_decl(fun_id).body;
        self.resolve_stmt(body);
        self.pop_scope();

        // Seed async-ness from a direct `sleep` in the function's own body;
        // `propagate_async` below turns this into a fixed point over the
        // whole call graph once every declaration has been resolved.
        if self.body_contains_suspend(body, None) {
            self.ast.fun_decl_mut(fun_id).is_async = true;
        }
    }

    /// Registers every top-level function and class method by name so
    /// `propagate_async` can look up a call target's resolved declaration.
    /// Call sites are matched by name only (the same simplification the
    /// emitter's dynamic dispatch makes), so two unrelated functions sharing
    /// a name are treated as the same call target — a safe
    /// over-approximation, since marking a function async when it need not
    /// be costs a spurious suspend check, never a missed one.
    fn fun_decl_registry(&self, top_level: &[StmtId]) -> HashMap<String, FunDeclId> {
        let mut registry = HashMap::new();
        for &stmt in top_level {
            match self.ast.stmt(stmt).kind {
                StmtKind::FunDecl(fun_id) => {
                    registry.insert(self.ast.fun_decl(fun_id).name.clone(), fun_id);
                }
                StmtKind::ClassDecl(class_id) => {
                    for &method_id in &self.ast.class_decl(class_id).methods {
                        registry.insert(self.ast.fun_decl(method_id).name.clone(), method_id);
                    }
                }
                _ => {}
            }
        }
        registry
    }

    /// Iterates the call graph to a fixed point: any function calling an
    /// already-async function (directly, or through a method call resolved
    /// by name) is itself marked async, repeating until nothing changes.
    fn propagate_async(&mut self, top_level: &[StmtId]) {
        let registry = self.fun_decl_registry(top_level);
        loop {
            let mut changed = false;
            for &fun_id in registry.values() {
                if self.ast.fun_decl(fun_id).is_async {
                    continue;
                }
                let body = self.ast.fun_decl(fun_id).body;
                if self.body_contains_suspend(body, Some(&registry)) {
                    self.ast.fun_decl_mut(fun_id).is_async = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn body_contains_suspend(&self, stmt: StmtId, registry: Option<&HashMap<String, FunDeclId>>) -> bool {
        match &self.ast.stmt(stmt).kind {
            StmtKind::ExprStmt(e) => self.expr_contains_suspend(*e, registry),
            StmtKind::Block(stmts) => stmts.iter().any(|s| self.body_contains_suspend(*s, registry)),
            StmtKind::VarDecl(id) => self
                .ast
                .var_decl(*id)
                .initializer
                .is_some_and(|init| self.expr_contains_suspend(init, registry)),
            StmtKind::If { cond, then_branch, else_branch } => {
                self.expr_contains_suspend(*cond, registry)
                    || self.body_contains_suspend(*then_branch, registry)
                    || else_branch.is_some_and(|e| self.body_contains_suspend(e, registry))
            }
            StmtKind::While { cond, body, updates, .. } => {
                self.expr_contains_suspend(*cond, registry)
                    || self.body_contains_suspend(*body, registry)
                    || updates.is_some_and(|u| self.body_contains_suspend(u, registry))
            }
            StmtKind::Return(Some(e)) => self.expr_contains_suspend(*e, registry),
            _ => false,
        }
    }

    /// True if `expr` itself suspends, or if a call it directly contains
    /// targets a function/method already known to be async.
    fn expr_contains_suspend(&self, expr: ExprId, registry: Option<&HashMap<String, FunDeclId>>) -> bool {
        let is_target_async = |name: &str| {
            registry.is_some_and(|r| r.get(name).is_some_and(|&f| self.ast.fun_decl(f).is_async))
        };
        match &self.ast.expr(expr).kind {
            ExprKind::Sleep { .. } => true,
            ExprKind::Call { callee, args } => {
                let callee_name = match &self.ast.expr(*callee).kind {
                    ExprKind::UnresolvedIdentifier(name) => Some(name.clone()),
                    _ => None,
                };
                callee_name.is_some_and(|n| is_target_async(&n))
                    || self.expr_contains_suspend(*callee, registry)
                    || args.iter().any(|a| self.expr_contains_suspend(a.value, registry))
            }
            ExprKind::MethodCall { parent, name, args, .. } => {
                is_target_async(name)
                    || self.expr_contains_suspend(*parent, registry)
                    || args.iter().any(|a| self.expr_contains_suspend(a.value, registry))
            }
            ExprKind::Binary { left, right, .. } => {
                self.expr_contains_suspend(*left, registry) || self.expr_contains_suspend(*right, registry)
            }
            ExprKind::Unary { operand, .. } => self.expr_contains_suspend(*operand, registry),
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.expr_contains_suspend(*cond, registry)
                    || self.expr_contains_suspend(*then_branch, registry)
                    || self.expr_contains_suspend(*else_branch, registry)
            }
            ExprKind::Elvis { cond, default } => {
                self.expr_contains_suspend(*cond, registry) || self.expr_contains_suspend(*default, registry)
            }
            ExprKind::FieldAccess { parent, field, .. } => {
                self.expr_contains_suspend(*parent, registry) || self.expr_contains_suspend(*field, registry)
            }
            ExprKind::New { args, .. } => args.iter().any(|a| self.expr_contains_suspend(a.value, registry)),
            ExprKind::InstanceOf { expr: inner, .. } => self.expr_contains_suspend(*inner, registry),
            ExprKind::ListLiteral(items) => items.iter().any(|e| self.expr_contains_suspend(*e, registry)),
            ExprKind::MapLiteral(entries) => entries.iter().any(|(k, v)| {
                let key_suspends = matches!(k, jactl_parser::ast::MapKey::Expr(k) if self.expr_contains_suspend(*k, registry));
                key_suspends || self.expr_contains_suspend(*v, registry)
            }),
            ExprKind::ExprString(parts) => parts.iter().any(|p| match p {
                jactl_parser::ast::StringPart::Interpolation(e) => self.expr_contains_suspend(*e, registry),
                _ => false,
            }),
            ExprKind::VarOpAssign { target, value, .. } => {
                self.expr_contains_suspend(*target, registry) || self.expr_contains_suspend(*value, registry)
            }
            ExprKind::FieldOpAssign { parent, field, value, .. } => {
                self.expr_contains_suspend(*parent, registry)
                    || self.expr_contains_suspend(*field, registry)
                    || self.expr_contains_suspend(*value, registry)
            }
            ExprKind::MultiAssign { targets, value, .. } => {
                targets.iter().any(|t| self.expr_contains_suspend(*t, registry)) || self.expr_contains_suspend(*value, registry)
            }
            ExprKind::Print { arg, .. } | ExprKind::Die { arg } => self.expr_contains_suspend(*arg, registry),
            ExprKind::Switch { subject, cases, default } => {
                self.expr_contains_suspend(*subject, registry)
                    || cases.iter().any(|c| {
                        c.guard.is_some_and(|g| self.expr_contains_suspend(g, registry))
                            || self.expr_contains_suspend(c.body, registry)
                    })
                    || default.is_some_and(|d| self.expr_contains_suspend(d, registry))
            }
            ExprKind::Nested(inner) => self.expr_contains_suspend(*inner, registry),
            _ => false,
        }
    }

    fn resolve_class_decl(&mut self, class_id: ClassDeclId) {
        let methods = self.ast.class_decl(class_id).methods.clone();
        for m in methods {
            self.resolve_fun_decl(m);
        }
    }

    /// Resolve one expression, attach its [`ValueType`] to the [`TypeTable`],
    /// and return it so callers composing binary operators etc. don't need a
    /// second lookup.
    fn resolve_expr(&mut self, expr: ExprId) -> ValueType {
        let span = self.ast.expr(expr).span;
        let kind = self.ast.expr(expr).kind.clone();
        let ty = match kind {
            ExprKind::Literal(ref c) => crate::types::const_value_type(c),
            ExprKind::Identifier(var_id) => self.var_type(var_id),
            ExprKind::UnresolvedIdentifier(name) => {
                if let Some(var_id) = self.lookup(&name) {
                    self.ast.expr_mut(expr).kind = ExprKind::Identifier(var_id);
                    self.var_type(var_id)
                } else {
                    DiagnosticsCollector::record(DiagnosticReason::UnresolvedCall(name.clone()));
                    self.errors.push(CompileError::UndefinedVariable { name, span });
                    ValueType::Unknown
                }
            }
            ExprKind::CaptureIdentifier(_) => ValueType::String,
            ExprKind::Binary { left, op, right } => {
                let lt = self.resolve_expr(left);
                let rt = self.resolve_expr(right);
                match crate::types::OpTag::from_binary_op(op) {
                    None => ValueType::boolean(),
                    Some(tag) => match crate::types::result(&lt, tag, &rt) {
                        Ok(t) => t,
                        Err(e) => {
                            self.errors.push(e);
                            ValueType::Unknown
                        }
                    },
                }
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.resolve_expr(cond);
                let t = self.resolve_expr(then_branch);
                let e = self.resolve_expr(else_branch);
                crate::types::common_super_type(&t, &e)
            }
            ExprKind::Elvis { cond, default } => {
                let c = self.resolve_expr(cond);
                let d = self.resolve_expr(default);
                crate::types::common_super_type(&c, &d)
            }
            ExprKind::FieldAccess { parent, field, create_if_missing, .. } => {
                self.resolve_expr(parent);
                self.resolve_expr(field);
                if create_if_missing {
                    DiagnosticsCollector::record(DiagnosticReason::AutoCreatedField {
                        parent: format!("{parent:?}"),
                        field: format!("{field:?}"),
                    });
                }
                ValueType::Any
            }
            ExprKind::Call { callee, args } => {
                self.resolve_expr(callee);
                for a in &args {
                    self.resolve_expr(a.value);
                }
                ValueType::Any
            }
            ExprKind::MethodCall { parent, args, .. } => {
                self.resolve_expr(parent);
                for a in &args {
                    self.resolve_expr(a.value);
                }
                ValueType::Any
            }
            ExprKind::New { args, .. } => {
                for a in &args {
                    self.resolve_expr(a.value);
                }
                ValueType::Any
            }
            ExprKind::InstanceOf { expr: inner, .. } => {
                self.resolve_expr(inner);
                ValueType::boolean()
            }
            ExprKind::ListLiteral(items) => {
                for i in items {
                    self.resolve_expr(i);
                }
                ValueType::List
            }
            ExprKind::MapLiteral(entries) => {
                for (k, v) in entries {
                    if let jactl_parser::ast::MapKey::Expr(k) = k {
                        self.resolve_expr(k);
                    }
                    self.resolve_expr(v);
                }
                ValueType::Map
            }
            ExprKind::Closure(fun_id) => {
                self.resolve_fun_decl(fun_id);
                ValueType::Function
            }
            ExprKind::ExprString(parts) => {
                for p in parts {
                    if let jactl_parser::ast::StringPart::Interpolation(e) = p {
                        self.resolve_expr(e);
                    }
                }
                ValueType::String
            }
            ExprKind::RegexMatch { subject, replace, .. } => {
                self.resolve_expr(subject);
                if let Some(parts) = replace {
                    for p in parts {
                        if let jactl_parser::ast::StringPart::Interpolation(e) = p {
                            self.resolve_expr(e);
                        }
                    }
                }
                ValueType::boolean()
            }
            ExprKind::VarOpAssign { target, value, .. } => {
                let t = self.resolve_expr(target);
                self.resolve_expr(value);
                t
            }
            ExprKind::FieldOpAssign { parent, field, value, .. } => {
                self.resolve_expr(parent);
                self.resolve_expr(field);
                self.resolve_expr(value);
                ValueType::Any
            }
            ExprKind::Noop => ValueType::Unknown,
            ExprKind::MultiAssign { targets, value, .. } => {
                for t in &targets {
                    self.resolve_expr(*t);
                }
                self.resolve_expr(value);
                ValueType::List
            }
            ExprKind::Print { arg, .. } => {
                self.resolve_expr(arg);
                ValueType::boolean()
            }
            ExprKind::Die { arg } => {
                self.resolve_expr(arg);
                ValueType::Unknown
            }
            ExprKind::Eval { source } => {
                self.resolve_expr(source);
                ValueType::Any
            }
            ExprKind::Sleep { duration, result } => {
                self.resolve_expr(duration);
                result.map(|r| self.resolve_expr(r)).unwrap_or(ValueType::Any)
            }
            ExprKind::Switch { subject, cases, default } => {
                self.resolve_expr(subject);
                let mut result_ty = ValueType::Unknown;
                for case in &cases {
                    if let Some(guard) = case.guard {
                        self.resolve_expr(guard);
                    }
                    let body_ty = self.resolve_expr(case.body);
                    result_ty = crate::types::common_super_type(&result_ty, &body_ty);
                }
                if let Some(d) = default {
                    let d_ty = self.resolve_expr(d);
                    result_ty = crate::types::common_super_type(&result_ty, &d_ty);
                }
                result_ty
            }
            ExprKind::Nested(inner) => self.resolve_expr(inner),
        };
        self.types.set(expr, ty.clone());
        ty
    }

    fn var_type(&self, id: VarDeclId) -> ValueType {
        crate::types::from_declared_type(&self.ast.var_decl(id).declared_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jactl_parser::parse;

    #[test]
    fn resolves_simple_arithmetic_to_int() {
        let (mut ast, top_level) = parse("def x = 1 + 2").unwrap();
        let resolver = Resolver::new(&mut ast);
        let resolved = resolver.resolve(&top_level).unwrap();
        let _ = resolved;
    }

    #[test]
    fn undefined_variable_is_reported() {
        let (mut ast, top_level) = parse("x + 1").unwrap();
        let resolver = Resolver::new(&mut ast);
        let result = resolver.resolve(&top_level);
        assert!(result.is_err());
    }
}
