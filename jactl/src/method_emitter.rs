//! Emits statement and expression bytecode for one method body.
//!
//! A plain struct holding loop/finally-context stacks and label/patch
//! bookkeeping alongside the code buffer, driving the
//! [`crate::operand_tracker::OperandTracker`] plus an async continuation
//! protocol.

use jactl_parser::ast::{Ast, ExprId, ExprKind, StmtId, StmtKind};

use crate::bytecode::Instr;
use crate::diagnostics::{DiagnosticReason, DiagnosticsCollector};
use crate::error::{CompileError, CompileResult};
use crate::operand_tracker::OperandTracker;
use crate::resolver::TypeTable;
use crate::types::ValueType;

/// Tracks an enclosing loop's break/continue label targets, mirroring `CoreCompiler`'s `LoopContext`.
struct LoopContext {
    label: Option<String>,
    continue_label: u32,
    break_label: u32,
}

/// Emits one function body into a flat instruction stream plus a local-slot
/// high-water mark, ready to become a [`crate::bytecode::MethodImage`].
pub struct MethodEmitter<'a> {
    ast: &'a Ast,
    types: &'a TypeTable,
    tracker: OperandTracker,
    loops: Vec<LoopContext>,
    next_label: u32,
    is_async: bool,
    /// Resume labels of every suspend point emitted so far, in order, used to
    /// build the method's entry-point resume dispatch once the whole body has
    /// been emitted.
    resume_labels: Vec<u32>,
    /// The extra local slot an async method's wrapper carries beyond its
    /// declared parameters, holding the resume-location id the runtime wants
    /// to re-enter at (0 for a fresh, non-resuming call).
    resume_param_slot: Option<usize>,
    /// Line of the last emitted [`Instr::LineNumber`] marker, so markers are
    /// only emitted when the source line actually changes.
    last_line: Option<u32>,
}

impl<'a> MethodEmitter<'a> {
    pub fn new(ast: &'a Ast, types: &'a TypeTable, param_count: usize, is_async: bool) -> Self {
        let minimum_slot = if is_async { param_count + 1 } else { param_count };
        Self {
            ast,
            types,
            tracker: OperandTracker::new(minimum_slot),
            loops: Vec::new(),
            next_label: 0,
            is_async,
            resume_labels: Vec::new(),
            resume_param_slot: is_async.then_some(param_count),
            last_line: None,
        }
    }

    /// Emits `Instr::LineNumber` if `line` differs from the last one
    /// emitted.
    fn mark_line(&mut self, line: usize) {
        let line = line as u32;
        if self.last_line != Some(line) {
            self.last_line = Some(line);
            self.tracker.code.push(Instr::LineNumber(line));
        }
    }

    fn fresh_label(&mut self) -> u32 {
        let l = self.next_label;
        self.next_label += 1;
        l
    }

    /// Emit a whole function body and return the finished instruction stream
    /// plus the operand tracker's high-water local-slot count.
    pub fn emit_body(mut self, body: StmtId) -> CompileResult<(Vec<Instr>, usize)> {
        self.emit_stmt(body)?;
        self.tracker.code.push(Instr::PushNull);
        self.tracker.code.push(Instr::Return);
        let max_locals = self.tracker.max_locals();
        Ok((self.finish_with_resume_dispatch(), max_locals))
    }

    /// Prepends the resume-location dispatch table for an async method: one
    /// comparison per suspend point, jumping straight back to its resume
    /// label when the incoming resume id matches, falling through to a
    /// fresh start when it's 0 (or the method has no suspend points at all).
    fn finish_with_resume_dispatch(self) -> Vec<Instr> {
        let MethodEmitter { tracker, is_async, resume_labels, resume_param_slot, .. } = self;
        let mut code = tracker.code;
        if is_async {
            if let Some(slot) = resume_param_slot {
                let mut preamble = Vec::new();
                for label in resume_labels {
                    preamble.push(Instr::LoadLocal(slot));
                    preamble.push(Instr::PushInt(label as i32));
                    preamble.push(Instr::BinaryOp(crate::types::OpTag::Equal));
                    preamble.push(Instr::JumpIfTrue(label));
                }
                preamble.extend(code);
                code = preamble;
            }
        }
        code
    }

    /// Emit a sequence of top-level statements with no implicit trailing
    /// return, for the synthetic script class's `main` method,
    /// which composes several statements' worth of code into one stream
    /// before the caller appends its own final return.
    pub fn emit_statements(mut self, stmts: &[StmtId]) -> CompileResult<(Vec<Instr>, usize)> {
        for &stmt in stmts {
            self.emit_stmt(stmt)?;
        }
        Ok((self.tracker.code, self.tracker.max_locals()))
    }

    fn emit_stmt(&mut self, stmt: StmtId) -> CompileResult<()> {
        self.mark_line(self.ast.stmt(stmt).span.start_line);
        let kind = self.ast.stmt(stmt).kind.clone();
        match kind {
            StmtKind::ExprStmt(expr) => {
                let used = self.ast.expr(expr).flags.is_result_used;
                self.emit_expr(expr)?;
                if !used {
                    self.tracker.pop()?;
                }
            }
            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.emit_stmt(s)?;
                }
            }
            StmtKind::VarDecl(id) => {
                let decl = self.ast.var_decl(id);
                let slot = decl.slot;
                if let Some(init) = decl.initializer {
                    self.emit_expr(init)?;
                    self.tracker.code.push(Instr::StoreLocal(slot as usize));
                    self.tracker.pop()?;
                } else {
                    self.tracker.code.push(Instr::PushNull);
                    self.tracker.code.push(Instr::StoreLocal(slot as usize));
                }
            }
            StmtKind::FunDecl(_) | StmtKind::ClassDecl(_) => {
                // Nested declarations are emitted as their own methods/classes
                // by the enclosing class emitter pass, not inline here.
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.emit_expr(cond)?;
                self.tracker.pop()?;
                let else_label = self.fresh_label();
                self.tracker.code.push(Instr::JumpIfFalse(else_label));
                self.emit_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    let end_label = self.fresh_label();
                    self.tracker.code.push(Instr::Jump(end_label));
                    self.tracker.code.push(Instr::Label(else_label));
                    self.emit_stmt(else_branch)?;
                    self.tracker.code.push(Instr::Label(end_label));
                } else {
                    self.tracker.code.push(Instr::Label(else_label));
                }
            }
            StmtKind::While { label, cond, body, updates, run_body_first } => {
                let top_label = self.fresh_label();
                let continue_label = self.fresh_label();
                let break_label = self.fresh_label();
                self.loops.push(LoopContext { label, continue_label, break_label });

                if run_body_first {
                    self.tracker.code.push(Instr::Label(top_label));
                    self.emit_stmt(body)?;
                    self.tracker.code.push(Instr::Label(continue_label));
                    if let Some(u) = updates {
                        self.emit_stmt(u)?;
                    }
                    self.emit_expr(cond)?;
                    self.tracker.pop()?;
                    self.tracker.code.push(Instr::JumpIfTrue(top_label));
                } else {
                    self.tracker.code.push(Instr::Label(top_label));
                    self.emit_expr(cond)?;
                    self.tracker.pop()?;
                    self.tracker.code.push(Instr::JumpIfFalse(break_label));
                    self.emit_stmt(body)?;
                    self.tracker.code.push(Instr::Label(continue_label));
                    if let Some(u) = updates {
                        self.emit_stmt(u)?;
                    }
                    self.tracker.code.push(Instr::Jump(top_label));
                }
                self.tracker.code.push(Instr::Label(break_label));
                self.loops.pop();
            }
            StmtKind::Break(label) => {
                let target = self.find_loop(&label, true)?;
                self.tracker.code.push(Instr::Jump(target));
            }
            StmtKind::Continue(label) => {
                let target = self.find_loop(&label, false)?;
                self.tracker.code.push(Instr::Jump(target));
            }
            StmtKind::Return(expr) => {
                match expr {
                    Some(e) => self.emit_expr(e)?,
                    None => {
                        self.tracker.code.push(Instr::PushNull);
                        self.tracker.push(ValueType::Any);
                    }
                }
                self.tracker.pop()?;
                self.tracker.code.push(Instr::Return);
            }
        }
        Ok(())
    }

    fn find_loop(&self, label: &Option<String>, is_break: bool) -> CompileResult<u32> {
        let ctx = match label {
            Some(name) => self.loops.iter().rev().find(|l| l.label.as_deref() == Some(name.as_str())),
            None => self.loops.last(),
        };
        match ctx {
            Some(l) => Ok(if is_break { l.break_label } else { l.continue_label }),
            None => Err(CompileError::TrackerInvariant { message: "break/continue outside a loop".into() }),
        }
    }

    fn emit_expr(&mut self, expr: ExprId) -> CompileResult<()> {
        let kind = self.ast.expr(expr).kind.clone();
        let ty = self.types.get(expr).cloned().unwrap_or(ValueType::Unknown);
        match kind {
            ExprKind::Literal(c) => {
                self.emit_literal(&c);
                self.tracker.push(ty);
            }
            ExprKind::Identifier(var_id) => {
                let slot = self.ast.var_decl(var_id).slot;
                self.tracker.code.push(Instr::LoadLocal(slot as usize));
                self.tracker.push(ty);
            }
            ExprKind::UnresolvedIdentifier(name) => {
                return Err(CompileError::UndefinedVariable { name, span: self.ast.expr(expr).span });
            }
            ExprKind::CaptureIdentifier(_) => {
                self.tracker.code.push(Instr::PushNull);
                self.tracker.push(ty);
            }
            ExprKind::Binary { left, op, right } => {
                self.emit_expr(left)?;
                self.emit_expr(right)?;
                self.tracker.pop()?;
                self.tracker.pop()?;
                let tag = crate::types::OpTag::from_binary_op(op).unwrap_or(crate::types::OpTag::Equal);
                self.tracker.code.push(Instr::BinaryOp(tag));
                self.tracker.push(ty);
            }
            ExprKind::Unary { op, operand } => {
                self.emit_expr(operand)?;
                self.tracker.pop()?;
                use jactl_parser::ast::UnaryOp::*;
                match op {
                    Negate => self.tracker.code.push(Instr::Negate),
                    Not => self.tracker.code.push(Instr::Not),
                    BitNot => self.tracker.code.push(Instr::BitNot),
                    Plus | PreIncrement | PreDecrement | PostIncrement | PostDecrement => {}
                }
                self.tracker.push(ty);
            }
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.emit_expr(cond)?;
                self.tracker.pop()?;
                let else_label = self.fresh_label();
                let end_label = self.fresh_label();
                self.tracker.code.push(Instr::JumpIfFalse(else_label));
                self.emit_expr(then_branch)?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::Jump(end_label));
                self.tracker.code.push(Instr::Label(else_label));
                self.emit_expr(else_branch)?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::Label(end_label));
                self.tracker.push(ty);
            }
            ExprKind::Elvis { cond, default } => {
                self.emit_expr(cond)?;
                self.tracker.dup()?;
                let end_label = self.fresh_label();
                self.tracker.code.push(Instr::ConvertToBoolean { negated: false });
                self.tracker.code.push(Instr::JumpIfTrue(end_label));
                self.tracker.pop()?;
                self.emit_expr(default)?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::Label(end_label));
                self.tracker.push(ty);
            }
            ExprKind::FieldAccess { parent, field, kind: access_kind, create_if_missing } => {
                self.emit_expr(parent)?;
                self.emit_expr(field)?;
                self.tracker.pop()?;
                self.tracker.pop()?;
                if create_if_missing {
                    DiagnosticsCollector::record(DiagnosticReason::AutoCreatedField {
                        parent: format!("{parent:?}"),
                        field: format!("{field:?}"),
                    });
                }
                self.tracker.code.push(Instr::LoadField {
                    is_dot: matches!(access_kind, jactl_parser::ast::AccessKind::Dot | jactl_parser::ast::AccessKind::OptionalDot),
                    is_optional: access_kind.is_optional(),
                    create_if_missing,
                });
                self.tracker.push(ty);
            }
            ExprKind::Call { callee, args } => {
                for a in &args {
                    self.emit_expr(a.value)?;
                }
                self.emit_expr(callee)?;
                for _ in 0..args.len() + 1 {
                    self.tracker.pop()?;
                }
                self.tracker.code.push(Instr::CallDynamic { name: format!("{callee:?}"), must_be_field: false, is_optional: false });
                self.tracker.push(ty);
                if self.is_async {
                    self.emit_suspend_point();
                }
            }
            ExprKind::MethodCall { parent, name, args, optional } => {
                self.emit_expr(parent)?;
                for a in &args {
                    self.emit_expr(a.value)?;
                }
                for _ in 0..args.len() + 1 {
                    self.tracker.pop()?;
                }
                self.tracker.code.push(Instr::CallDynamic { name, must_be_field: false, is_optional: optional });
                self.tracker.push(ty);
                if self.is_async {
                    self.emit_suspend_point();
                }
            }
            ExprKind::New { class_path, args } => {
                for a in &args {
                    self.emit_expr(a.value)?;
                }
                for _ in 0..args.len() {
                    self.tracker.pop()?;
                }
                self.tracker.code.push(Instr::New { class: class_path.join("."), arg_count: args.len() });
                self.tracker.push(ty);
            }
            ExprKind::InstanceOf { expr: inner, class_path } => {
                self.emit_expr(inner)?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::InstanceOf { class: class_path.join(".") });
                self.tracker.push(ty);
            }
            ExprKind::ListLiteral(items) => {
                let n = items.len();
                for i in items {
                    self.emit_expr(i)?;
                }
                for _ in 0..n {
                    self.tracker.pop()?;
                }
                self.tracker.code.push(Instr::NewList(n));
                self.tracker.push(ty);
            }
            ExprKind::MapLiteral(entries) => {
                let n = entries.len();
                for (k, v) in entries {
                    if let jactl_parser::ast::MapKey::Name(name) = k {
                        self.tracker.code.push(Instr::PushString(name));
                        self.tracker.push(ValueType::String);
                    } else if let jactl_parser::ast::MapKey::Expr(k) = k {
                        self.emit_expr(k)?;
                    }
                    self.emit_expr(v)?;
                    self.tracker.pop()?;
                    self.tracker.pop()?;
                }
                self.tracker.code.push(Instr::NewMap(n));
                self.tracker.push(ty);
            }
            ExprKind::Closure(_) => {
                self.tracker.code.push(Instr::PushNull);
                self.tracker.push(ty);
            }
            ExprKind::ExprString(parts) => {
                for part in parts {
                    if let jactl_parser::ast::StringPart::Literal(s) = part {
                        self.tracker.code.push(Instr::PushString(s));
                        self.tracker.push(ValueType::String);
                        self.tracker.pop()?;
                    } else if let jactl_parser::ast::StringPart::Interpolation(e) = part {
                        self.emit_expr(e)?;
                        self.tracker.pop()?;
                    }
                }
                self.tracker.code.push(Instr::PushString(String::new()));
                self.tracker.push(ty);
            }
            ExprKind::RegexMatch { subject, negated, .. } => {
                self.emit_expr(subject)?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::BinaryOp(if negated { crate::types::OpTag::RegexNotMatch } else { crate::types::OpTag::RegexMatch }));
                self.tracker.push(ty);
            }
            ExprKind::VarOpAssign { target, op, value } => {
                self.emit_expr(value)?;
                self.tracker.pop()?;
                if let Some(op) = op {
                    self.emit_expr(target)?;
                    self.tracker.pop()?;
                    let tag = crate::types::OpTag::from_binary_op(op).unwrap_or(crate::types::OpTag::Equal);
                    self.tracker.code.push(Instr::BinaryOp(tag));
                }
                if let ExprKind::Identifier(var_id) = self.ast.expr(target).kind {
                    let slot = self.ast.var_decl(var_id).slot;
                    self.tracker.code.push(Instr::Dup);
                    self.tracker.code.push(Instr::StoreLocal(slot as usize));
                }
                self.tracker.push(ty);
            }
            ExprKind::FieldOpAssign { parent, accessor, field, value } => {
                let is_dot = matches!(accessor, jactl_parser::ast::AccessKind::Dot | jactl_parser::ast::AccessKind::OptionalDot);
                let is_optional = accessor.is_optional();
                self.emit_expr(parent)?;
                self.emit_expr(field)?;
                // A compound assignment (`+=` etc.) rewrites its value to
                // `Binary{left: Noop, op, right: rhs}`: the parser's sentinel
                // for "the field's current value". Load it from the
                // parent+field pair now, via a duplicated copy, so neither
                // is re-evaluated (and re-triggers any side effect) for the
                // final store below.
                let noop_op = match &self.ast.expr(value).kind {
                    ExprKind::Binary { left, op, right } if matches!(self.ast.expr(*left).kind, ExprKind::Noop) => {
                        Some((*op, *right))
                    }
                    _ => None,
                };
                match noop_op {
                    Some((op, right)) => {
                        self.tracker.dup2()?;
                        self.tracker.pop()?;
                        self.tracker.pop()?;
                        self.tracker.code.push(Instr::LoadField { is_dot, is_optional, create_if_missing: false });
                        self.tracker.push(ValueType::Any);
                        self.emit_expr(right)?;
                        self.tracker.pop()?;
                        self.tracker.pop()?;
                        let tag = crate::types::OpTag::from_binary_op(op).unwrap_or(crate::types::OpTag::Equal);
                        self.tracker.code.push(Instr::BinaryOp(tag));
                        self.tracker.push(ValueType::Any);
                    }
                    None => {
                        self.emit_expr(value)?;
                    }
                }
                self.tracker.pop()?;
                self.tracker.pop()?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::StoreField { is_dot, is_optional, create_if_missing: false });
                self.tracker.push(ty);
            }
            ExprKind::Noop => {
                // Only ever reached as the `Binary` left operand the parser
                // builds for a compound field assignment; `FieldOpAssign`
                // above special-cases that shape before recursing into it.
                self.tracker.code.push(Instr::PushNull);
                self.tracker.push(ty);
            }
            ExprKind::MultiAssign { targets, value, .. } => {
                self.emit_expr(value)?;
                self.tracker.pop()?;
                for t in &targets {
                    if let ExprKind::Identifier(var_id) = self.ast.expr(*t).kind {
                        let slot = self.ast.var_decl(var_id).slot;
                        self.tracker.code.push(Instr::StoreLocal(slot as usize));
                    }
                }
                self.tracker.code.push(Instr::PushNull);
                self.tracker.push(ty);
            }
            ExprKind::Print { arg, newline } => {
                self.emit_expr(arg)?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::Print { newline });
                self.tracker.push(ty);
            }
            ExprKind::Die { arg } => {
                self.emit_expr(arg)?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::Die);
                self.tracker.push(ty);
            }
            ExprKind::Eval { source } => {
                self.emit_expr(source)?;
                self.tracker.pop()?;
                self.tracker.code.push(Instr::PushNull);
                self.tracker.push(ty);
            }
            ExprKind::Sleep { duration, result } => {
                self.emit_expr(duration)?;
                self.tracker.pop()?;
                if let Some(r) = result {
                    self.emit_expr(r)?;
                    self.tracker.pop()?;
                }
                self.emit_suspend_point();
                self.tracker.code.push(Instr::PushNull);
                self.tracker.push(ty);
            }
            ExprKind::Switch { subject, cases, default } => {
                self.emit_expr(subject)?;
                self.tracker.pop()?;
                let end_label = self.fresh_label();
                for case in cases {
                    if let Some(guard) = case.guard {
                        self.emit_expr(guard)?;
                        self.tracker.pop()?;
                    }
                    self.emit_expr(case.body)?;
                    self.tracker.pop()?;
                    self.tracker.code.push(Instr::Jump(end_label));
                }
                if let Some(d) = default {
                    self.emit_expr(d)?;
                    self.tracker.pop()?;
                }
                self.tracker.code.push(Instr::Label(end_label));
                self.tracker.push(ty);
            }
            ExprKind::Nested(inner) => {
                self.emit_expr(inner)?;
            }
        }
        Ok(())
    }

    fn emit_literal(&mut self, value: &jactl_parser::ast::ConstValue) {
        use jactl_parser::ast::ConstValue::*;
        match value {
            Boolean(b) => self.tracker.code.push(Instr::PushBool(*b)),
            Byte(b) => self.tracker.code.push(Instr::PushByte(*b)),
            Int(i) => self.tracker.code.push(Instr::PushInt(*i)),
            Long(l) => self.tracker.code.push(Instr::PushLong(*l)),
            Double(d) => self.tracker.code.push(Instr::PushDouble(*d)),
            String(s) => self.tracker.code.push(Instr::PushString(s.clone())),
            Null => self.tracker.code.push(Instr::PushNull),
            List(_) | Map(_) => self.tracker.code.push(Instr::PushNull),
        }
    }

    /// Wraps the preceding call in the try/catch-`Continuation` protocol: on
    /// first invocation the call may throw a `Continuation` to unwind the
    /// stack instead of returning, so every value still live across it is
    /// spilled to locals first. The resume label tags where the entry
    /// dispatch built by [`Self::finish_with_resume_dispatch`] jumps back to;
    /// on re-entry the saved locals are restored and reloaded onto the stack
    /// before execution falls straight back into the rest of the expression.
    fn emit_suspend_point(&mut self) {
        let spilled = self.tracker.convert_stack_to_locals();
        let resume_label = self.fresh_label();
        self.resume_labels.push(resume_label);
        let longs_slot = self.tracker.allocate_global_var_slot(ValueType::Primitive { kind: crate::types::Primitive::Long, boxed: false });
        let objects_slot = self.tracker.allocate_global_var_slot(ValueType::Any);
        self.tracker.code.push(Instr::SaveLocals { longs_slot, objects_slot });
        self.tracker.code.push(Instr::SuspendPoint { resume_location_id: resume_label });
        self.tracker.code.push(Instr::Label(resume_label));
        self.tracker.code.push(Instr::RestoreLocals { longs_slot, objects_slot });
        self.tracker.reload_locals(&spilled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolver;
    use jactl_parser::parse;

    #[test]
    fn emits_return_for_simple_literal_body() {
        let (mut ast, top_level) = parse("return 1").unwrap();
        let resolver = Resolver::new(&mut ast);
        let resolved = resolver.resolve(&top_level).unwrap();
        let body_stmt = top_level[0];
        let emitter = MethodEmitter::new(&ast, &resolved.types, 0, false);
        let (code, _max_locals) = emitter.emit_body(body_stmt).unwrap();
        assert!(code.iter().any(|i| matches!(i, Instr::Return)));
    }

    #[test]
    fn async_body_emits_save_restore_and_entry_dispatch() {
        let (mut ast, top_level) = parse("sleep(1)").unwrap();
        let resolver = Resolver::new(&mut ast);
        let resolved = resolver.resolve(&top_level).unwrap();
        let body_stmt = top_level[0];
        let emitter = MethodEmitter::new(&ast, &resolved.types, 0, true);
        let (code, _max_locals) = emitter.emit_body(body_stmt).unwrap();
        assert!(code.iter().any(|i| matches!(i, Instr::SaveLocals { .. })));
        assert!(code.iter().any(|i| matches!(i, Instr::RestoreLocals { .. })));
        assert!(code.iter().any(|i| matches!(i, Instr::SuspendPoint { .. })));
        // The entry dispatch precedes everything it guards.
        let dispatch_pos = code.iter().position(|i| matches!(i, Instr::JumpIfTrue(_))).unwrap();
        let suspend_pos = code.iter().position(|i| matches!(i, Instr::SuspendPoint { .. })).unwrap();
        assert!(dispatch_pos < suspend_pos);
    }

    #[test]
    fn sync_body_never_spills_across_a_call() {
        let (mut ast, top_level) = parse("return 1").unwrap();
        let resolver = Resolver::new(&mut ast);
        let resolved = resolver.resolve(&top_level).unwrap();
        let body_stmt = top_level[0];
        let emitter = MethodEmitter::new(&ast, &resolved.types, 0, false);
        let (code, _max_locals) = emitter.emit_body(body_stmt).unwrap();
        assert!(!code.iter().any(|i| matches!(i, Instr::SaveLocals { .. } | Instr::SuspendPoint { .. })));
    }
}
