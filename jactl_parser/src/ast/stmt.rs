//! Statement AST nodes.

use super::decl::{ClassDeclId, ExprId, FunDeclId, StmtId, VarDeclId};
use crate::span::Span;

#[derive(Debug, Clone)]
pub enum StmtKind {
    ExprStmt(ExprId),
    Block(Vec<StmtId>),
    VarDecl(VarDeclId),
    FunDecl(FunDeclId),
    ClassDecl(ClassDeclId),

    If {
        cond: ExprId,
        /// `unless` is represented as `If` with the condition's sense
        /// inverted at parse time, so the emitter never needs to know which
        /// keyword was used.
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },

    /// Desugared `while`/`for`/`do-until`.
    /// `for (init; cond; updates) body` becomes `init` followed by a `While`
    /// whose `updates` run at the continue label; `do {..} until(cond)` is a
    /// `While` with `run_body_first: true` and an inverted condition.
    While {
        label: Option<String>,
        cond: ExprId,
        body: StmtId,
        /// Statements executed at the continue label, after `body`, before
        /// re-testing `cond` (the `for`-loop's update clause).
        updates: Option<StmtId>,
        /// `do { } until (cond)`: body runs once before the first test.
        run_body_first: bool,
    },

    Break(Option<String>),
    Continue(Option<String>),
    Return(Option<ExprId>),
}

#[derive(Debug, Clone)]
pub struct StmtNode {
    pub kind: StmtKind,
    pub span: Span,
}
