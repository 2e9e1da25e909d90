//! Optional compile-time diagnostics, off by default so normal compiles stay
//! quiet. A closed reason enum collected by a disable-by-default,
//! thread-local collector, rather than a logging-crate dependency.

use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticReason {
    /// A call site could not be resolved to a known user function or
    /// wrapper and was left to runtime dispatch.
    UnresolvedCall(String),
    /// A field-path write auto-created a missing intermediate Map/List/
    /// Instance.
    AutoCreatedField { parent: String, field: String },
    /// An async continuation-protocol wrap was inserted around a call site.
    AsyncSuspendInserted { function: String, call: String },
    /// A `var`/`def` type widened to `Any` because no narrower common type
    /// could be established across a control-flow merge.
    WidenedToAny { context: String },
    /// Corresponds to a `mv.visitEnd()`/`cv.visitEnd()`
    /// debug-level-3 call site: a diagnostic-only
    /// marker, never a side-effecting writer finalisation.
    StaticInitFinalize { class: String },
}

impl std::fmt::Display for DiagnosticReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticReason::UnresolvedCall(name) => write!(f, "unresolved call '{name}', falling back to dynamic dispatch"),
            DiagnosticReason::AutoCreatedField { parent, field } => write!(f, "auto-created '{field}' on '{parent}'"),
            DiagnosticReason::AsyncSuspendInserted { function, call } => write!(f, "inserted suspend point for '{call}' in '{function}'"),
            DiagnosticReason::WidenedToAny { context } => write!(f, "widened to Any: {context}"),
            DiagnosticReason::StaticInitFinalize { class } => write!(f, "static initialiser finalised for '{class}'"),
        }
    }
}

thread_local! {
    static COLLECTOR: RefCell<DiagnosticsCollector> = RefCell::new(DiagnosticsCollector::default());
}

#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    enabled: bool,
    entries: Vec<DiagnosticReason>,
}

impl DiagnosticsCollector {
    pub fn enable() {
        COLLECTOR.with(|c| c.borrow_mut().enabled = true);
    }

    pub fn disable() {
        COLLECTOR.with(|c| c.borrow_mut().enabled = false);
    }

    pub fn record(reason: DiagnosticReason) {
        COLLECTOR.with(|c| {
            let mut c = c.borrow_mut();
            if c.enabled {
                c.entries.push(reason);
            }
        });
    }

    /// Retrieve and clear the collected diagnostics for this thread.
    pub fn take() -> Vec<DiagnosticReason> {
        COLLECTOR.with(|c| std::mem::take(&mut c.borrow_mut().entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default_records_nothing() {
        DiagnosticsCollector::disable();
        DiagnosticsCollector::record(DiagnosticReason::WidenedToAny { context: "test".into() });
        assert!(DiagnosticsCollector::take().is_empty());
    }

    #[test]
    fn enabled_collects_and_take_clears() {
        DiagnosticsCollector::enable();
        DiagnosticsCollector::record(DiagnosticReason::UnresolvedCall("foo".into()));
        let collected = DiagnosticsCollector::take();
        assert_eq!(collected.len(), 1);
        assert!(DiagnosticsCollector::take().is_empty());
        DiagnosticsCollector::disable();
    }
}
