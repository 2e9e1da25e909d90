//! Tracks what is on the virtual operand stack versus spilled into locals,
//! and hands out local slots.
//!
//! A plain struct owning its own `code: Vec<Instr>` buffer and mutating it
//! directly as stack-shape operations are requested, rather than routing
//! through a trait.

use crate::bytecode::Instr;
use crate::error::{CompileError, CompileResult};
use crate::types::ValueType;

/// A value's home: either still on the virtual stack, or spilled to a local
/// slot.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Stack(ValueType),
    Local { slot: usize, ty: ValueType },
}

#[derive(Debug, Clone)]
struct Slot {
    ty: ValueType,
    ref_count: u32,
    /// True for a slot aliasing a global variable rather than owning its
    /// own storage.
    is_global: bool,
}

/// Per-method stack/locals bookkeeping. One instance per method body; the
/// method emitter owns it and flushes `code` into the finished
/// [`crate::bytecode::MethodImage`].
#[derive(Debug)]
pub struct OperandTracker {
    stack: Vec<Operand>,
    slots: Vec<Option<Slot>>,
    max_index: usize,
    /// Slots below this index are parameters / the implicit heap-locals
    /// array and are never reused as temporaries.
    minimum_slot: usize,
    pub code: Vec<Instr>,
}

impl OperandTracker {
    pub fn new(minimum_slot: usize) -> Self {
        Self {
            stack: Vec::new(),
            slots: vec![None; minimum_slot],
            max_index: minimum_slot,
            minimum_slot,
            code: Vec::new(),
        }
    }

    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    pub fn max_locals(&self) -> usize {
        self.max_index
    }

    /// Push a value already emitted onto the virtual stack: the caller has already emitted the instruction producing it.
    pub fn push(&mut self, ty: ValueType) {
        self.stack.push(Operand::Stack(ty));
    }

    /// Pure bookkeeping: drop the tracker's record of the top operand. For a
    /// value still on the virtual stack this does not emit anything — the
    /// combining instruction the caller emits next consumes it directly.
    pub fn pop(&mut self) -> CompileResult<ValueType> {
        match self.stack.pop() {
            Some(Operand::Stack(ty)) => Ok(ty),
            Some(Operand::Local { slot, ty }) => {
                self.release_slot(slot);
                Ok(ty)
            }
            None => Err(CompileError::TrackerInvariant { message: "pop on empty stack".into() }),
        }
    }

    /// Duplicate the top of stack.
    pub fn dup(&mut self) -> CompileResult<()> {
        let top = self.peek()?;
        self.code.push(Instr::Dup);
        self.stack.push(Operand::Stack(top));
        Ok(())
    }

    /// Duplicate the top two stack entries as a pair, for read-modify-write
    /// field access that needs the parent+field operands twice without
    /// re-evaluating either (and risking a second side effect).
    pub fn dup2(&mut self) -> CompileResult<()> {
        if self.stack.len() < 2 {
            return Err(CompileError::TrackerInvariant { message: "dup2 needs two stack entries".into() });
        }
        let len = self.stack.len();
        let lower = self.peek_at(len - 2)?;
        let upper = self.peek_at(len - 1)?;
        self.code.push(Instr::Dup2);
        self.stack.push(Operand::Stack(lower));
        self.stack.push(Operand::Stack(upper));
        Ok(())
    }

    /// Swap the two pairs below the top of stack, mirroring [`Self::swap`]
    /// for a two-entry operand.
    pub fn swap2(&mut self) -> CompileResult<()> {
        if self.stack.len() < 4 {
            return Err(CompileError::TrackerInvariant { message: "swap2 needs four stack entries".into() });
        }
        let len = self.stack.len();
        self.stack.swap(len - 1, len - 3);
        self.stack.swap(len - 2, len - 4);
        self.code.push(Instr::Swap2);
        Ok(())
    }

    /// Duplicate the top value and leave a copy addressable underneath the
    /// rest of the expression being built.
    pub fn dup_val(&mut self) -> CompileResult<ValueType> {
        let top = self.peek()?;
        self.code.push(Instr::Dup);
        Ok(top)
    }

    pub fn swap(&mut self) -> CompileResult<()> {
        if self.stack.len() < 2 {
            return Err(CompileError::TrackerInvariant { message: "swap needs two stack entries".into() });
        }
        let len = self.stack.len();
        self.stack.swap(len - 1, len - 2);
        self.code.push(Instr::Swap);
        Ok(())
    }

    fn peek(&self) -> CompileResult<ValueType> {
        match self.stack.last() {
            Some(Operand::Stack(ty)) | Some(Operand::Local { ty, .. }) => Ok(ty.clone()),
            None => Err(CompileError::TrackerInvariant { message: "peek on empty stack".into() }),
        }
    }

    fn peek_at(&self, index: usize) -> CompileResult<ValueType> {
        match self.stack.get(index) {
            Some(Operand::Stack(ty)) | Some(Operand::Local { ty, .. }) => Ok(ty.clone()),
            None => Err(CompileError::TrackerInvariant { message: "peek on empty stack".into() }),
        }
    }

    /// Assert the top of stack is of (or convertible to) the expected type,
    /// used before emitting operations with a fixed
    /// operand shape.
    pub fn expect(&self, ty: &ValueType) -> CompileResult<()> {
        let top = self.peek()?;
        if top.is(ty) || crate::types::is_convertible_to(&top, ty, false) {
            Ok(())
        } else {
            Err(CompileError::TrackerInvariant { message: format!("expected {ty:?} on stack, found {top:?}") })
        }
    }

    fn allocate_slot(&mut self, ty: ValueType) -> usize {
        if let Some(free) = self.slots.iter().skip(self.minimum_slot).position(|s| s.is_none()) {
            let idx = free + self.minimum_slot;
            self.slots[idx] = Some(Slot { ty, ref_count: 1, is_global: false });
            idx
        } else {
            self.slots.push(Some(Slot { ty, ref_count: 1, is_global: false }));
            self.max_index = self.slots.len();
            self.slots.len() - 1
        }
    }

    /// Allocate a slot that aliases a global/heap variable rather than a
    /// local temporary.
    pub fn allocate_global_var_slot(&mut self, ty: ValueType) -> usize {
        let idx = self.allocate_slot(ty);
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.is_global = true;
        }
        idx
    }

    fn release_slot(&mut self, idx: usize) {
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.ref_count -= 1;
            if slot.ref_count == 0 {
                self.slots[idx] = None;
            }
        }
    }

    /// Spill the top of stack into a fresh local and return its slot, for
    /// values that must survive past a side-effecting sub-expression.
    pub fn save_in_temp(&mut self) -> CompileResult<usize> {
        let ty = self.pop_stack_only()?;
        let slot = self.allocate_slot(ty.clone());
        self.code.push(Instr::StoreLocal(slot));
        self.stack.push(Operand::Local { slot, ty });
        Ok(slot)
    }

    fn pop_stack_only(&mut self) -> CompileResult<ValueType> {
        match self.stack.pop() {
            Some(Operand::Stack(ty)) => Ok(ty),
            Some(other) => {
                self.stack.push(other);
                Err(CompileError::TrackerInvariant { message: "top of stack already spilled".into() })
            }
            None => Err(CompileError::TrackerInvariant { message: "pop on empty stack".into() }),
        }
    }

    /// Spill every entry currently on the virtual stack into locals, in
    /// order, so a jump target sees a known, stack-independent frame shape
    pub fn convert_stack_to_locals(&mut self) -> Vec<usize> {
        self.convert_stack_to_locals_except(0)
    }

    /// As [`Self::convert_stack_to_locals`], but leaves the bottom `keep`
    /// entries where they are.
    pub fn convert_stack_to_locals_except(&mut self, keep: usize) -> Vec<usize> {
        let mut slots = Vec::new();
        let boundary = keep.min(self.stack.len());
        for i in (boundary..self.stack.len()).rev() {
            match &self.stack[i] {
                Operand::Stack(ty) => {
                    let ty = ty.clone();
                    let slot = self.allocate_slot(ty.clone());
                    self.code.push(Instr::StoreLocal(slot));
                    self.stack[i] = Operand::Local { slot, ty };
                    slots.push(slot);
                }
                Operand::Local { slot, .. } => slots.push(*slot),
            }
        }
        slots.reverse();
        slots
    }

    /// Snapshot every live local's slot index so a loop or try body can
    /// restore the frame shape on an alternate control-flow path.
    pub fn save_locals(&self) -> Vec<(usize, ValueType)> {
        self.slots
            .iter()
            .enumerate()
            .skip(self.minimum_slot)
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s.ty.clone())))
            .collect()
    }

    pub fn restore_locals(&mut self, saved: Vec<(usize, ValueType)>) {
        for (i, s) in self.slots.iter_mut().enumerate().skip(self.minimum_slot) {
            if !saved.iter().any(|(idx, _)| *idx == i) {
                *s = None;
            }
        }
        for (idx, ty) in saved {
            self.slots[idx] = Some(Slot { ty, ref_count: 1, is_global: false });
        }
    }

    /// Undo a [`Self::convert_stack_to_locals`] spill: reload each slot back
    /// onto the virtual stack, in the same bottom-to-top order, once control
    /// reaches the matching resume label.
    pub fn reload_locals(&mut self, slots: &[usize]) {
        for &slot in slots {
            self.code.push(Instr::LoadLocal(slot));
        }
        for entry in self.stack.iter_mut() {
            if let Operand::Local { slot, ty } = entry {
                if slots.contains(slot) {
                    *entry = Operand::Stack(ty.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_balances_stack_size() {
        let mut t = OperandTracker::new(0);
        t.push(ValueType::int());
        assert_eq!(t.stack_size(), 1);
        t.pop().unwrap();
        assert_eq!(t.stack_size(), 0);
    }

    #[test]
    fn save_in_temp_reuses_freed_slot() {
        let mut t = OperandTracker::new(0);
        t.push(ValueType::int());
        let slot_a = t.save_in_temp().unwrap();
        t.pop().unwrap();
        t.push(ValueType::int());
        let slot_b = t.save_in_temp().unwrap();
        assert_eq!(slot_a, slot_b);
    }

    #[test]
    fn convert_stack_to_locals_preserves_order() {
        let mut t = OperandTracker::new(0);
        t.push(ValueType::int());
        t.push(ValueType::boolean());
        let slots = t.convert_stack_to_locals();
        assert_eq!(slots.len(), 2);
        assert_ne!(slots[0], slots[1]);
    }

    #[test]
    fn convert_stack_to_locals_except_keeps_bottom() {
        let mut t = OperandTracker::new(0);
        t.push(ValueType::int());
        t.push(ValueType::boolean());
        let spilled = t.convert_stack_to_locals_except(1);
        assert_eq!(spilled.len(), 1);
    }

    #[test]
    fn pop_on_empty_stack_is_tracker_invariant_error() {
        let mut t = OperandTracker::new(0);
        assert!(matches!(t.pop(), Err(CompileError::TrackerInvariant { .. })));
    }

    #[test]
    fn pop_of_a_stack_value_emits_no_instruction() {
        let mut t = OperandTracker::new(0);
        t.push(ValueType::int());
        t.pop().unwrap();
        assert!(t.code.is_empty());
    }

    #[test]
    fn dup2_duplicates_both_entries_in_order() {
        let mut t = OperandTracker::new(0);
        t.push(ValueType::int());
        t.push(ValueType::String);
        t.dup2().unwrap();
        assert_eq!(t.stack_size(), 4);
        assert_eq!(t.code, vec![Instr::Dup2]);
    }

    #[test]
    fn reload_locals_restores_stack_shape_after_spilling() {
        let mut t = OperandTracker::new(0);
        t.push(ValueType::int());
        t.push(ValueType::boolean());
        let slots = t.convert_stack_to_locals();
        t.code.clear();
        t.reload_locals(&slots);
        assert_eq!(t.stack_size(), 2);
        assert_eq!(t.code, slots.iter().map(|&s| Instr::LoadLocal(s)).collect::<Vec<_>>());
        // Both entries are addressable by a further pop without re-spilling.
        t.pop().unwrap();
        t.pop().unwrap();
    }
}
