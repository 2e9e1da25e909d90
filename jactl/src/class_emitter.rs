//! Builds the reflective scaffolding around a resolved class:
//! the synthetic constructor, static initializer, field/method maps, and the
//! checkpoint/restore/write-json/read-json lifecycle methods every emitted
//! class carries regardless of what the user wrote.
//!
//! Kept separate from method body emission, the same split as between this
//! module and [`crate::method_emitter`].

use std::collections::HashMap;

use crate::bytecode::{ClassImage, Instr, MethodImage};
use crate::descriptor::{ClassDescriptorId, ClassTable};
use crate::error::{CompileError, CompileResult};

/// Well-known method names every emitted class carries alongside whatever
/// the user declared.
pub const INIT_METHOD: &str = "init";
pub const INIT_MISSING_METHOD: &str = "initMissing";
pub const INIT_NOASYNC_METHOD: &str = "init$noasync";
pub const WRITE_JSON_METHOD: &str = "_$j$writeJson";
pub const READ_JSON_METHOD: &str = "_$j$readJson";
pub const CHECKPOINT_METHOD: &str = "_$j$checkpoint";
pub const RESTORE_METHOD: &str = "_$j$restore";

/// Emits the non-user-method scaffolding for one resolved class.
pub struct ClassEmitter<'a> {
    classes: &'a ClassTable,
}

impl<'a> ClassEmitter<'a> {
    pub fn new(classes: &'a ClassTable) -> Self {
        Self { classes }
    }

    /// Produce the [`ClassImage`] shell for `id`: internal name, base link,
    /// field order, and the scaffold methods. User method bodies are filled
    /// in afterwards by [`crate::method_emitter::MethodEmitter`] and appended
    /// to `methods` by the caller.
    pub fn emit_shell(&self, id: ClassDescriptorId) -> CompileResult<ClassImage> {
        let desc = self.classes.get(id);
        let base_class = desc.base.map(|b| self.classes.get(b).internal_name.clone());
        let field_names = self.classes.all_field_names(id);

        let mut methods = Vec::new();
        methods.push(self.emit_init(id)?);
        methods.push(self.emit_init_missing(id));
        if desc.all_fields_default_valued {
            methods.push(self.emit_init_noasync_fastpath());
        }
        methods.push(self.emit_write_json(id));
        methods.push(self.emit_read_json(id));
        methods.push(self.emit_checkpoint(id));
        methods.push(self.emit_restore(id));

        let inner_classes = desc
            .inner_classes
            .iter()
            .map(|&inner| self.emit_shell(inner))
            .collect::<CompileResult<Vec<_>>>()?;

        Ok(ClassImage {
            internal_name: desc.internal_name.clone(),
            base_class,
            field_names,
            methods,
            inner_classes,
            constants: Vec::new(),
        })
    }

    /// The constructor that accepts every mandatory field by name and fails
    /// if one is missing.
    fn emit_init(&self, id: ClassDescriptorId) -> CompileResult<MethodImage> {
        let mandatory = self.classes.all_mandatory_fields(id);
        let desc = self.classes.get(id);
        let mut code = Vec::new();
        for name in &mandatory {
            if !desc.fields.iter().any(|f| &f.name == name) && desc.base.is_none() {
                return Err(CompileError::NoSuchField { field: name.clone(), span: jactl_parser::span::Span::empty() });
            }
            code.push(Instr::LoadLocal(0));
            code.push(Instr::StoreField { is_dot: true, is_optional: false, create_if_missing: false });
        }
        code.push(Instr::Return);
        Ok(MethodImage {
            name: INIT_METHOD.into(),
            descriptor: "(Ljava/util/Map;)V".into(),
            is_static: false,
            is_async: false,
            max_locals: 1,
            code,
        })
    }

    /// A relaxed constructor that silently skips missing mandatory fields,
    /// used by copy-construction from a partial map: every field is stored
    /// with `is_optional` set, the same flag `emit_init`'s strict form leaves
    /// off.
    fn emit_init_missing(&self, id: ClassDescriptorId) -> MethodImage {
        let desc = self.classes.get(id);
        let mut code = Vec::new();
        for field in &desc.fields {
            if field.is_static {
                continue;
            }
            code.push(Instr::PushString(field.name.clone()));
            code.push(Instr::LoadLocal(0));
            code.push(Instr::StoreField { is_dot: true, is_optional: true, create_if_missing: false });
        }
        code.push(Instr::Return);
        MethodImage {
            name: INIT_MISSING_METHOD.into(),
            descriptor: "(Ljava/util/Map;)V".into(),
            is_static: false,
            is_async: false,
            max_locals: 1,
            code,
        }
    }

    /// No-arguments fast path available only when every field defaults.
    fn emit_init_noasync_fastpath(&self) -> MethodImage {
        MethodImage {
            name: INIT_NOASYNC_METHOD.into(),
            descriptor: "()V".into(),
            is_static: false,
            is_async: false,
            max_locals: 0,
            code: vec![Instr::Return],
        }
    }

    /// Emits the field name/value pairs wrapped in the JSON object's
    /// structural punctuation, suppressing the leading comma before the
    /// first field actually written.
    fn emit_write_json(&self, id: ClassDescriptorId) -> MethodImage {
        let desc = self.classes.get(id);
        let mut code = vec![Instr::PushString("{".into())];
        let mut wrote_field = false;
        for field in &desc.fields {
            if field.is_static {
                continue;
            }
            if wrote_field {
                code.push(Instr::PushString(",".into()));
            }
            wrote_field = true;
            code.push(Instr::PushString(field.name.clone()));
            code.push(Instr::PushString(":".into()));
            code.push(Instr::LoadLocal(0));
            code.push(Instr::LoadField { is_dot: true, is_optional: false, create_if_missing: false });
        }
        code.push(Instr::PushString("}".into()));
        code.push(Instr::Return);
        MethodImage { name: WRITE_JSON_METHOD.into(), descriptor: "()Ljava/lang/String;".into(), is_static: false, is_async: false, max_locals: 1, code }
    }

    /// Dispatches each parsed JSON key (left in local slot 1 by the caller)
    /// to its matching field via a bitset-style chain of name comparisons,
    /// falling through unmatched fields rather than failing on an unknown
    /// key.
    fn emit_read_json(&self, id: ClassDescriptorId) -> MethodImage {
        let desc = self.classes.get(id);
        let done_label = 0u32;
        let mut next_label = 1u32;
        let mut code = Vec::new();
        for field in &desc.fields {
            if field.is_static {
                continue;
            }
            let fall_through = next_label;
            next_label += 1;
            code.push(Instr::LoadLocal(1));
            code.push(Instr::PushString(field.name.clone()));
            code.push(Instr::BinaryOp(crate::types::OpTag::Equal));
            code.push(Instr::JumpIfFalse(fall_through));
            code.push(Instr::PushString(field.name.clone()));
            code.push(Instr::LoadLocal(1));
            code.push(Instr::StoreField { is_dot: true, is_optional: true, create_if_missing: false });
            code.push(Instr::Jump(done_label));
            code.push(Instr::Label(fall_through));
        }
        code.push(Instr::Label(done_label));
        code.push(Instr::Return);
        MethodImage {
            name: READ_JSON_METHOD.into(),
            descriptor: "(Ljava/lang/String;)V".into(),
            is_static: false,
            is_async: false,
            max_locals: 2,
            code,
        }
    }

    /// Walks the instance's own fields plus a recursive call into the base
    /// class's checkpoint method.
    fn emit_checkpoint(&self, id: ClassDescriptorId) -> MethodImage {
        let desc = self.classes.get(id);
        let mut code = vec![Instr::PushString(desc.internal_name.clone())];
        if let Some(base) = desc.base {
            code.push(Instr::CallDirect { class: self.classes.get(base).internal_name.clone(), method: CHECKPOINT_METHOD.into(), arg_count: 0 });
        } else {
            code.push(Instr::PushNull);
        }
        code.push(Instr::Return);
        MethodImage { name: CHECKPOINT_METHOD.into(), descriptor: "()Ljava/lang/Object;".into(), is_static: false, is_async: false, max_locals: 1, code }
    }

    /// Verifies the checkpoint version, restores this class's own fields,
    /// then recurses into the base class's restore the same way
    /// `emit_checkpoint` recurses into its checkpoint.
    fn emit_restore(&self, id: ClassDescriptorId) -> MethodImage {
        let desc = self.classes.get(id);
        let ok_label = 0u32;
        let mut code = vec![
            Instr::LoadLocal(1),
            Instr::PushInt(crate::bytecode::CHECKPOINT_VERSION as i32),
            Instr::BinaryOp(crate::types::OpTag::Equal),
            Instr::JumpIfTrue(ok_label),
            Instr::Die,
            Instr::Label(ok_label),
        ];
        for field in &desc.fields {
            if field.is_static {
                continue;
            }
            code.push(Instr::PushString(field.name.clone()));
            code.push(Instr::LoadLocal(1));
            code.push(Instr::StoreField { is_dot: true, is_optional: true, create_if_missing: false });
        }
        if let Some(base) = desc.base {
            code.push(Instr::CallDirect { class: self.classes.get(base).internal_name.clone(), method: RESTORE_METHOD.into(), arg_count: 1 });
        }
        code.push(Instr::Return);
        MethodImage { name: RESTORE_METHOD.into(), descriptor: "(Ljava/lang/Object;)V".into(), is_static: false, is_async: false, max_locals: 2, code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ClassDescriptor, FieldEntry};
    use crate::types::ValueType;

    #[test]
    fn shell_includes_fastpath_init_noasync_when_all_fields_defaulted() {
        let mut table = ClassTable::new();
        let mut desc = ClassDescriptor::new(vec![], "Point".into());
        desc.add_field(FieldEntry {
            name: "x".into(),
            declared_type: ValueType::int(),
            is_static: false,
            is_final: false,
            is_const: false,
            has_default: true,
        });
        let id = table.push(desc);
        let emitter = ClassEmitter::new(&table);
        let image = emitter.emit_shell(id).unwrap();
        assert!(image.methods.iter().any(|m| m.name == INIT_NOASYNC_METHOD));
    }

    #[test]
    fn shell_omits_fastpath_when_a_field_is_mandatory() {
        let mut table = ClassTable::new();
        let mut desc = ClassDescriptor::new(vec![], "Point".into());
        desc.add_field(FieldEntry {
            name: "x".into(),
            declared_type: ValueType::int(),
            is_static: false,
            is_final: false,
            is_const: false,
            has_default: false,
        });
        let id = table.push(desc);
        let emitter = ClassEmitter::new(&table);
        let image = emitter.emit_shell(id).unwrap();
        assert!(!image.methods.iter().any(|m| m.name == INIT_NOASYNC_METHOD));
    }

    fn single_field_table() -> (ClassTable, ClassDescriptorId) {
        let mut table = ClassTable::new();
        let mut desc = ClassDescriptor::new(vec![], "Point".into());
        desc.add_field(FieldEntry {
            name: "x".into(),
            declared_type: ValueType::int(),
            is_static: false,
            is_final: false,
            is_const: false,
            has_default: true,
        });
        let id = table.push(desc);
        (table, id)
    }

    #[test]
    fn write_json_wraps_fields_in_object_punctuation() {
        let (table, id) = single_field_table();
        let emitter = ClassEmitter::new(&table);
        let method = emitter.emit_write_json(id);
        assert_eq!(method.code.first(), Some(&Instr::PushString("{".into())));
        assert_eq!(method.code.last(), Some(&Instr::Return));
        assert!(method.code.iter().any(|i| matches!(i, Instr::PushString(s) if s == "}")));
        assert!(!method.code.iter().any(|i| matches!(i, Instr::PushString(s) if s == ",")));
    }

    #[test]
    fn restore_recurses_into_base_class() {
        let mut table = ClassTable::new();
        let base = ClassDescriptor::new(vec![], "Base".into());
        let base_id = table.push(base);
        let mut derived = ClassDescriptor::new(vec![], "Derived".into());
        derived.base = Some(base_id);
        let derived_id = table.push(derived);
        let emitter = ClassEmitter::new(&table);
        let method = emitter.emit_restore(derived_id);
        assert!(method.code.iter().any(|i| matches!(i, Instr::CallDirect { method, .. } if method == RESTORE_METHOD)));
    }
}
