//! Class descriptors: package + name, optional base class,
//! ordered field list, mandatory-field set, method table, inner classes, and
//! the unique internal name. Produced by the resolver, referenced by the
//! emitters, immutable once resolution completes.
//!
//! Lives in its own small arena indexed by [`ClassDescriptorId`], the same
//! stable-index shape `jactl_parser::ast` uses for its node arenas — a
//! descriptor can reference its base class by id without creating a Rc
//! cycle.

use std::collections::{HashMap, HashSet};

use jactl_parser::ast::FunDeclId;

use crate::types::ValueType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassDescriptorId(pub u32);

impl ClassDescriptorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A method's emitted shapes: the real descriptor
/// plus, when present, the uniform wrapper and async continuation-entry
/// forms (glossary "Wrapper method").
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub fun_decl: FunDeclId,
    pub name: String,
    pub param_types: Vec<ValueType>,
    pub return_type: ValueType,
    pub is_static: bool,
    pub is_async: bool,
    /// Every user method has a wrapper;
    /// only false for the synthetic script entry point.
    pub has_wrapper: bool,
}

#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub name: String,
    pub declared_type: ValueType,
    pub is_static: bool,
    pub is_final: bool,
    pub is_const: bool,
    pub has_default: bool,
}

/// A class descriptor. `base` and `inner_classes` are ids into
/// the same [`crate::descriptor::ClassTable`] arena rather than owned
/// sub-structures, so a class hierarchy never needs `Rc`.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    pub package: Vec<String>,
    pub simple_name: String,
    pub internal_name: String,
    pub base: Option<ClassDescriptorId>,
    pub fields: Vec<FieldEntry>,
    pub mandatory_fields: HashSet<String>,
    pub methods: HashMap<String, MethodEntry>,
    pub inner_classes: Vec<ClassDescriptorId>,
    /// True when every declared field (including inherited) has a default
    /// value; gates `init-noasync`'s no-args fast path.
    pub all_fields_default_valued: bool,
}

impl ClassDescriptor {
    pub fn new(package: Vec<String>, simple_name: String) -> Self {
        let internal_name = if package.is_empty() {
            simple_name.clone()
        } else {
            format!("{}.{}", package.join("."), simple_name)
        };
        Self {
            package,
            simple_name,
            internal_name,
            base: None,
            fields: Vec::new(),
            mandatory_fields: HashSet::new(),
            methods: HashMap::new(),
            inner_classes: Vec::new(),
            all_fields_default_valued: true,
        }
    }

    pub fn add_field(&mut self, field: FieldEntry) {
        if !field.has_default && !field.is_static {
            self.mandatory_fields.insert(field.name.clone());
            self.all_fields_default_valued = false;
        }
        self.fields.push(field);
    }
}

/// Owns every [`ClassDescriptor`] produced for a compilation unit. The
/// descriptor graph is read-only after resolution.
#[derive(Debug, Default)]
pub struct ClassTable {
    descriptors: Vec<ClassDescriptor>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn push(&mut self, descriptor: ClassDescriptor) -> ClassDescriptorId {
        self.descriptors.push(descriptor);
        ClassDescriptorId((self.descriptors.len() - 1) as u32)
    }

    pub fn get(&self, id: ClassDescriptorId) -> &ClassDescriptor {
        &self.descriptors[id.index()]
    }

    pub fn get_mut(&mut self, id: ClassDescriptorId) -> &mut ClassDescriptor {
        &mut self.descriptors[id.index()]
    }

    pub fn find_by_name(&self, internal_name: &str) -> Option<ClassDescriptorId> {
        self.descriptors
            .iter()
            .position(|d| d.internal_name == internal_name)
            .map(|i| ClassDescriptorId(i as u32))
    }

    /// All field names, own then inherited, base class first.
    pub fn all_field_names(&self, id: ClassDescriptorId) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_fields(id, &mut names);
        names
    }

    fn collect_fields(&self, id: ClassDescriptorId, out: &mut Vec<String>) {
        let desc = self.get(id);
        if let Some(base) = desc.base {
            self.collect_fields(base, out);
        }
        for f in &desc.fields {
            if !f.is_static {
                out.push(f.name.clone());
            }
        }
    }

    /// All mandatory field names across the hierarchy.
    pub fn all_mandatory_fields(&self, id: ClassDescriptorId) -> HashSet<String> {
        let mut out = HashSet::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            let desc = self.get(c);
            out.extend(desc.mandatory_fields.iter().cloned());
            cur = desc.base;
        }
        out
    }

    pub fn get_method(&self, id: ClassDescriptorId, name: &str) -> Option<&MethodEntry> {
        let mut cur = Some(id);
        while let Some(c) = cur {
            let desc = self.get(c);
            if let Some(m) = desc.methods.get(name) {
                return Some(m);
            }
            cur = desc.base;
        }
        None
    }

    pub fn get_inner_class(&self, id: ClassDescriptorId, name: &str) -> Option<ClassDescriptorId> {
        self.get(id).inner_classes.iter().copied().find(|&inner| self.get(inner).simple_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mandatory_fields_propagate_through_base() {
        let mut table = ClassTable::new();
        let mut base = ClassDescriptor::new(vec![], "Base".into());
        base.add_field(FieldEntry {
            name: "id".into(),
            declared_type: ValueType::int(),
            is_static: false,
            is_final: false,
            is_const: false,
            has_default: false,
        });
        let base_id = table.push(base);

        let mut derived = ClassDescriptor::new(vec![], "Derived".into());
        derived.base = Some(base_id);
        derived.add_field(FieldEntry {
            name: "name".into(),
            declared_type: ValueType::String,
            is_static: false,
            is_final: false,
            is_const: false,
            has_default: true,
        });
        let derived_id = table.push(derived);

        let mandatory = table.all_mandatory_fields(derived_id);
        assert!(mandatory.contains("id"));
        assert!(!mandatory.contains("name"));
    }
}
