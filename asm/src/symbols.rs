use arch::word::BASE_ADDRESS;
use indexmap::{IndexMap, IndexSet};

use crate::error::SemanticError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Inst,
    Data,
    Str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub addr: u16,
    pub kind: LabelKind,
    /// Source line of the definition.
    pub line: usize,
}

/// Labels, externs and entries of one compilation unit, in definition order.
#[derive(Debug, Clone, Default)]
pub struct Symbols {
    labels: IndexMap<String, Label>,
    externs: IndexSet<String>,
    entries: IndexSet<String>,
}

impl Symbols {
    pub fn new() -> Self {
        Symbols::default()
    }

    pub fn define_label(&mut self, name: &str, label: Label) -> Result<(), SemanticError> {
        if self.externs.contains(name) {
            return Err(SemanticError::ExternAndLabel(name.to_string()));
        }
        if self.labels.contains_key(name) {
            return Err(SemanticError::DuplicateLabel(name.to_string()));
        }
        self.labels.insert(name.to_string(), label);
        Ok(())
    }

    pub fn declare_extern(&mut self, name: &str) -> Result<(), SemanticError> {
        if self.labels.contains_key(name) {
            return Err(SemanticError::ExternAndLabel(name.to_string()));
        }
        if self.entries.contains(name) {
            return Err(SemanticError::ExternAndEntry(name.to_string()));
        }
        self.externs.insert(name.to_string());
        Ok(())
    }

    pub fn declare_entry(&mut self, name: &str) -> Result<(), SemanticError> {
        if self.externs.contains(name) {
            return Err(SemanticError::ExternAndEntry(name.to_string()));
        }
        self.entries.insert(name.to_string());
        Ok(())
    }

    /// Data follows code, and everything is loaded at the base address.
    pub fn relocate(&mut self, ic: u16) {
        for label in self.labels.values_mut() {
            if label.kind != LabelKind::Inst {
                label.addr += ic;
            }
            label.addr += BASE_ADDRESS;
        }
    }

    pub fn label(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    pub fn addr(&self, name: &str) -> Option<u16> {
        self.labels.get(name).map(|l| l.addr)
    }

    pub fn is_extern(&self, name: &str) -> bool {
        self.externs.contains(name)
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, &Label)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn externs(&self) -> impl Iterator<Item = &str> {
        self.externs.iter().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// `.define` constants. Built fresh by the second pass.
#[derive(Debug, Clone, Default)]
pub struct Defines(IndexMap<String, i32>);

impl Defines {
    pub fn new() -> Self {
        Defines::default()
    }

    pub fn insert(&mut self, name: &str, value: i32) -> Result<(), SemanticError> {
        if self.0.contains_key(name) {
            return Err(SemanticError::DuplicateDefine(name.to_string()));
        }
        self.0.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
