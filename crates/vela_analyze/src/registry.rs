//! Name → module lookup for one parsed source text.

use std::collections::HashMap;
use vela_common::Ident;
use vela_verilog_parser::ast::{Module, SourceUnit};

/// Modules of a source unit keyed by name.
///
/// Duplicate definitions are reported by the parser; the registry keeps the
/// first one.
#[derive(Debug, Default)]
pub struct ModuleRegistry<'a> {
    modules: HashMap<Ident, &'a Module>,
}

impl<'a> ModuleRegistry<'a> {
    /// Indexes every module of `unit`.
    pub fn from_unit(unit: &'a SourceUnit) -> Self {
        let mut modules = HashMap::new();
        for module in &unit.modules {
            modules.entry(module.name).or_insert(module);
        }
        Self { modules }
    }

    /// Looks up a module by name.
    pub fn lookup(&self, name: Ident) -> Option<&'a Module> {
        self.modules.get(&name).copied()
    }

    /// `true` if a module with this name exists.
    pub fn contains(&self, name: Ident) -> bool {
        self.modules.contains_key(&name)
    }

    /// Number of distinct module names.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// `true` if the unit had no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
