//! Instance checks run after parsing.

use crate::errors;
use crate::registry::ModuleRegistry;
use std::collections::HashMap;
use vela_common::Ident;
use vela_diagnostics::DiagnosticSink;
use vela_source::Span;
use vela_verilog_parser::ast::{Module, ModuleInstance, ModuleItem};
use vela_verilog_parser::ParsedUnit;

/// Checks every instance in `module` against the modules of the same text.
pub fn check_instances(
    module: &Module,
    registry: &ModuleRegistry<'_>,
    unit: &ParsedUnit,
    sink: &DiagnosticSink,
) {
    for item in &module.items {
        if let ModuleItem::Instance(inst) = item {
            check_instance(inst, registry, unit, sink);
        }
    }
}

fn check_instance(
    inst: &ModuleInstance,
    registry: &ModuleRegistry<'_>,
    unit: &ParsedUnit,
    sink: &DiagnosticSink,
) {
    let instance = unit.name_of(inst.instance_name);
    let module_name = unit.name_of(inst.module_name);
    let Some(target) = registry.lookup(inst.module_name) else {
        sink.emit(errors::warning_unknown_module(module_name, instance, inst.span));
        return;
    };

    let mut seen: HashMap<Ident, Span> = HashMap::new();
    let mut positional = 0usize;
    for conn in &inst.connections {
        let Some(port) = conn.port else {
            positional += 1;
            if let Some(formal) = target.ports.get(positional - 1) {
                seen.entry(formal.name).or_insert(conn.span);
            }
            continue;
        };
        if !target.ports.iter().any(|p| p.name == port) {
            sink.emit(errors::error_unknown_port(
                module_name,
                unit.name_of(port),
                conn.span,
            ));
            continue;
        }
        if let Some(&previous) = seen.get(&port) {
            sink.emit(errors::error_port_connected_twice(
                unit.name_of(port),
                instance,
                conn.span,
                previous,
            ));
        } else {
            seen.insert(port, conn.span);
        }
    }
    if positional > target.ports.len() {
        sink.emit(errors::error_too_many_connections(
            instance,
            positional,
            module_name,
            target.ports.len(),
            inst.span,
        ));
    }
}
