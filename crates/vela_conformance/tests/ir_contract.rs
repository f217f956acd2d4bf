//! The serialized IR is a contract with downstream tools: these tests pin
//! its field names, version stamp and the meaning of each statistic.

use vela_conformance::designs::{COUNTER, COUNTER_TB, KITCHEN_SINK};
use vela_conformance::full_pipeline;
use vela_ir::{DesignAnalysis, Edge, PortDirection, ProcessKind, SignalKind, IR_VERSION};

fn ir(src: &str) -> DesignAnalysis {
    let result = full_pipeline(src);
    assert!(result.output.success, "{:?}", result.diagnostics());
    result.output.ir.expect("successful compile carries IR")
}

#[test]
fn version_is_stamped_and_serialized() {
    let design = ir(COUNTER);
    assert_eq!(design.version, IR_VERSION);
    let json: serde_json::Value = serde_json::to_value(&design).unwrap();
    assert_eq!(json["version"], IR_VERSION);
    assert_eq!(json["fingerprint"].as_array().map(Vec::len), Some(16));
}

#[test]
fn module_field_set() {
    let json = serde_json::to_value(ir(COUNTER)).unwrap();
    let module = json["modules"][0].as_object().unwrap();
    let mut keys: Vec<&str> = module.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "complexity_score",
            "instances",
            "max_nesting_depth",
            "name",
            "operator_counts",
            "ports",
            "processes",
            "signals",
            "statement_count",
            "statistics",
        ]
    );
}

#[test]
fn json_round_trip_keeps_the_design() {
    let design = ir(KITCHEN_SINK);
    let text = serde_json::to_string(&design).unwrap();
    let back: DesignAnalysis = serde_json::from_str(&text).unwrap();
    assert_eq!(back.version, design.version);
    assert_eq!(back.fingerprint, design.fingerprint);
    for (a, b) in back.modules.iter().zip(&design.modules) {
        assert_eq!(a.ports, b.ports);
        assert_eq!(a.signals, b.signals);
        assert_eq!(a.statistics, b.statistics);
        assert_eq!(a.operator_counts, b.operator_counts);
        assert_eq!(a.processes, b.processes);
        assert!((a.complexity_score - b.complexity_score).abs() < 1e-9);
    }
}

#[test]
fn fingerprint_tracks_content() {
    let a = ir(COUNTER);
    let b = ir(&COUNTER.replace("count + 1", "count - 1"));
    assert_ne!(a.fingerprint, b.fingerprint);

    // Whitespace and comments do not reach the IR.
    let c = ir(&COUNTER.replace("    always", "  // counts up\n    always"));
    assert_eq!(a.fingerprint, c.fingerprint);
}

#[test]
fn no_ir_for_fatal_input() {
    let result = full_pipeline("module m(input a output y); endmodule");
    assert!(!result.output.success);
    assert!(result.ir().is_none());
}

#[test]
fn port_and_signal_metadata() {
    let design = ir(KITCHEN_SINK);
    let alu = design.module("alu").unwrap();

    let y = alu.port("y").unwrap();
    assert_eq!((y.width, y.direction, y.is_reg), (8, PortDirection::Output, true));
    let op = alu.port("op").unwrap();
    assert_eq!((op.width, op.direction, op.is_reg), (2, PortDirection::Input, false));

    assert_eq!(alu.signal("sum").unwrap().kind, SignalKind::Wire);
    assert_eq!(alu.signal("sum").unwrap().width, 8);
    assert_eq!(alu.signal("i").unwrap().kind, SignalKind::Integer);
    assert_eq!(alu.signal("WIDTH").unwrap().kind, SignalKind::Parameter);
    assert_eq!(alu.signal("ADD").unwrap().kind, SignalKind::Parameter);

    let stats = &alu.statistics;
    assert_eq!(stats.ports, 6);
    assert_eq!(stats.wires, 1);
    assert_eq!(stats.parameters, 2);
    assert_eq!(stats.assigns, 2);
    assert_eq!(stats.always_blocks, 1);
    assert_eq!(stats.initial_blocks, 0);
    assert_eq!(stats.instances, 0);
}

#[test]
fn operator_counts_are_keyed_by_symbol() {
    let design = ir(KITCHEN_SINK);
    let alu = design.module("alu").unwrap();
    for symbol in ["+", "-", "&", "==", "?:"] {
        assert!(
            alu.operator_counts.contains_key(symbol),
            "missing {symbol} in {:?}",
            alu.operator_counts
        );
    }
    let keys: Vec<&String> = alu.operator_counts.keys().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(alu.distinct_operators(), alu.operator_counts.len());
}

#[test]
fn processes_describe_clocking() {
    let design = ir(&format!("{COUNTER}{COUNTER_TB}"));

    let counter = design.module("counter").unwrap();
    assert_eq!(counter.processes.len(), 1);
    let p = &counter.processes[0];
    assert_eq!(p.kind, ProcessKind::Sequential);
    assert_eq!(p.clock.as_deref(), Some("clk"));
    assert_eq!(p.edge, Some(Edge::Posedge));

    let tb = design.module("counter_tb").unwrap();
    assert!(tb.processes.iter().all(|p| p.kind == ProcessKind::Initial));
    assert_eq!(tb.statistics.initial_blocks, 3);
    assert_eq!(tb.statistics.instances, 1);
}

#[test]
fn complexity_grows_with_content() {
    let base = ir(COUNTER).modules[0].complexity_score;
    let more = ir(&COUNTER.replace(
        "endmodule",
        "    wire [3:0] next;\n    assign next = count ^ 4'b1010;\nendmodule",
    ))
    .modules[0]
        .complexity_score;
    assert!(more > base, "{more} <= {base}");
    assert!(base >= 0.0);
}
