//! End-to-end checks of the guarantees the front end and simulator make:
//! deterministic IR, symbol-table duplicates, operator precedence, selects,
//! `forever` expansion, the reference counter, instance extraction and
//! statement-count monotonicity.

use vela_conformance::designs::{COUNTER, COUNTER_TB, KITCHEN_SINK};
use vela_conformance::{full_pipeline, simulate_design};
use vela_diagnostics::{DiagnosticKind, Severity};
use vela_sim::{simulate, Horizon};
use vela_verilog_parser::ast::{BinaryOp, Expr, ModuleItem};
use vela_verilog_parser::errors::SEM002;
use vela_verilog_parser::{parse_source, ParsedUnit};

fn assign_values(unit: &ParsedUnit) -> Vec<&Expr> {
    unit.ast.modules[0]
        .items
        .iter()
        .filter_map(|item| match item {
            ModuleItem::ContinuousAssign(a) => Some(&a.value),
            _ => None,
        })
        .collect()
}

#[test]
fn identical_source_gives_identical_ir() {
    for src in [COUNTER, KITCHEN_SINK] {
        let first = full_pipeline(src);
        let second = full_pipeline(src);
        let a = first.ir().expect("first compile has IR");
        let b = second.ir().expect("second compile has IR");
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(
            serde_json::to_vec(a).unwrap(),
            serde_json::to_vec(b).unwrap()
        );
    }
}

#[test]
fn duplicate_reg_is_reported_once_at_second_declaration() {
    let unit = parse_source("module m;\n  reg a;\n  reg a;\nendmodule\n");
    let dups: Vec<_> = unit.diagnostics.iter().filter(|d| d.code == SEM002).collect();
    assert_eq!(dups.len(), 1);
    assert_eq!(unit.diagnostics.len(), 1);
    let d = dups[0];
    assert_eq!(d.kind(), DiagnosticKind::Semantic);
    assert!(d.message.starts_with("duplicate declaration of 'a'"));
    assert_eq!(d.line, 3);

    // The first binding survives.
    let module = unit.interner.get("m").unwrap();
    let a = unit.interner.get("a").unwrap();
    let scope = unit.symbols.module_scope(module).unwrap();
    let symbol = unit.symbols.lookup_from(scope, a).unwrap();
    assert!(symbol.span.start < d.span.start);
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let unit = parse_source(
        "module m(input [3:0] a, input [3:0] b, input [3:0] c, output [3:0] y, output [3:0] z);
           assign y = a + b * c;
           assign z = (a + b) * c;
         endmodule",
    );
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    let values = assign_values(&unit);

    let Expr::Binary { op, left, right, .. } = values[0] else {
        panic!("expected a binary root, got {:?}", values[0]);
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(**left, Expr::Identifier { .. }));
    assert!(matches!(
        **right,
        Expr::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));

    let Expr::Binary { op, .. } = values[1] else {
        panic!("expected a binary root, got {:?}", values[1]);
    };
    assert_eq!(*op, BinaryOp::Mul);
}

#[test]
fn range_and_bit_selects() {
    let unit = parse_source(
        "module m(input [7:0] sig, output [7:0] y, output z);
           assign y = sig[7:0];
           assign z = sig[3];
         endmodule",
    );
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    let values = assign_values(&unit);
    assert!(matches!(values[0], Expr::RangeSelect { .. }));
    assert!(matches!(values[1], Expr::BitSelect { .. }));
}

#[test]
fn forever_clock_terminates_at_horizon() {
    let result = simulate(
        "module tb;
           reg clk;
           initial begin
             clk = 0;
             forever #5 clk = ~clk;
           end
         endmodule",
        None,
        Horizon::Time(100),
    );
    assert!(result.success, "{:?}", result.diagnostics);
    assert_eq!(result.end_time, 100);

    let clk = result.signal("clk").unwrap();
    let times: Vec<u64> = clk.history.iter().map(|c| c.time).collect();
    let expected: Vec<u64> = (0..=20).map(|k| k * 5).collect();
    assert_eq!(times, expected);
    for (k, change) in clk.history.iter().enumerate() {
        let bit = if k % 2 == 0 { "0" } else { "1" };
        assert_eq!(change.binary, bit, "t={}", change.time);
    }

    // Reaching the horizon without `$finish` is only a warning.
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.severity == Severity::Warning));
}

#[test]
fn counter_holds_zero_during_reset_then_counts() {
    let result = simulate_design(COUNTER, COUNTER_TB, Horizon::Time(1000));
    assert!(result.success, "{:?}", result.diagnostics);
    assert!(result.finished);
    assert_eq!(result.end_time, 215);

    for t in result.waveform.times().into_iter().filter(|t| *t < 15) {
        let count = result.waveform.value_at("count", t).unwrap();
        assert_eq!(count.to_binary_string(), "0000", "t={t}");
    }

    // Rising edges fall at 5 + 10k; the first one after reset is at 25.
    for k in 0..=20u64 {
        let t = 15 + 10 * k;
        let count = result.waveform.value_at("count", t).unwrap();
        assert_eq!(count.to_u64(), Some(k % 16), "t={t}");
    }
}

#[test]
fn instance_has_three_resolvable_connections() {
    let src = format!("{COUNTER}{COUNTER_TB}");
    let result = full_pipeline(&src);
    assert!(!result.has_errors, "{:?}", result.diagnostics());
    let ir = result.ir().unwrap();

    let tb = ir.module("counter_tb").unwrap();
    assert_eq!(tb.instances.len(), 1);
    let inst = &tb.instances[0];
    assert_eq!(inst.module, "counter");
    assert_eq!(inst.name, "dut");
    assert_eq!(inst.connections.len(), 3);

    let counter = ir.module("counter").unwrap();
    for conn in &inst.connections {
        let port = conn.port.as_deref().expect("named connection");
        assert!(counter.port(port).is_some(), "no port {port}");
        let signal = conn.signal.as_deref().expect("connected");
        assert!(tb.signal(signal).is_some(), "no signal {signal}");
    }
}

#[test]
fn extra_case_arm_never_lowers_statement_count() {
    let mut previous = 0;
    for arms in 1..=6 {
        let labels: String = (0..arms)
            .map(|k| format!("3'd{k}: y = a[{k}];\n"))
            .collect();
        let src = format!(
            "module m(input [2:0] s, input [7:0] a, output reg y);
               always @(*) begin
                 case (s)
                 {labels}
                 default: y = 1'b0;
                 endcase
               end
             endmodule"
        );
        let result = full_pipeline(&src);
        let m = &result.ir().expect("compiles").modules[0];
        assert!(
            m.statement_count >= previous,
            "{arms} arms: {} < {previous}",
            m.statement_count
        );
        previous = m.statement_count;
    }
}
