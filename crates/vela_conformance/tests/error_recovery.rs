//! Tests for error recovery: malformed input yields diagnostics with correct
//! severities, later code is still parsed, and nothing panics.

use vela_analyze::errors::{SEM010, SEM011, SEM012};
use vela_analyze::render_report;
use vela_conformance::{codes, full_pipeline, full_pipeline_with, make_config};
use vela_diagnostics::{DiagnosticKind, Severity};
use vela_sim::{simulate, Horizon};
use vela_verilog_parser::errors::{
    LEX001, LEX004, SEM001, SEM007, SYN001, SYN002, SYN003, SYN004, SYN100,
};

#[test]
fn missing_semicolons_give_several_diagnostics() {
    let src = "
module bad (
    input a,
    output y
);
    wire w
    assign w = a
    assign y = w;
endmodule
";
    let result = full_pipeline(src);
    assert!(!result.output.success);
    assert!(result.ir().is_none());
    assert!(
        result.diagnostics().len() >= 2,
        "expected multiple diagnostics, got {:?}",
        codes(result.diagnostics())
    );
    assert!(result
        .diagnostics()
        .iter()
        .any(|d| d.code == SYN001 && d.severity == Severity::Fatal));
}

#[test]
fn bad_module_then_good_module() {
    let src = "
module bad_mod (input a, output y);
    assign y = ;
endmodule

module good_mod (input a, output y);
    assign y = a;
endmodule
";
    let result = full_pipeline(src);
    let modules = &result.output.unit.ast.modules;
    assert_eq!(modules.len(), 2);
    assert!(modules[0].fatal);
    assert!(!modules[1].fatal);
    // A fatal module anywhere withholds the IR.
    assert!(!result.output.success);
    assert!(result.ir().is_none());
}

#[test]
fn lexical_error_loses_only_the_token() {
    let src = "module m(input a, output y);\n  wire £ w;\n  assign y = a;\nendmodule\n";
    let result = full_pipeline(src);
    let lex: Vec<_> = result
        .diagnostics()
        .iter()
        .filter(|d| d.kind() == DiagnosticKind::Lexical)
        .collect();
    assert_eq!(lex.len(), 1);
    assert_eq!(lex[0].code, LEX001);
    assert_eq!(lex[0].severity, Severity::Error);
    assert_eq!(lex[0].line, 2);
    assert!(result.output.unit.ast.modules[0].fatal);
    assert!(!result.output.success);
    assert!(result.ir().is_none());
}

#[test]
fn deeply_nested_expression_is_rejected_not_crashed() {
    for depth in [500, 2000, 20_000] {
        let src = format!(
            "module m(input a, output y);\n  assign y = {}a{};\nendmodule\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let result = full_pipeline(&src);
        assert_eq!(codes(result.diagnostics()), ["SYN004"], "depth {depth}");
        let diag = &result.diagnostics()[0];
        assert_eq!(diag.code, SYN004);
        assert_eq!(diag.severity, Severity::Fatal);
        assert_eq!(diag.line, 2);
        assert!(!result.output.success);
        assert!(result.ir().is_none());
    }
}

#[test]
fn nesting_below_the_limit_compiles() {
    let src = format!(
        "module m(input a, output y);\n  assign y = {}a{};\nendmodule\n",
        "(".repeat(200),
        ")".repeat(200)
    );
    let result = full_pipeline(&src);
    assert!(result.output.success, "{:?}", codes(result.diagnostics()));
    assert!(result.ir().is_some());
}

#[test]
fn oversized_vector_is_a_semantic_error() {
    let result = full_pipeline(
        "module m(input a, output y);
           reg [2000000000:0] big;
           assign y = a;
         endmodule",
    );
    assert_eq!(result.count(SEM007), 1);
    let diag = result
        .diagnostics()
        .iter()
        .find(|d| d.code == SEM007)
        .unwrap();
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.line, 2);
    // Semantic, so the IR is still produced with the width clamped.
    assert!(result.output.success);
    let ir = result.ir().unwrap();
    assert_eq!(ir.modules[0].signal("big").unwrap().width, 1);
}

#[test]
fn unterminated_block_comment() {
    let result = full_pipeline("module m; /* never closed\nendmodule\n");
    assert!(result.diagnostics().iter().any(|d| d.code == LEX004));
    assert!(!result.output.success);
}

#[test]
fn empty_input_has_no_module() {
    let result = full_pipeline("");
    assert_eq!(codes(result.diagnostics()), ["SYN003"]);
    assert_eq!(result.diagnostics()[0].code, SYN003);
    assert!(result.ir().is_none());
}

#[test]
fn undeclared_target_is_a_semantic_error_only() {
    let result = full_pipeline(
        "module m(input a, output y);
           assign y = a;
           assign ghost = a;
         endmodule",
    );
    assert_eq!(result.count(SEM001), 1);
    assert!(result.has_errors);
    // Semantic errors do not block code generation.
    assert!(result.output.success);
    assert!(result.ir().is_some());
}

#[test]
fn unsupported_item_is_skipped_with_warning() {
    let result = full_pipeline(
        "module m(input a, output y);
           function f; endfunction;
           assign y = a;
         endmodule",
    );
    let skipped: Vec<_> = result
        .diagnostics()
        .iter()
        .filter(|d| d.code == SYN002)
        .collect();
    assert!(!skipped.is_empty());
    assert!(skipped.iter().all(|d| d.severity == Severity::Warning));
}

#[test]
fn instance_checks() {
    let src = "
module leaf(input a, output y);
    assign y = a;
endmodule

module top(input x, output z);
    leaf u0(.a(x), .y(z), .q(x));
    leaf u1(.a(x), .a(x), .y(z));
    missing u2(.p(x));
endmodule
";
    let result = full_pipeline(src);
    assert!(result.output.success);
    assert_eq!(result.count(SEM011), 1);
    assert_eq!(result.count(SEM012), 1);
    assert_eq!(result.count(SEM010), 1);
    let unknown = result
        .diagnostics()
        .iter()
        .find(|d| d.code == SEM010)
        .unwrap();
    assert_eq!(unknown.severity, Severity::Warning);
    assert_eq!(unknown.line, 9);
}

#[test]
fn auto_fix_repairs_and_reports() {
    let config = make_config("[compile]\nauto_fix = true\n").unwrap();
    let src = "module m(input a, input b, output y);
  wire w
  assign w = (a & b
  assign y = w;
endmodule
";
    let result = full_pipeline_with(src, &config);
    assert!(result.output.success, "{:?}", result.diagnostics());
    assert_eq!(result.output.fixes.len(), 3);
    let notes: Vec<_> = result
        .diagnostics()
        .iter()
        .filter(|d| d.code == SYN100)
        .collect();
    assert_eq!(notes.len(), 3);
    assert!(notes.iter().all(|d| d.severity == Severity::Note));
    assert_eq!(notes[0].line, 2);
}

#[test]
fn max_errors_truncates() {
    let config = make_config("[compile]\nmax_errors = 2\n").unwrap();
    let src = "module m;
  assign a = 1;
  assign b = 1;
  assign c = 1;
  assign d = 1;
endmodule
";
    let unlimited = full_pipeline(src);
    assert_eq!(unlimited.count(SEM001), 4);
    let limited = full_pipeline_with(src, &config);
    assert_eq!(limited.error_count, 2);
}

#[test]
fn report_shows_source_context() {
    let result = full_pipeline("module m;\n  reg a;\n  reg a;\nendmodule\n");
    let report = render_report(&result.output);
    assert!(report.contains("error[SEM002]"));
    assert!(report.contains("--> "));
    assert!(report.contains("reg a;"));
}

#[test]
fn garbage_never_panics() {
    let inputs = [
        "",
        "module",
        "endmodule",
        "module m(",
        "module m; always @(posedge) endmodule",
        "module m; assign = ; endmodule",
        "module m; initial begin #; end endmodule",
        "module m; case endcase endmodule",
        "module m(input [:] a); endmodule",
        "module m; wire [3:0 w; endmodule",
        "module m; reg a; initial a = 4'b12; endmodule",
        "`define X\nmodule m; `X endmodule",
        "\u{0}\u{1}\u{7f}",
        "module m; u0 inst(.a(.b(c))); endmodule",
        "module m; begin end end end",
    ];
    for src in inputs {
        let result = full_pipeline(src);
        assert_eq!(result.output.success, result.ir().is_some(), "{src:?}");
        let sim = simulate(src, None, Horizon::Events(10));
        assert!(sim.success || !sim.diagnostics.is_empty(), "{src:?}");
        assert!(sim.waveform.times().len() <= 12, "{src:?}");
    }
}
