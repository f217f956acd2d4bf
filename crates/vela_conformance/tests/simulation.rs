//! Testbench scenarios run through the simulator: reference devices,
//! configuration from TOML, diagnostics with partial waveforms, and VCD
//! output.

use std::io::BufWriter;
use vela_conformance::designs::{ADDER, ADDER_TB, COUNTER, COUNTER_TB, SHIFT_NEG, SHIFT_NEG_TB};
use vela_conformance::{count_code, make_config, simulate_design, simulate_design_with};
use vela_config::TimeUnit;
use vela_diagnostics::Severity;
use vela_verilog_parser::errors::SEM007;
use vela_sim::errors::{SIM002, SIM003, SIM004, SIM010};
use vela_sim::{simulate, Horizon, SimConfig};

fn bits(result: &vela_sim::SimulationResult, name: &str, t: u64) -> String {
    result
        .waveform
        .value_at(name, t)
        .unwrap_or_else(|| panic!("no sample of {name} at {t}"))
        .to_binary_string()
}

#[test]
fn adder_follows_operands() {
    let result = simulate_design(ADDER, ADDER_TB, Horizon::Time(1000));
    assert!(result.success, "{:?}", result.diagnostics);
    assert!(result.finished);
    assert_eq!(result.end_time, 30);

    assert_eq!(bits(&result, "sum", 0), "0011");
    assert_eq!(bits(&result, "carry", 0), "0");
    assert_eq!(bits(&result, "sum", 10), "1001");
    assert_eq!(bits(&result, "sum", 20), "0000");
    assert_eq!(bits(&result, "carry", 20), "1");
    assert_eq!(bits(&result, "dut.full", 20), "10000");

    assert!(result.signal("a").unwrap().driven_by_testbench);
    assert!(!result.signal("sum").unwrap().driven_by_testbench);
}

#[test]
fn negedge_shift_register_with_active_low_reset() {
    let result = simulate_design(SHIFT_NEG, SHIFT_NEG_TB, Horizon::Time(1000));
    assert!(result.success, "{:?}", result.diagnostics);
    assert_eq!(result.end_time, 52);

    for t in [0, 5, 10, 12] {
        assert_eq!(bits(&result, "q1", t), "0", "t={t}");
        assert_eq!(bits(&result, "q2", t), "0", "t={t}");
    }
    // Falling edges at 5 + 10k; the first one after reset is at 15.
    assert_eq!(bits(&result, "q1", 15), "1");
    assert_eq!(bits(&result, "q2", 15), "0");
    assert_eq!(bits(&result, "q2", 25), "1");
}

#[test]
fn simulation_section_of_config() {
    let config = make_config(
        "[simulation]
horizon = 40
clock_names = [\"clk\"]
",
    )
    .unwrap();
    let sim = SimConfig::from(&config.simulation);
    let result = simulate_design_with(COUNTER, COUNTER_TB, &sim);
    assert!(result.success, "{:?}", result.diagnostics);
    assert!(!result.finished);
    assert_eq!(result.end_time, 40);
    assert_eq!(count_code(&result.diagnostics, SIM003), 1);
    assert_eq!(bits(&result, "count", 35), "0010");
}

#[test]
fn timescale_sets_time_unit() {
    let counter = simulate_design(COUNTER, COUNTER_TB, Horizon::Time(20));
    assert_eq!(counter.time_unit, TimeUnit::Ns);

    let config = make_config("[simulation]\ntime_unit = \"ps\"\n").unwrap();
    let adder = simulate_design_with(ADDER, ADDER_TB, &SimConfig::from(&config.simulation));
    assert_eq!(adder.time_unit, TimeUnit::Ps);
}

#[test]
fn undriven_clock_is_reported() {
    let tb = "module tb;
    reg clk, reset;
    wire [3:0] count;
    counter dut(.clk(clk), .reset(reset), .count(count));
    initial begin
        reset = 1;
        #10 reset = 0;
        #10 $finish;
    end
endmodule
";
    let result = simulate_design(COUNTER, tb, Horizon::Time(100));
    assert!(!result.success);
    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.code == SIM002)
        .expect("no-clock diagnostic");
    assert!(diag.message.contains("'dut'"));
    // The stimulus still ran.
    assert!(result.finished);
    assert_eq!(bits(&result, "reset", 10), "0");
}

#[test]
fn event_control_in_initial_is_skipped() {
    let result = simulate(
        "module tb;
           reg clk, a;
           initial begin
             clk = 0;
             forever #5 clk = ~clk;
           end
           initial begin
             a = 0;
             @(posedge clk);
             a = 1;
             #20 $finish;
           end
         endmodule",
        None,
        Horizon::Time(100),
    );
    assert!(result.success, "{:?}", result.diagnostics);
    let skipped: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == SIM004)
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].severity, Severity::Warning);
    assert_eq!(bits(&result, "a", 0), "1");
    assert_eq!(result.end_time, 20);
}

#[test]
fn free_running_always_clock() {
    let result = simulate(
        "module tb;
           reg clk;
           initial clk = 0;
           always #5 clk = ~clk;
           initial #23 $finish;
         endmodule",
        None,
        Horizon::Time(100),
    );
    assert!(result.success, "{:?}", result.diagnostics);
    assert_eq!(result.end_time, 23);
    let times: Vec<u64> = result
        .signal("clk")
        .unwrap()
        .history
        .iter()
        .map(|c| c.time)
        .collect();
    assert_eq!(times, [0, 5, 10, 15, 20]);
    assert_eq!(bits(&result, "clk", 23), "0");
}

#[test]
fn oversized_register_is_clamped_in_simulation() {
    let result = simulate(
        "module tb;
           reg [2000000000:0] big;
           initial begin
             big = 1;
             #10 $finish;
           end
         endmodule",
        None,
        Horizon::Time(100),
    );
    assert_eq!(count_code(&result.diagnostics, SEM007), 1);
    assert!(!result.success);
    assert!(result.finished);
    assert_eq!(result.signal("big").unwrap().width, 1);
    assert_eq!(bits(&result, "big", 0), "1");
}

#[test]
fn oversized_replication_is_reported_and_skipped() {
    let result = simulate(
        "module tb;
           reg a;
           reg [7:0] y, z;
           initial begin
             a = 1;
             #5 y = {100000000{a}};
           end
           initial begin
             z = 8'h00;
             #10 z = 8'hff;
             #10 $finish;
           end
         endmodule",
        None,
        Horizon::Time(100),
    );
    let failed: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == SIM010)
        .collect();
    assert_eq!(failed.len(), 1, "{:?}", result.diagnostics);
    assert!(failed[0].message.contains("t=5"), "{}", failed[0].message);
    assert!(failed[0].message.contains("bit limit"), "{}", failed[0].message);
    assert!(!result.success);
    // The rest of the stimulus still runs to $finish.
    assert!(result.finished);
    assert_eq!(result.end_time, 20);
    assert_eq!(bits(&result, "z", 10), "11111111");
    assert_eq!(bits(&result, "y", 10), "xxxxxxxx");
}

#[test]
fn runs_are_independent_across_threads() {
    let expected = simulate_design(COUNTER, COUNTER_TB, Horizon::Time(1000));
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| simulate_design(COUNTER, COUNTER_TB, Horizon::Time(1000))))
            .collect();
        for handle in handles {
            let result = handle.join().unwrap();
            assert_eq!(result.end_time, expected.end_time);
            assert_eq!(result.waveform, expected.waveform);
        }
    });
}

#[test]
fn counter_vcd_file() {
    let result = simulate_design(COUNTER, COUNTER_TB, Horizon::Time(1000));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.vcd");
    let file = std::fs::File::create(&path).unwrap();
    result.write_vcd(BufWriter::new(file)).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("$version"));
    assert!(text.contains("$timescale 1ns $end"));
    assert!(text.contains("$scope module counter_tb $end"));
    assert!(text.contains("$enddefinitions $end"));
    assert!(text.contains(" count $end"));
    assert!(text.contains("#215\n"));
    assert!(!text.contains("#220"));
}
