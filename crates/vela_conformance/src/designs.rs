//! Reference designs shared by the integration tests.

/// 4-bit counter with an asynchronous active-high reset.
pub const COUNTER: &str = "module counter(
    input wire clk,
    input wire reset,
    output reg [3:0] count
);
    always @(posedge clk or posedge reset) begin
        if (reset)
            count <= 4'b0000;
        else
            count <= count + 1;
    end
endmodule
";

/// Testbench for [`COUNTER`]: 10-unit clock, reset held for `[0, 15)`,
/// `$finish` at 215.
pub const COUNTER_TB: &str = "`timescale 1ns/1ps
module counter_tb;
    reg clk;
    reg reset;
    wire [3:0] count;

    counter dut(.clk(clk), .reset(reset), .count(count));

    initial begin
        clk = 0;
        forever #5 clk = ~clk;
    end

    initial begin
        reset = 1;
        #15 reset = 0;
        #200 $finish;
    end

    initial $monitor(\"%t count=%d\", $time, count);
endmodule
";

/// Combinational 4-bit adder with carry out.
pub const ADDER: &str = "module adder(
    input [3:0] a,
    input [3:0] b,
    output [3:0] sum,
    output carry
);
    wire [4:0] full;
    assign full = {1'b0, a} + b;
    assign sum = full[3:0];
    assign carry = full[4];
endmodule
";

/// Testbench for [`ADDER`] stepping through three operand pairs.
pub const ADDER_TB: &str = "module adder_tb;
    reg [3:0] a;
    reg [3:0] b;
    wire [3:0] sum;
    wire carry;

    adder dut(.a(a), .b(b), .sum(sum), .carry(carry));

    initial begin
        a = 4'd1;
        b = 4'd2;
        #10 a = 4'd7;
        #10 b = 4'd9;
        #10 $finish;
    end
endmodule
";

/// Two-stage shift register clocked on the falling edge with an active-low
/// synchronous reset.
pub const SHIFT_NEG: &str = "module shift2(input clk, input rst_n, input d, output reg q1, output reg q2);
    always @(negedge clk) begin
        if (!rst_n) begin
            q1 <= 1'b0;
            q2 <= 1'b0;
        end else begin
            q1 <= d;
            q2 <= q1;
        end
    end
endmodule
";

/// Testbench for [`SHIFT_NEG`].
pub const SHIFT_NEG_TB: &str = "module shift_tb;
    reg clk, rst_n, d;
    wire q1, q2;

    shift2 u0(.clk(clk), .rst_n(rst_n), .d(d), .q1(q1), .q2(q2));

    initial begin
        clk = 1;
        forever #5 clk = ~clk;
    end

    initial begin
        rst_n = 0;
        d = 1;
        #12 rst_n = 1;
        #40 $finish;
    end
endmodule
";

/// A module with one each of most constructs the front end accepts.
pub const KITCHEN_SINK: &str = "module alu #(parameter WIDTH = 8) (
    input clk,
    input [1:0] op,
    input [WIDTH-1:0] a,
    input [WIDTH-1:0] b,
    output reg [WIDTH-1:0] y,
    output zero
);
    localparam ADD = 2'd0;
    wire [WIDTH-1:0] sum;
    integer i;

    assign sum = a + b;
    assign zero = (y == 0) ? 1'b1 : 1'b0;

    always @(posedge clk) begin : update
        case (op)
            ADD: y <= sum;
            2'd1: y <= a - b;
            2'd2, 2'd3: y <= a & b;
            default: y <= {WIDTH{1'b0}};
        endcase
    end
endmodule
";
