//! Combinational logic kinds: gates, the adder, the shifter and the
//! extenders.

use serde::{Deserialize, Serialize};

use super::{input_value, set_output, InputDecl, Inputs, OutputDecl, Outputs};
use crate::data::Data;

/// The boolean operation performed by a [`Gate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOp {
    And,
    Or,
    Xor,
    Not,
}

/// A bitwise logic gate.
///
/// `Not` has a single input `in`; the binary ops have `in1` and `in2`.
/// The output is `out`, all ports at the declared width.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gate {
    pub op: GateOp,
    pub width: u8,
}

impl Gate {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        let inputs = match self.op {
            GateOp::Not => vec![InputDecl::new("in", self.width)],
            _ => vec![
                InputDecl::new("in1", self.width),
                InputDecl::new("in2", self.width),
            ],
        };
        (inputs, vec![OutputDecl::new("out", self.width)])
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let result = match self.op {
            GateOp::And => input_value(inputs, "in1") & input_value(inputs, "in2"),
            GateOp::Or => input_value(inputs, "in1") | input_value(inputs, "in2"),
            GateOp::Xor => input_value(inputs, "in1") ^ input_value(inputs, "in2"),
            GateOp::Not => !input_value(inputs, "in"),
        };
        set_output(outputs, "out", result);
    }
}

/// A plain adder: `out = in1 + in2`, wrapping at the port width.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Adder {
    pub width: u8,
}

impl Adder {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        (
            vec![
                InputDecl::new("in1", self.width),
                InputDecl::new("in2", self.width),
            ],
            vec![OutputDecl::new("out", self.width)],
        )
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let sum = input_value(inputs, "in1").wrapping_add(input_value(inputs, "in2"));
        set_output(outputs, "out", sum);
    }
}

/// A constant left shifter: `out = in << amount`, truncated to the
/// output width (e.g. the `<< 2` in branch target computation).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShiftLeft {
    pub in_width: u8,
    pub out_width: u8,
    pub amount: u8,
}

impl ShiftLeft {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        (
            vec![InputDecl::new("in", self.in_width)],
            vec![OutputDecl::new("out", self.out_width)],
        )
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let shifted = input_value(inputs, "in") << (self.amount as u32 % 32);
        set_output(outputs, "out", shifted);
    }
}

/// Sign extension from `in_width` to `out_width` bits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignExtend {
    pub in_width: u8,
    pub out_width: u8,
}

impl SignExtend {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        (
            vec![InputDecl::new("in", self.in_width)],
            vec![OutputDecl::new("out", self.out_width)],
        )
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let narrow = Data::new(self.in_width, input_value(inputs, "in"));
        set_output(outputs, "out", narrow.signed_value() as u32);
    }
}

/// Zero extension from `in_width` to `out_width` bits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZeroExtend {
    pub in_width: u8,
    pub out_width: u8,
}

impl ZeroExtend {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        (
            vec![InputDecl::new("in", self.in_width)],
            vec![OutputDecl::new("out", self.out_width)],
        )
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        set_output(outputs, "out", input_value(inputs, "in"));
    }
}
