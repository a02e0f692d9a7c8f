//! The arithmetic-logic unit.

use serde::{Deserialize, Serialize};

use super::{input_value, set_output, InputDecl, Inputs, OutputDecl, Outputs};
use crate::port::Direction;
use crate::types::Value;

/// An operation the ALU can perform, addressed by the standard MIPS
/// 4-bit ALU control encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AluOperation {
    And,
    Or,
    Add,
    Sub,
    SetLessThan,
    Nor,
}

impl AluOperation {
    /// Decodes a 4-bit ALU control value.
    pub fn from_control(control: Value) -> Option<Self> {
        match control {
            0b0000 => Some(AluOperation::And),
            0b0001 => Some(AluOperation::Or),
            0b0010 => Some(AluOperation::Add),
            0b0110 => Some(AluOperation::Sub),
            0b0111 => Some(AluOperation::SetLessThan),
            0b1100 => Some(AluOperation::Nor),
            _ => None,
        }
    }

    /// Applies the operation to two operands of the given width.
    pub fn apply(&self, a: Value, b: Value) -> Value {
        match self {
            AluOperation::And => a & b,
            AluOperation::Or => a | b,
            AluOperation::Add => a.wrapping_add(b),
            AluOperation::Sub => a.wrapping_sub(b),
            AluOperation::SetLessThan => ((a as i32) < (b as i32)) as Value,
            AluOperation::Nor => !(a | b),
        }
    }
}

/// The ALU: operands `in1`/`in2`, a 4-bit `control` input on the north
/// side, a `out` result and a 1-bit `zero` flag.
///
/// An undecodable control value drives zero, matching an unselected
/// functional unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alu {
    pub width: u8,
}

impl Alu {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        (
            vec![
                InputDecl::new("in1", self.width),
                InputDecl::new("in2", self.width),
                InputDecl::new("control", 4).with_direction(Direction::North),
            ],
            vec![
                OutputDecl::new("out", self.width),
                OutputDecl::new("zero", 1),
            ],
        )
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let a = input_value(inputs, "in1");
        let b = input_value(inputs, "in2");
        let result = AluOperation::from_control(input_value(inputs, "control"))
            .map(|op| op.apply(a, b))
            .unwrap_or(0);
        set_output(outputs, "out", result);
        let masked = outputs.get("out").map(|o| o.value()).unwrap_or(0);
        set_output(outputs, "zero", (masked == 0) as Value);
    }
}
