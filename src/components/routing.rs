//! Signal routing kinds: constants, forks, multiplexers, splitters and
//! mergers.

use serde::{Deserialize, Serialize};

use super::{input_value, set_output, InputDecl, Inputs, OutputDecl, Outputs};
use crate::port::Direction;
use crate::types::Value;

/// A constant driver with no inputs; a graph source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constant {
    pub width: u8,
    #[serde(default)]
    pub value: Value,
}

impl Constant {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        (Vec::new(), vec![OutputDecl::new("out", self.width)])
    }

    pub(crate) fn execute(&self, outputs: &mut Outputs) {
        set_output(outputs, "out", self.value);
    }
}

/// Copies one input to `ways` identical outputs (`out1`..`outN`),
/// modelling a wire that fans out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fork {
    pub width: u8,
    pub ways: usize,
}

impl Fork {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        let outputs = (1..=self.ways)
            .map(|i| OutputDecl::new(format!("out{i}"), self.width))
            .collect();
        (vec![InputDecl::new("in", self.width)], outputs)
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let value = input_value(inputs, "in");
        for i in 1..=self.ways {
            set_output(outputs, &format!("out{i}"), value);
        }
    }
}

/// An N-way multiplexer.
///
/// Data inputs are `in1`..`inN`; the selector `sel` (north side, just
/// wide enough to address N inputs) picks which one drives `out`.
/// A selector value past the last input drives zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mux {
    pub width: u8,
    pub inputs: usize,
}

impl Mux {
    /// Returns the selector width needed to address all inputs.
    pub fn selector_width(&self) -> u8 {
        let n = self.inputs.max(2) as u32;
        (32 - (n - 1).leading_zeros()).max(1) as u8
    }

    fn selected_port(&self, inputs: &Inputs) -> Option<String> {
        let sel = input_value(inputs, "sel") as usize;
        (sel < self.inputs).then(|| format!("in{}", sel + 1))
    }

    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        let mut ins: Vec<InputDecl> = (1..=self.inputs)
            .map(|i| InputDecl::new(format!("in{i}"), self.width))
            .collect();
        ins.push(
            InputDecl::new("sel", self.selector_width()).with_direction(Direction::North),
        );
        (ins, vec![OutputDecl::new("out", self.width)])
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let value = self
            .selected_port(inputs)
            .map(|port| input_value(inputs, &port))
            .unwrap_or(0);
        set_output(outputs, "out", value);
    }

    /// The inputs that matter for instruction-dependent timing: the
    /// selector plus the data input it currently picks.
    pub(crate) fn latency_inputs(&self, inputs: &Inputs) -> Vec<String> {
        let mut considered = vec!["sel".to_string()];
        if let Some(port) = self.selected_port(inputs) {
            considered.push(port);
        }
        considered
    }
}

/// An inclusive bit range, `msb >= lsb`, both zero-based.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BitRange {
    pub msb: u8,
    pub lsb: u8,
}

impl BitRange {
    /// Returns the width of the range.
    pub fn width(&self) -> u8 {
        self.msb.saturating_sub(self.lsb) + 1
    }
}

/// Extracts bit ranges from one input into outputs `out1`..`outN`
/// (e.g. carving opcode, registers and immediate out of an
/// instruction word).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Splitter {
    pub in_width: u8,
    pub ranges: Vec<BitRange>,
}

impl Splitter {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        let outputs = self
            .ranges
            .iter()
            .enumerate()
            .map(|(i, range)| OutputDecl::new(format!("out{}", i + 1), range.width()))
            .collect();
        (vec![InputDecl::new("in", self.in_width)], outputs)
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let value = input_value(inputs, "in");
        for (i, range) in self.ranges.iter().enumerate() {
            let shifted = value >> (range.lsb as u32 % 32);
            set_output(outputs, &format!("out{}", i + 1), shifted);
        }
    }
}

/// Concatenates inputs `in1`..`inN` into one output, `in1` taking the
/// most significant bits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Merger {
    pub widths: Vec<u8>,
}

impl Merger {
    fn out_width(&self) -> u8 {
        self.widths.iter().map(|w| u32::from(*w)).sum::<u32>().min(32) as u8
    }

    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        let inputs = self
            .widths
            .iter()
            .enumerate()
            .map(|(i, width)| InputDecl::new(format!("in{}", i + 1), *width))
            .collect();
        (inputs, vec![OutputDecl::new("out", self.out_width())])
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let mut value: Value = 0;
        for (i, width) in self.widths.iter().enumerate() {
            let part = input_value(inputs, &format!("in{}", i + 1));
            value = (value << (*width as u32 % 32)) | part;
        }
        set_output(outputs, "out", value);
    }
}
