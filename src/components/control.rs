//! The table-driven control unit.
//!
//! The engine does not hard-code any instruction-decoding policy; the
//! control unit's behavior is entirely the lookup table declared in the
//! topology, which keeps decoding a property of the concrete CPU
//! definition rather than of the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{input_value, InputDecl, Inputs, OutputDecl, Outputs};
use crate::types::Value;

/// A named control line with its bit width.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ControlSignal {
    pub name: String,
    pub width: u8,
}

/// A control unit mapping an opcode to a row of control-line values.
///
/// Opcodes absent from the table drive every line to zero (the
/// all-inactive row), so an unknown instruction deasserts everything
/// rather than failing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ControlUnit {
    /// Width of the opcode input.
    pub input_width: u8,
    /// The declared control lines, in output order.
    pub signals: Vec<ControlSignal>,
    /// Opcode value to (signal name, value) rows.
    #[serde(default)]
    pub table: BTreeMap<Value, BTreeMap<String, Value>>,
}

impl ControlUnit {
    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        let outputs = self
            .signals
            .iter()
            .map(|signal| OutputDecl::new(signal.name.clone(), signal.width))
            .collect();
        (vec![InputDecl::new("in", self.input_width)], outputs)
    }

    pub(crate) fn execute(&self, inputs: &Inputs, outputs: &mut Outputs) {
        let opcode = input_value(inputs, "in");
        let row = self.table.get(&opcode);
        for signal in &self.signals {
            let value = row
                .and_then(|r| r.get(&signal.name))
                .copied()
                .unwrap_or(0);
            if let Some(output) = outputs.get_mut(signal.name.as_str()) {
                output.set_value(value);
            }
        }
    }
}
