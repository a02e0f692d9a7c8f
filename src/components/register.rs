//! Synchronous kinds: the program counter and the pipeline register.
//!
//! Both latch their inputs at the clock edge and drive their outputs
//! from the latched state, never from the current-cycle inputs. That
//! ordering is what lets the component graph contain feedback: the
//! register is the designated point where the cycle boundary is
//! inserted, so the per-cycle propagation still sees an acyclic graph.

use serde::{Deserialize, Serialize};

use super::{input_value, set_output, InputDecl, Inputs, OutputDecl, Outputs};
use crate::types::Value;

/// The program counter: a single synchronous register driving `out`
/// from its latched value and latching `in` at each clock edge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramCounter {
    pub width: u8,
    /// The latched address; the initial value comes from the topology.
    #[serde(default)]
    pub value: Value,
}

impl ProgramCounter {
    /// Creates a program counter starting at address zero.
    pub fn new(width: u8) -> Self {
        Self { width, value: 0 }
    }

    /// Returns the latched address.
    pub fn current(&self) -> Value {
        self.value
    }

    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        (
            vec![InputDecl::new("in", self.width).with_latency_break()],
            vec![OutputDecl::new("out", self.width)],
        )
    }

    pub(crate) fn execute(&self, outputs: &mut Outputs) {
        set_output(outputs, "out", self.value);
    }

    pub(crate) fn commit(&mut self, inputs: &Inputs) {
        self.value = input_value(inputs, "in");
    }
}

/// One named field latched by a [`PipelineRegister`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterField {
    pub name: String,
    pub width: u8,
}

/// A pipeline register separating two stages.
///
/// For each declared field there is a west input and an east output of
/// the same name. `execute` drives every output from the state latched
/// at the previous clock edge; `commit` latches the current inputs for
/// the next cycle. All inputs are latency breaks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineRegister {
    pub fields: Vec<RegisterField>,
    #[serde(skip)]
    latched: Vec<Value>,
}

impl PipelineRegister {
    /// Creates a pipeline register with the given fields, all latched
    /// to zero.
    pub fn new(fields: Vec<RegisterField>) -> Self {
        let latched = vec![0; fields.len()];
        Self { fields, latched }
    }

    /// Returns the values latched at the previous clock edge, in field
    /// order. Exposed separately from the port values: the outputs show
    /// the same data, but the inputs hold the not-yet-latched
    /// current-cycle values.
    pub fn latched_values(&self) -> &[Value] {
        &self.latched
    }

    /// Returns the latched value of a named field.
    pub fn latched(&self, field: &str) -> Option<Value> {
        self.fields
            .iter()
            .position(|f| f.name == field)
            .and_then(|i| self.latched.get(i).copied())
    }

    fn normalize(&mut self) {
        if self.latched.len() != self.fields.len() {
            self.latched.resize(self.fields.len(), 0);
        }
    }

    pub(crate) fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        let inputs = self
            .fields
            .iter()
            .map(|field| InputDecl::new(field.name.clone(), field.width).with_latency_break())
            .collect();
        let outputs = self
            .fields
            .iter()
            .map(|field| OutputDecl::new(field.name.clone(), field.width))
            .collect();
        (inputs, outputs)
    }

    pub(crate) fn execute(&mut self, outputs: &mut Outputs) {
        self.normalize();
        for (i, field) in self.fields.iter().enumerate() {
            set_output(outputs, &field.name, self.latched[i]);
        }
    }

    pub(crate) fn commit(&mut self, inputs: &Inputs) {
        self.normalize();
        for (i, field) in self.fields.iter().enumerate() {
            self.latched[i] = input_value(inputs, &field.name);
        }
    }
}
