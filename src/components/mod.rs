//! The closed set of component behaviors.
//!
//! Every functional unit in the datapath is one of the kinds in
//! [`ComponentKind`]. Keeping the set closed means every graph-wide
//! analysis that matches on the kind is exhaustively checked by the
//! compiler when a new kind is added.
//!
//! Each kind declares its ports (ids, widths, sides, latency breaks)
//! and implements `execute`, the per-cycle contract: recompute the
//! outputs from the current inputs, using internal state only for the
//! synchronous kinds. Synchronous kinds additionally implement
//! `commit`, which latches the current inputs at the clock edge.

pub mod alu;
pub mod control;
pub mod logic;
pub mod register;
pub mod routing;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::port::{Direction, Input, Output};
use crate::types::Value;

pub use alu::{Alu, AluOperation};
pub use control::{ControlSignal, ControlUnit};
pub use logic::{Adder, Gate, GateOp, ShiftLeft, SignExtend, ZeroExtend};
pub use register::{PipelineRegister, ProgramCounter, RegisterField};
pub use routing::{BitRange, Constant, Fork, Merger, Mux, Splitter};

/// The input port registry of a component.
pub type Inputs = IndexMap<String, Input>;
/// The output port registry of a component.
pub type Outputs = IndexMap<String, Output>;

/// Declaration of an input port, produced by a kind at assembly time.
#[derive(Clone, Debug)]
pub struct InputDecl {
    pub id: String,
    pub width: u8,
    pub direction: Direction,
    /// True for inputs consumed only at the clock edge (register write
    /// ports); their accumulated latency does not flow into the owner.
    pub latency_break: bool,
}

impl InputDecl {
    /// Declares a west-side input that contributes to latency.
    pub fn new(id: impl Into<String>, width: u8) -> Self {
        Self {
            id: id.into(),
            width,
            direction: Direction::West,
            latency_break: false,
        }
    }

    /// Sets the layout side.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Marks the input as a latency break.
    pub fn with_latency_break(mut self) -> Self {
        self.latency_break = true;
        self
    }
}

/// Declaration of an output port.
#[derive(Clone, Debug)]
pub struct OutputDecl {
    pub id: String,
    pub width: u8,
    pub direction: Direction,
}

impl OutputDecl {
    /// Declares an east-side output.
    pub fn new(id: impl Into<String>, width: u8) -> Self {
        Self {
            id: id.into(),
            width,
            direction: Direction::East,
        }
    }

    /// Sets the layout side.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Reads an input value; unwired or unknown ports read as zero.
pub(crate) fn input_value(inputs: &Inputs, id: &str) -> Value {
    inputs.get(id).map(|input| input.value()).unwrap_or(0)
}

/// Writes an output value, truncating to the port width.
pub(crate) fn set_output(outputs: &mut Outputs, id: &str, value: Value) {
    if let Some(output) = outputs.get_mut(id) {
        output.set_value(value);
    }
}

/// A datapath component behavior.
///
/// The serde representation is internally tagged (`type: adder`,
/// `type: mux`, ...) so kinds embed directly in declared topologies.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    Constant(Constant),
    Gate(Gate),
    Adder(Adder),
    ShiftLeft(ShiftLeft),
    SignExtend(SignExtend),
    ZeroExtend(ZeroExtend),
    Fork(Fork),
    Mux(Mux),
    Splitter(Splitter),
    Merger(Merger),
    Alu(Alu),
    ControlUnit(ControlUnit),
    ProgramCounter(ProgramCounter),
    PipelineRegister(PipelineRegister),
}

impl ComponentKind {
    /// Returns a short human-readable kind name.
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Constant(_) => "constant",
            ComponentKind::Gate(_) => "gate",
            ComponentKind::Adder(_) => "adder",
            ComponentKind::ShiftLeft(_) => "shift_left",
            ComponentKind::SignExtend(_) => "sign_extend",
            ComponentKind::ZeroExtend(_) => "zero_extend",
            ComponentKind::Fork(_) => "fork",
            ComponentKind::Mux(_) => "mux",
            ComponentKind::Splitter(_) => "splitter",
            ComponentKind::Merger(_) => "merger",
            ComponentKind::Alu(_) => "alu",
            ComponentKind::ControlUnit(_) => "control_unit",
            ComponentKind::ProgramCounter(_) => "program_counter",
            ComponentKind::PipelineRegister(_) => "pipeline_register",
        }
    }

    /// Returns the port declarations for this kind.
    pub fn ports(&self) -> (Vec<InputDecl>, Vec<OutputDecl>) {
        match self {
            ComponentKind::Constant(k) => k.ports(),
            ComponentKind::Gate(k) => k.ports(),
            ComponentKind::Adder(k) => k.ports(),
            ComponentKind::ShiftLeft(k) => k.ports(),
            ComponentKind::SignExtend(k) => k.ports(),
            ComponentKind::ZeroExtend(k) => k.ports(),
            ComponentKind::Fork(k) => k.ports(),
            ComponentKind::Mux(k) => k.ports(),
            ComponentKind::Splitter(k) => k.ports(),
            ComponentKind::Merger(k) => k.ports(),
            ComponentKind::Alu(k) => k.ports(),
            ComponentKind::ControlUnit(k) => k.ports(),
            ComponentKind::ProgramCounter(k) => k.ports(),
            ComponentKind::PipelineRegister(k) => k.ports(),
        }
    }

    /// Recomputes the outputs from the current inputs.
    pub fn execute(&mut self, inputs: &Inputs, outputs: &mut Outputs) {
        match self {
            ComponentKind::Constant(k) => k.execute(outputs),
            ComponentKind::Gate(k) => k.execute(inputs, outputs),
            ComponentKind::Adder(k) => k.execute(inputs, outputs),
            ComponentKind::ShiftLeft(k) => k.execute(inputs, outputs),
            ComponentKind::SignExtend(k) => k.execute(inputs, outputs),
            ComponentKind::ZeroExtend(k) => k.execute(inputs, outputs),
            ComponentKind::Fork(k) => k.execute(inputs, outputs),
            ComponentKind::Mux(k) => k.execute(inputs, outputs),
            ComponentKind::Splitter(k) => k.execute(inputs, outputs),
            ComponentKind::Merger(k) => k.execute(inputs, outputs),
            ComponentKind::Alu(k) => k.execute(inputs, outputs),
            ComponentKind::ControlUnit(k) => k.execute(inputs, outputs),
            ComponentKind::ProgramCounter(k) => k.execute(outputs),
            ComponentKind::PipelineRegister(k) => k.execute(outputs),
        }
    }

    /// Latches the current inputs into internal state at the clock
    /// edge. No-op for combinational kinds.
    pub fn commit(&mut self, inputs: &Inputs) {
        match self {
            ComponentKind::ProgramCounter(k) => k.commit(inputs),
            ComponentKind::PipelineRegister(k) => k.commit(inputs),
            _ => {}
        }
    }

    /// Returns whether the kind holds internal state latched at the
    /// clock edge.
    pub fn is_synchronous(&self) -> bool {
        matches!(
            self,
            ComponentKind::ProgramCounter(_) | ComponentKind::PipelineRegister(_)
        )
    }

    /// Returns whether the kind is a control-path seed.
    pub fn is_control(&self) -> bool {
        matches!(self, ComponentKind::ControlUnit(_))
    }

    /// Returns the subset of input ids that count for accumulated
    /// latency in instruction-dependent mode, or `None` for the default
    /// ("all inputs").
    ///
    /// The only kind-specific override is the mux, whose timing depends
    /// on which input the selector currently picks; every other kind
    /// uses the default.
    pub fn latency_inputs(&self, inputs: &Inputs) -> Option<Vec<String>> {
        match self {
            ComponentKind::Mux(k) => Some(k.latency_inputs(inputs)),
            _ => None,
        }
    }
}
