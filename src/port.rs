//! Input and output ports.
//!
//! Ports are named, directioned, fixed-width value slots on a
//! component. An [`Output`] connects to at most one [`Input`] and an
//! `Input` has at most one source `Output`; the edge is stored as a
//! pair of index references into the CPU's component arena rather than
//! as object back-references, which keeps traversal O(1) in both
//! directions without shared ownership.

use serde::{Deserialize, Serialize};

use crate::data::Data;
use crate::geometry::Point;
use crate::types::{ComponentIndex, Latency, PortIndex, Value};

/// The side of the component a port sits on.
///
/// Used only for the static layout queries; it has no effect on value
/// propagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// Index reference to an output port: (component index, output index).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputRef {
    pub component: ComponentIndex,
    pub output: PortIndex,
}

/// Index reference to an input port: (component index, input index).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputRef {
    pub component: ComponentIndex,
    pub input: PortIndex,
}

/// An input port on a component.
#[derive(Clone, Debug)]
pub struct Input {
    id: String,
    direction: Direction,
    data: Data,
    accumulated_latency: Latency,
    in_control_path: bool,
    relevant: bool,
    /// Whether a change to this input's accumulated latency flows into
    /// the owning component's accumulated latency. False for inputs
    /// whose value is only consumed at the end of the clock cycle
    /// (register write ports); those are the latency breaks that let
    /// the graph contain feedback.
    can_change_component_latency: bool,
    source: Option<OutputRef>,
    position: Option<Point>,
}

impl Input {
    /// Creates a new input port.
    pub fn new(
        id: impl Into<String>,
        data: Data,
        direction: Direction,
        can_change_component_latency: bool,
    ) -> Self {
        Self {
            id: id.into(),
            direction,
            data,
            accumulated_latency: 0,
            in_control_path: false,
            relevant: true,
            can_change_component_latency,
            source: None,
            position: None,
        }
    }

    /// Returns the port identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the layout side of the port.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the current value.
    pub fn data(&self) -> Data {
        self.data
    }

    /// Returns the current raw value.
    pub fn value(&self) -> Value {
        self.data.value()
    }

    /// Returns the declared bit width.
    pub fn size(&self) -> u8 {
        self.data.size()
    }

    /// Sets the value, truncating to the port width.
    ///
    /// Returns `true` if the stored value changed.
    pub fn set_value(&mut self, value: Value) -> bool {
        self.data.set_value(value)
    }

    /// Returns the accumulated latency delivered to this input.
    pub fn accumulated_latency(&self) -> Latency {
        self.accumulated_latency
    }

    /// Sets the accumulated latency delivered to this input.
    pub fn set_accumulated_latency(&mut self, latency: Latency) {
        self.accumulated_latency = latency;
    }

    /// Zeroes the accumulated latency before a fresh analysis pass.
    pub fn reset_accumulated_latency(&mut self) {
        self.accumulated_latency = 0;
    }

    /// Whether this input contributes to the owner's accumulated latency.
    pub fn can_change_component_latency(&self) -> bool {
        self.can_change_component_latency
    }

    /// Returns whether the port carries a control signal.
    pub fn in_control_path(&self) -> bool {
        self.in_control_path
    }

    /// Marks the port as part of the control path. One-way: the flag is
    /// never cleared once set.
    pub fn set_in_control_path(&mut self) {
        self.in_control_path = true;
    }

    /// Whether the current value affects the visible computation.
    pub fn is_relevant(&self) -> bool {
        self.relevant
    }

    /// Sets the relevance flag.
    pub fn set_relevant(&mut self, relevant: bool) {
        self.relevant = relevant;
    }

    /// Returns the source output feeding this input, if wired.
    pub fn source(&self) -> Option<OutputRef> {
        self.source
    }

    /// Returns whether the input is wired to an output.
    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    pub(crate) fn set_source(&mut self, source: OutputRef) {
        self.source = Some(source);
    }

    /// Returns the explicitly assigned layout position, if any.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Overrides the derived layout position.
    pub fn set_position(&mut self, position: Point) {
        self.position = Some(position);
    }
}

/// An output port on a component.
#[derive(Clone, Debug)]
pub struct Output {
    id: String,
    direction: Direction,
    data: Data,
    accumulated_latency: Latency,
    in_control_path: bool,
    relevant: bool,
    in_critical_path: bool,
    target: Option<InputRef>,
    position: Option<Point>,
}

impl Output {
    /// Creates a new output port.
    pub fn new(id: impl Into<String>, data: Data, direction: Direction) -> Self {
        Self {
            id: id.into(),
            direction,
            data,
            accumulated_latency: 0,
            in_control_path: false,
            relevant: true,
            in_critical_path: false,
            target: None,
            position: None,
        }
    }

    /// Returns the port identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the layout side of the port.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the current value.
    pub fn data(&self) -> Data {
        self.data
    }

    /// Returns the current raw value.
    pub fn value(&self) -> Value {
        self.data.value()
    }

    /// Returns the declared bit width.
    pub fn size(&self) -> u8 {
        self.data.size()
    }

    /// Sets the value, truncating to the port width.
    ///
    /// Returns `true` if the stored value changed.
    pub fn set_value(&mut self, value: Value) -> bool {
        self.data.set_value(value)
    }

    /// Returns the accumulated latency up to this output.
    pub fn accumulated_latency(&self) -> Latency {
        self.accumulated_latency
    }

    /// Sets the accumulated latency up to this output.
    pub fn set_accumulated_latency(&mut self, latency: Latency) {
        self.accumulated_latency = latency;
    }

    /// Returns whether the port carries a control signal.
    pub fn in_control_path(&self) -> bool {
        self.in_control_path
    }

    /// Marks the port as part of the control path. One-way.
    pub fn set_in_control_path(&mut self) {
        self.in_control_path = true;
    }

    /// Whether the current value affects the visible computation.
    pub fn is_relevant(&self) -> bool {
        self.relevant
    }

    /// Sets the relevance flag.
    pub fn set_relevant(&mut self, relevant: bool) {
        self.relevant = relevant;
    }

    /// Returns whether this output lies on the critical path of the
    /// latest performance pass.
    pub fn in_critical_path(&self) -> bool {
        self.in_critical_path
    }

    /// Marks this output as part of the critical path.
    pub fn set_in_critical_path(&mut self) {
        self.in_critical_path = true;
    }

    /// Clears the critical-path flag before a fresh analysis pass.
    pub fn unset_in_critical_path(&mut self) {
        self.in_critical_path = false;
    }

    /// Returns the input this output drives, if wired.
    pub fn target(&self) -> Option<InputRef> {
        self.target
    }

    /// Returns whether the output is wired to an input.
    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn set_target(&mut self, target: InputRef) {
        self.target = Some(target);
    }

    /// Returns the explicitly assigned layout position, if any.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Overrides the derived layout position.
    pub fn set_position(&mut self, position: Point) {
        self.position = Some(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_defaults() {
        let input = Input::new("in1", Data::zero(32), Direction::West, true);
        assert_eq!(input.id(), "in1");
        assert_eq!(input.value(), 0);
        assert_eq!(input.accumulated_latency(), 0);
        assert!(input.can_change_component_latency());
        assert!(!input.in_control_path());
        assert!(input.is_relevant());
        assert!(!input.is_connected());
    }

    #[test]
    fn test_input_value_truncated_to_width() {
        let mut input = Input::new("sel", Data::zero(2), Direction::North, true);
        assert!(input.set_value(0b111));
        assert_eq!(input.value(), 0b11);
        assert!(!input.set_value(0b11));
    }

    #[test]
    fn test_control_path_flag_is_one_way() {
        let mut output = Output::new("out", Data::zero(1), Direction::East);
        assert!(!output.in_control_path());
        output.set_in_control_path();
        output.set_in_control_path();
        assert!(output.in_control_path());
    }

    #[test]
    fn test_critical_path_flag_roundtrip() {
        let mut output = Output::new("out", Data::zero(32), Direction::East);
        output.set_in_critical_path();
        assert!(output.in_critical_path());
        output.unset_in_critical_path();
        assert!(!output.in_critical_path());
    }
}
