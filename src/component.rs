//! Graph nodes: components with named input and output ports.
//!
//! A [`Component`] owns its ports, its latency figures and its layout
//! metadata. Ports are created once at assembly time from the kind's
//! declarations and never added or removed afterwards. The port
//! registries are insertion-ordered so layout indexing and iteration
//! stay deterministic.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::components::ComponentKind;
use crate::error::GraphError;
use crate::geometry::{Dimension, Point};
use crate::port::{Direction, Input, Output};
use crate::types::{Latency, PortIndex};

/// A functional unit in the datapath graph.
#[derive(Clone, Debug)]
pub struct Component {
    id: String,
    kind: ComponentKind,
    inputs: IndexMap<String, Input>,
    outputs: IndexMap<String, Output>,
    latency: Latency,
    original_latency: Latency,
    accumulated_latency: Latency,
    in_control_path: bool,
    custom_descriptions: BTreeMap<String, String>,
    position: Point,
    size: Dimension,
}

impl Component {
    /// Creates a component of the given kind, registering the ports the
    /// kind declares.
    ///
    /// Fails if the component id is empty or any declared port id is
    /// empty or duplicated.
    pub fn new(
        id: impl Into<String>,
        kind: ComponentKind,
        latency: i32,
        position: Point,
        size: Dimension,
    ) -> Result<Self, GraphError> {
        let id = id.into();
        if id.is_empty() {
            return Err(GraphError::EmptyComponentId);
        }

        let (input_decls, output_decls) = kind.ports();
        let mut component = Self {
            id,
            kind,
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            latency: 0,
            original_latency: 0,
            accumulated_latency: 0,
            in_control_path: false,
            custom_descriptions: BTreeMap::new(),
            position,
            size,
        };
        component.set_latency(latency);
        component.original_latency = component.latency;

        for decl in input_decls {
            component.add_input(Input::new(
                decl.id,
                crate::data::Data::zero(decl.width),
                decl.direction,
                !decl.latency_break,
            ))?;
        }
        for decl in output_decls {
            component.add_output(Output::new(
                decl.id,
                crate::data::Data::zero(decl.width),
                decl.direction,
            ))?;
        }
        Ok(component)
    }

    fn add_input(&mut self, input: Input) -> Result<(), GraphError> {
        if input.id().is_empty() {
            return Err(GraphError::EmptyPortId {
                component: self.id.clone(),
            });
        }
        if self.inputs.contains_key(input.id()) {
            return Err(GraphError::DuplicatePort {
                component: self.id.clone(),
                port: input.id().to_string(),
            });
        }
        self.inputs.insert(input.id().to_string(), input);
        Ok(())
    }

    fn add_output(&mut self, output: Output) -> Result<(), GraphError> {
        if output.id().is_empty() {
            return Err(GraphError::EmptyPortId {
                component: self.id.clone(),
            });
        }
        if self.outputs.contains_key(output.id()) {
            return Err(GraphError::DuplicatePort {
                component: self.id.clone(),
                port: output.id().to_string(),
            });
        }
        self.outputs.insert(output.id().to_string(), output);
        Ok(())
    }

    /// Returns the component identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the component's behavior.
    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Recomputes the outputs from the current inputs (plus internal
    /// state for synchronous kinds).
    ///
    /// Pure with respect to its visible inputs: re-invoking with
    /// unchanged inputs yields unchanged outputs.
    pub fn execute(&mut self) {
        self.kind.execute(&self.inputs, &mut self.outputs);
    }

    /// Latches the current inputs into internal state at the clock edge.
    ///
    /// No-op for combinational kinds.
    pub fn commit(&mut self) {
        self.kind.commit(&self.inputs);
    }

    /// Returns whether the component has an input with the given id.
    pub fn has_input(&self, id: &str) -> bool {
        self.inputs.contains_key(id)
    }

    /// Returns the input with the given id.
    pub fn input(&self, id: &str) -> Option<&Input> {
        self.inputs.get(id)
    }

    /// Returns the input with the given id, mutably.
    pub fn input_mut(&mut self, id: &str) -> Option<&mut Input> {
        self.inputs.get_mut(id)
    }

    /// Returns whether the component has an output with the given id.
    pub fn has_output(&self, id: &str) -> bool {
        self.outputs.contains_key(id)
    }

    /// Returns the output with the given id.
    pub fn output(&self, id: &str) -> Option<&Output> {
        self.outputs.get(id)
    }

    /// Returns the output with the given id, mutably.
    pub fn output_mut(&mut self, id: &str) -> Option<&mut Output> {
        self.outputs.get_mut(id)
    }

    /// Returns the inputs in insertion order.
    pub fn inputs(&self) -> &IndexMap<String, Input> {
        &self.inputs
    }

    /// Returns the outputs in insertion order.
    pub fn outputs(&self) -> &IndexMap<String, Output> {
        &self.outputs
    }

    pub(crate) fn outputs_mut(&mut self) -> &mut IndexMap<String, Output> {
        &mut self.outputs
    }

    pub(crate) fn input_index(&self, id: &str) -> Option<PortIndex> {
        self.inputs.get_index_of(id)
    }

    pub(crate) fn output_index(&self, id: &str) -> Option<PortIndex> {
        self.outputs.get_index_of(id)
    }

    pub(crate) fn input_at(&self, index: PortIndex) -> Option<&Input> {
        self.inputs.get_index(index).map(|(_, input)| input)
    }

    pub(crate) fn input_at_mut(&mut self, index: PortIndex) -> Option<&mut Input> {
        self.inputs.get_index_mut(index).map(|(_, input)| input)
    }

    pub(crate) fn output_at_mut(&mut self, index: PortIndex) -> Option<&mut Output> {
        self.outputs.get_index_mut(index).map(|(_, output)| output)
    }

    /// Returns the component's latency.
    pub fn latency(&self) -> Latency {
        self.latency
    }

    /// Updates the latency, clamping negative values to zero.
    ///
    /// Any previously computed accumulated latencies and critical-path
    /// marking become invalid after this call; the CPU-wide performance
    /// pass must be re-run.
    pub fn set_latency(&mut self, latency: i32) {
        self.latency = latency.max(0) as Latency;
    }

    /// Returns the immutable baseline latency from assembly time.
    pub fn original_latency(&self) -> Latency {
        self.original_latency
    }

    /// Restores the latency to its original value.
    ///
    /// Previously computed accumulated latencies become invalid.
    pub fn reset_latency(&mut self) {
        self.latency = self.original_latency;
    }

    /// Returns the accumulated latency from the graph's sources up to
    /// this component, as of the latest performance pass.
    pub fn accumulated_latency(&self) -> Latency {
        self.accumulated_latency
    }

    /// Recomputes this component's accumulated latency from its inputs.
    ///
    /// Only inputs that can change the component's accumulated latency
    /// contribute; in instruction-dependent mode the kind may further
    /// restrict the set to the inputs relevant to the value currently in
    /// flight, and inputs outside that set are marked irrelevant. The
    /// figure is written to every output; the CPU pushes it onward to
    /// the connected downstream inputs.
    pub(crate) fn update_accumulated_latency(&mut self, instruction_dependent: bool) -> Latency {
        let considered = if instruction_dependent {
            self.kind.latency_inputs(&self.inputs)
        } else {
            None
        };

        let mut acc: Latency = 0;
        for (id, input) in self.inputs.iter_mut() {
            let in_set = considered
                .as_ref()
                .map_or(true, |set| set.iter().any(|s| s == id));
            input.set_relevant(in_set);
            if in_set && input.can_change_component_latency() {
                acc = acc.max(input.accumulated_latency());
            }
        }
        acc += self.latency;
        self.accumulated_latency = acc;

        for output in self.outputs.values_mut() {
            output.set_accumulated_latency(acc);
        }
        acc
    }

    /// Clears all performance figures: the component's and its inputs'
    /// accumulated latencies, the outputs' critical-path flags, and the
    /// relevance flags.
    pub fn reset_performance(&mut self) {
        self.accumulated_latency = 0;
        for input in self.inputs.values_mut() {
            input.reset_accumulated_latency();
            input.set_relevant(true);
        }
        for output in self.outputs.values_mut() {
            output.set_accumulated_latency(0);
            output.unset_in_critical_path();
            output.set_relevant(true);
        }
    }

    /// Returns whether the component is in the control path.
    pub fn in_control_path(&self) -> bool {
        self.in_control_path
    }

    /// Marks the component as part of the control path, propagating the
    /// flag to every input and output. One-way and idempotent; has no
    /// effect on value propagation.
    pub fn set_in_control_path(&mut self) {
        self.in_control_path = true;
        for input in self.inputs.values_mut() {
            input.set_in_control_path();
        }
        for output in self.outputs.values_mut() {
            output.set_in_control_path();
        }
    }

    /// Adds a custom description for the given language code (or
    /// `"default"` for the fallback description).
    pub fn add_custom_description(&mut self, language: &str, description: impl Into<String>) {
        self.custom_descriptions
            .insert(language.trim().to_lowercase(), description.into());
    }

    /// Returns whether the component has a default custom description.
    pub fn has_custom_description(&self) -> bool {
        self.custom_descriptions.contains_key("default")
    }

    /// Resolves the custom description for the requested language.
    ///
    /// Tries the exact language first, then progressively strips
    /// trailing locale qualifiers (`pt_PT` → `pt`), then falls back to
    /// the `"default"` entry.
    pub fn custom_description(&self, language: &str) -> Option<&str> {
        let mut lang = language.to_lowercase();
        if let Some(description) = self.custom_descriptions.get(&lang) {
            return Some(description);
        }
        while let Some(split) = lang.rfind('_') {
            lang.truncate(split);
            if let Some(description) = self.custom_descriptions.get(&lang) {
                return Some(description);
            }
        }
        self.custom_descriptions.get("default").map(String::as_str)
    }

    /// Returns the component's layout position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the component's layout size.
    pub fn size(&self) -> Dimension {
        self.size
    }

    /// Returns the ids of the inputs (first) and outputs on the given
    /// side, in insertion order.
    pub fn port_ids_in_direction(&self, direction: Direction) -> Vec<&str> {
        let mut ids = Vec::new();
        for input in self.inputs.values() {
            if input.direction() == direction {
                ids.push(input.id());
            }
        }
        for output in self.outputs.values() {
            if output.direction() == direction {
                ids.push(output.id());
            }
        }
        ids
    }

    /// Returns the layout position of the given input.
    pub fn input_position(&self, id: &str) -> Option<Point> {
        let input = self.input(id)?;
        Some(match input.position() {
            Some(position) => position,
            None => self.derive_port_position(id, input.direction()),
        })
    }

    /// Returns the layout position of the given output.
    pub fn output_position(&self, id: &str) -> Option<Point> {
        let output = self.output(id)?;
        Some(match output.position() {
            Some(position) => position,
            None => self.derive_port_position(id, output.direction()),
        })
    }

    /// Places a port along its side of the component, evenly spaced by
    /// its index among the same-direction ports.
    fn derive_port_position(&self, id: &str, direction: Direction) -> Point {
        let ports = self.port_ids_in_direction(direction);
        let index = ports.iter().position(|p| *p == id).unwrap_or(0);
        let count = ports.len().max(1);

        let length = match direction {
            Direction::West | Direction::East => self.size.height,
            Direction::North | Direction::South => self.size.width,
        };
        let offset = (length as usize / (count + 1) * (index + 1)) as i32;

        match direction {
            Direction::North => Point::new(self.position.x + offset, self.position.y),
            Direction::South => Point::new(
                self.position.x + offset,
                self.position.y + self.size.height as i32,
            ),
            Direction::West => Point::new(self.position.x, self.position.y + offset),
            Direction::East => Point::new(
                self.position.x + self.size.width as i32,
                self.position.y + offset,
            ),
        }
    }
}
