//! The CPU graph container and cycle-execution driver.
//!
//! The [`Cpu`] owns every component, wires them per a declared
//! topology, drives full-cycle execution and runs the two graph-wide
//! analyses: control-path tagging (once, at assembly) and the
//! latency/critical-path pass (on demand).
//!
//! Execution is single-threaded and synchronous. One clock step is a
//! deterministic push-propagation pass: a worklist is seeded with the
//! perturbed components, popped components re-execute, and outputs
//! whose value changed push into their connected inputs and enqueue the
//! downstream owner. The fixed point is an empty worklist.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::component::Component;
use crate::error::{GraphError, GraphResult};
use crate::geometry::Dimension;
use crate::port::{InputRef, OutputRef};
use crate::topology::CpuTopology;
use crate::types::{ComponentIndex, Cycle, Latency, Value};

/// Counters collected while driving the graph.
#[derive(Clone, Debug, Default)]
pub struct CpuStats {
    /// Clock cycles stepped
    pub cycles: Cycle,
    /// Total component `execute` invocations
    pub executions: u64,
    /// Total changed-value pushes along wires
    pub propagations: u64,
}

/// An assembled, executable datapath graph.
pub struct Cpu {
    /// Components in insertion order, keyed by id
    components: IndexMap<String, Component>,
    /// Topological order of the latency graph (register write edges
    /// excluded), computed once at assembly
    latency_order: Vec<ComponentIndex>,
    wire_count: usize,
    instruction_dependent: bool,
    /// Components perturbed via `set_input` since the last step
    pending_seeds: Vec<ComponentIndex>,
    stats: CpuStats,
}

impl Cpu {
    /// Assembles a CPU from a declared topology.
    ///
    /// Creates the components, wires the declared connections, checks
    /// that every combinational cycle is broken by a register, runs the
    /// control-path tagging pass and settles the graph with an initial
    /// full execute. Any structural problem fails assembly with a
    /// [`GraphError`]; a successfully assembled graph cannot fail
    /// during cycle execution.
    pub fn assemble(topology: &CpuTopology) -> GraphResult<Self> {
        let mut cpu = Self {
            components: IndexMap::new(),
            latency_order: Vec::new(),
            wire_count: 0,
            instruction_dependent: topology.settings.instruction_dependent,
            pending_seeds: Vec::new(),
            stats: CpuStats::default(),
        };

        let mut control_seeds = HashSet::new();
        for spec in &topology.components {
            if cpu.components.contains_key(&spec.id) {
                return Err(GraphError::DuplicateComponent(spec.id.clone()));
            }
            let mut component = Component::new(
                &spec.id,
                spec.kind.clone(),
                spec.latency,
                spec.position,
                spec.size,
            )?;
            for (language, description) in &spec.descriptions {
                component.add_custom_description(language, description.clone());
            }
            if spec.control {
                control_seeds.insert(spec.id.clone());
            }
            cpu.components.insert(spec.id.clone(), component);
        }

        for wire in &topology.wires {
            cpu.connect(
                &wire.from.component,
                &wire.from.port,
                &wire.to.component,
                &wire.to.port,
            )?;
        }

        cpu.latency_order = cpu.compute_latency_order()?;
        cpu.tag_control_path(&control_seeds);
        cpu.execute_all();

        debug!(
            components = cpu.components.len(),
            wires = cpu.wire_count,
            "assembled CPU graph"
        );
        Ok(cpu)
    }

    /// Wires an output to an input.
    ///
    /// A one-time assembly operation: the ports must exist, carry the
    /// same bit width and be unconnected.
    fn connect(
        &mut self,
        from_component: &str,
        from_output: &str,
        to_component: &str,
        to_input: &str,
    ) -> GraphResult<()> {
        let from_index = self
            .components
            .get_index_of(from_component)
            .ok_or_else(|| GraphError::UnknownComponent(from_component.to_string()))?;
        let to_index = self
            .components
            .get_index_of(to_component)
            .ok_or_else(|| GraphError::UnknownComponent(to_component.to_string()))?;

        let (output_index, from_width, already_out) = {
            let source = &self.components[from_index];
            let output = source
                .output(from_output)
                .ok_or_else(|| GraphError::UnknownPort {
                    component: from_component.to_string(),
                    port: from_output.to_string(),
                })?;
            (
                source.output_index(from_output).unwrap_or(0),
                output.size(),
                output.is_connected(),
            )
        };
        let (input_index, to_width, already_in) = {
            let target = &self.components[to_index];
            let input = target
                .input(to_input)
                .ok_or_else(|| GraphError::UnknownPort {
                    component: to_component.to_string(),
                    port: to_input.to_string(),
                })?;
            (
                target.input_index(to_input).unwrap_or(0),
                input.size(),
                input.is_connected(),
            )
        };

        if from_width != to_width {
            return Err(GraphError::WidthMismatch {
                from: from_component.to_string(),
                output: from_output.to_string(),
                from_width,
                to: to_component.to_string(),
                input: to_input.to_string(),
                to_width,
            });
        }
        if already_out {
            return Err(GraphError::OutputAlreadyConnected {
                component: from_component.to_string(),
                port: from_output.to_string(),
            });
        }
        if already_in {
            return Err(GraphError::InputAlreadyConnected {
                component: to_component.to_string(),
                port: to_input.to_string(),
            });
        }

        if let Some((_, source)) = self.components.get_index_mut(from_index) {
            if let Some(output) = source.output_at_mut(output_index) {
                output.set_target(InputRef {
                    component: to_index,
                    input: input_index,
                });
            }
        }
        if let Some((_, target)) = self.components.get_index_mut(to_index) {
            if let Some(input) = target.input_at_mut(input_index) {
                input.set_source(OutputRef {
                    component: from_index,
                    output: output_index,
                });
            }
        }
        self.wire_count += 1;
        Ok(())
    }

    /// Topologically sorts the latency graph with Kahn's algorithm.
    ///
    /// Edges into latency-break inputs (register write ports) are
    /// excluded; if a cycle remains, it is not broken by a register and
    /// assembly fails.
    fn compute_latency_order(&self) -> GraphResult<Vec<ComponentIndex>> {
        let n = self.components.len();
        let mut adjacency: Vec<Vec<ComponentIndex>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];

        for (index, component) in self.components.values().enumerate() {
            for output in component.outputs().values() {
                if let Some(target) = output.target() {
                    let counts = self.components[target.component]
                        .input_at(target.input)
                        .map_or(false, |input| input.can_change_component_latency());
                    if counts {
                        adjacency[index].push(target.component);
                        in_degree[target.component] += 1;
                    }
                }
            }
        }

        let mut queue: VecDeque<ComponentIndex> = (0..n).filter(|i| in_degree[*i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(index) = queue.pop_front() {
            order.push(index);
            for &next in &adjacency[index] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() != n {
            return Err(GraphError::CombinationalLoop);
        }
        Ok(order)
    }

    /// Tags the control path: seeds plus every component all of whose
    /// wired inputs originate from control-path components.
    fn tag_control_path(&mut self, seeds: &HashSet<String>) {
        let n = self.components.len();
        let mut in_control = vec![false; n];
        for (index, (id, component)) in self.components.iter().enumerate() {
            if component.kind().is_control() || seeds.contains(id) {
                in_control[index] = true;
            }
        }

        loop {
            let mut changed = false;
            for index in 0..n {
                if in_control[index] {
                    continue;
                }
                let component = &self.components[index];
                let mut any_wired = false;
                let mut all_control = true;
                for input in component.inputs().values() {
                    if let Some(source) = input.source() {
                        any_wired = true;
                        if !in_control[source.component] {
                            all_control = false;
                            break;
                        }
                    }
                }
                if any_wired && all_control {
                    in_control[index] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        for index in 0..n {
            if in_control[index] {
                if let Some((_, component)) = self.components.get_index_mut(index) {
                    component.set_in_control_path();
                }
            }
        }
    }

    /// Runs the worklist propagation pass from the given seeds until
    /// the graph quiesces.
    fn propagate(&mut self, seeds: Vec<ComponentIndex>) {
        let n = self.components.len();
        let mut queued = vec![false; n];
        let mut queue = VecDeque::new();
        for seed in seeds {
            if seed < n && !queued[seed] {
                queued[seed] = true;
                queue.push_back(seed);
            }
        }

        while let Some(index) = queue.pop_front() {
            queued[index] = false;
            let pushes: Vec<(InputRef, Value)> = {
                let (_, component) = match self.components.get_index_mut(index) {
                    Some(entry) => entry,
                    None => continue,
                };
                let before: Vec<Value> =
                    component.outputs().values().map(|o| o.value()).collect();
                component.execute();
                component
                    .outputs()
                    .values()
                    .enumerate()
                    .filter_map(|(i, output)| {
                        let changed = before.get(i).map_or(true, |b| *b != output.value());
                        match output.target() {
                            Some(target) if changed => Some((target, output.value())),
                            _ => None,
                        }
                    })
                    .collect()
            };
            self.stats.executions += 1;

            for (target, value) in pushes {
                if let Some((_, component)) = self.components.get_index_mut(target.component) {
                    if let Some(input) = component.input_at_mut(target.input) {
                        if input.set_value(value) {
                            self.stats.propagations += 1;
                            trace!(
                                component = target.component,
                                input = target.input,
                                value,
                                "input changed"
                            );
                            if !queued[target.component] {
                                queued[target.component] = true;
                                queue.push_back(target.component);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Executes every component once and lets the cascade settle.
    ///
    /// Used for the initial settle after assembly and after external
    /// perturbations that may touch many components.
    pub fn execute_all(&mut self) {
        let seeds: Vec<ComponentIndex> = (0..self.components.len()).collect();
        self.propagate(seeds);
    }

    /// Drives one simulated clock cycle.
    ///
    /// Synchronous components latch their inputs at the clock edge,
    /// then propagation is seeded from the synchronous components, the
    /// graph sources (components with no wired input) and anything
    /// perturbed via [`Cpu::set_input`] since the previous step.
    pub fn step(&mut self) {
        for component in self.components.values_mut() {
            if component.kind().is_synchronous() {
                component.commit();
            }
        }

        let mut seeds: Vec<ComponentIndex> = self
            .components
            .values()
            .enumerate()
            .filter(|(_, c)| {
                c.kind().is_synchronous() || c.inputs().values().all(|i| !i.is_connected())
            })
            .map(|(i, _)| i)
            .collect();
        seeds.extend(self.pending_seeds.drain(..));

        self.propagate(seeds);
        self.stats.cycles += 1;
        debug!(cycle = self.stats.cycles, "clock step settled");
    }

    /// Drives the given number of clock cycles.
    pub fn run(&mut self, cycles: Cycle) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Perturbs an input externally (typically an unwired one), seeding
    /// the owning component for the next step.
    ///
    /// Returns `false` if the component or port does not exist; wiring
    /// problems are assembly-time failures, never runtime ones.
    pub fn set_input(&mut self, component: &str, input: &str, value: Value) -> bool {
        let Some(index) = self.components.get_index_of(component) else {
            warn!(component, input, "set_input on unknown component");
            return false;
        };
        let Some((_, entry)) = self.components.get_index_mut(index) else {
            return false;
        };
        let Some(port) = entry.input_mut(input) else {
            warn!(component, input, "set_input on unknown input");
            return false;
        };
        port.set_value(value);
        self.pending_seeds.push(index);
        true
    }

    /// Returns whether performance figures are computed per-instruction
    /// rather than worst-case over all paths.
    pub fn instruction_dependent(&self) -> bool {
        self.instruction_dependent
    }

    /// Sets the instruction-dependent performance policy. Takes effect
    /// on the next performance pass.
    pub fn set_instruction_dependent(&mut self, enabled: bool) {
        self.instruction_dependent = enabled;
    }

    /// Clears all performance figures: every component's accumulated
    /// latency and every output's critical-path flag, regardless of
    /// prior state.
    pub fn reset_performance(&mut self) {
        for component in self.components.values_mut() {
            component.reset_performance();
        }
    }

    /// Runs the latency/critical-path pass over the current topology.
    ///
    /// Resets all performance figures, walks the latency graph in
    /// topological order accumulating worst-case (or, in
    /// instruction-dependent mode, per-instruction) latencies, then
    /// marks the critical path. Must be re-run after any latency edit;
    /// there is no incremental update.
    pub fn compute_performance(&mut self) {
        self.reset_performance();
        let order = self.latency_order.clone();
        let instruction_dependent = self.instruction_dependent;

        for index in order {
            let (accumulated, targets): (Latency, Vec<InputRef>) = {
                let (_, component) = match self.components.get_index_mut(index) {
                    Some(entry) => entry,
                    None => continue,
                };
                let accumulated = component.update_accumulated_latency(instruction_dependent);
                let targets = component
                    .outputs()
                    .values()
                    .filter_map(|output| output.target())
                    .collect();
                (accumulated, targets)
            };
            for target in targets {
                if let Some((_, component)) = self.components.get_index_mut(target.component) {
                    if let Some(input) = component.input_at_mut(target.input) {
                        input.set_accumulated_latency(accumulated);
                    }
                }
            }
        }

        self.mark_critical_path();
        debug!(
            max = self.max_accumulated_latency(),
            instruction_dependent,
            "performance pass complete"
        );
    }

    /// Marks the critical path.
    ///
    /// Every component attaining the CPU-wide maximum accumulated
    /// latency is a path terminus: its outputs are marked, and the path
    /// is backtracked through the inputs attaining the contributing
    /// maximum, marking each traversed output.
    fn mark_critical_path(&mut self) {
        let max = self.max_accumulated_latency();
        if max == 0 {
            return;
        }

        let n = self.components.len();
        let mut visited = vec![false; n];
        let mut stack: Vec<ComponentIndex> = Vec::new();

        for index in 0..n {
            let terminus = self.components[index].accumulated_latency() == max;
            if terminus {
                if let Some((_, component)) = self.components.get_index_mut(index) {
                    for output in component.outputs_mut().values_mut() {
                        output.set_in_critical_path();
                    }
                }
                stack.push(index);
            }
        }

        let instruction_dependent = self.instruction_dependent;
        while let Some(index) = stack.pop() {
            if visited[index] {
                continue;
            }
            visited[index] = true;

            let sources: Vec<OutputRef> = {
                let component = &self.components[index];
                let upstream = component
                    .accumulated_latency()
                    .saturating_sub(component.latency());
                let considered = if instruction_dependent {
                    component.kind().latency_inputs(component.inputs())
                } else {
                    None
                };
                component
                    .inputs()
                    .iter()
                    .filter_map(|(id, input)| {
                        let in_set = considered
                            .as_ref()
                            .map_or(true, |set| set.iter().any(|s| s == id));
                        if in_set
                            && input.can_change_component_latency()
                            && input.accumulated_latency() == upstream
                            && upstream > 0
                        {
                            input.source()
                        } else {
                            None
                        }
                    })
                    .collect()
            };

            for source in sources {
                if let Some((_, component)) = self.components.get_index_mut(source.component) {
                    if let Some(output) = component.output_at_mut(source.output) {
                        output.set_in_critical_path();
                    }
                }
                stack.push(source.component);
            }
        }
    }

    /// Returns the CPU-wide maximum accumulated latency of the latest
    /// performance pass.
    pub fn max_accumulated_latency(&self) -> Latency {
        self.components
            .values()
            .map(|c| c.accumulated_latency())
            .max()
            .unwrap_or(0)
    }

    /// Returns the (component id, output id) pairs currently marked as
    /// the critical path.
    pub fn critical_path(&self) -> Vec<(String, String)> {
        let mut path = Vec::new();
        for (id, component) in &self.components {
            for output in component.outputs().values() {
                if output.in_critical_path() {
                    path.push((id.clone(), output.id().to_string()));
                }
            }
        }
        path
    }

    /// Returns the component with the given id.
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    /// Returns the component with the given id, mutably.
    pub fn component_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    /// Returns the components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Returns the number of components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Returns the number of wires.
    pub fn wire_count(&self) -> usize {
        self.wire_count
    }

    /// Returns the bounding extent over every component's position and
    /// size; a read-only fact for the rendering collaborator.
    pub fn layout_extent(&self) -> Dimension {
        let mut width = 0i64;
        let mut height = 0i64;
        for component in self.components.values() {
            width = width.max(component.position().x as i64 + component.size().width as i64);
            height = height.max(component.position().y as i64 + component.size().height as i64);
        }
        Dimension::new(width.max(0) as u32, height.max(0) as u32)
    }

    /// Returns the driver counters.
    pub fn stats(&self) -> &CpuStats {
        &self.stats
    }

    /// Exports driver and analysis figures as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "cycles": self.stats.cycles,
            "executions": self.stats.executions,
            "propagations": self.stats.propagations,
            "component_count": self.components.len(),
            "wire_count": self.wire_count,
            "instruction_dependent": self.instruction_dependent,
            "max_accumulated_latency": self.max_accumulated_latency(),
            "critical_path_outputs": self.critical_path().len(),
        })
    }
}
