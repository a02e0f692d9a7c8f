//! Declarative CPU topologies.
//!
//! A [`CpuTopology`] is the serializable description of a datapath:
//! global settings, the component list and the wire list. It can be
//! loaded from YAML or JSON, assembled into a running [`Cpu`], and
//! written back out. The [`TopologyBuilder`] offers the same surface
//! programmatically for tests and embedding.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::ComponentKind;
use crate::cpu::Cpu;
use crate::error::{TopologyError, TopologyResult};
use crate::geometry::{Dimension, Point};

/// Graph-wide settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CpuSettings {
    /// When set, the performance pass accumulates per-instruction
    /// latencies (a mux counts only its selected input) instead of the
    /// worst case over all paths.
    #[serde(default)]
    pub instruction_dependent: bool,
}

/// One declared component.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub id: String,
    /// The behavior, inline via its `type` tag.
    #[serde(flatten)]
    pub kind: ComponentKind,
    /// Declared latency; negative values are clamped to zero at
    /// assembly.
    #[serde(default)]
    pub latency: i32,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Dimension,
    /// Marks the component as a control-path seed in addition to the
    /// kinds that imply it.
    #[serde(default)]
    pub control: bool,
    /// Custom descriptions keyed by language code (`"default"` for the
    /// fallback entry).
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
}

/// One end of a wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortSpec {
    pub component: String,
    pub port: String,
}

/// A directed wire from an output to an input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireSpec {
    pub from: PortSpec,
    pub to: PortSpec,
}

/// A complete declared datapath.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CpuTopology {
    #[serde(default)]
    pub settings: CpuSettings,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub wires: Vec<WireSpec>,
}

impl CpuTopology {
    /// Parses a topology from YAML.
    pub fn from_yaml(source: &str) -> TopologyResult<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses a topology from JSON.
    pub fn from_json(source: &str) -> TopologyResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a topology from a `.yaml`/`.yml` or `.json` file, picking
    /// the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> TopologyResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let topology = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&source)?,
            "json" => Self::from_json(&source)?,
            other => return Err(TopologyError::UnknownFormat(other.to_string())),
        };
        debug!(path = %path.display(), components = topology.components.len(), "loaded topology");
        Ok(topology)
    }

    /// Serializes the topology to YAML.
    pub fn to_yaml(&self) -> TopologyResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serializes the topology to JSON.
    pub fn to_json(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the declaration-level consistency rules: non-empty and
    /// unique component ids, and wires that name declared components.
    ///
    /// Port-level rules (existence, widths, single connection, cycle
    /// breaking) are enforced by assembly.
    pub fn validate(&self) -> TopologyResult<()> {
        let mut ids = HashSet::new();
        for spec in &self.components {
            if spec.id.is_empty() {
                return Err(TopologyError::Validation(
                    "component with empty id".to_string(),
                ));
            }
            if !ids.insert(spec.id.as_str()) {
                return Err(TopologyError::Validation(format!(
                    "duplicate component id `{}`",
                    spec.id
                )));
            }
        }
        for wire in &self.wires {
            for end in [&wire.from, &wire.to] {
                if !ids.contains(end.component.as_str()) {
                    return Err(TopologyError::Validation(format!(
                        "wire references unknown component `{}`",
                        end.component
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validates and assembles the topology into an executable [`Cpu`].
    pub fn assemble(&self) -> TopologyResult<Cpu> {
        self.validate()?;
        Ok(Cpu::assemble(self)?)
    }
}

/// Programmatic construction of a [`CpuTopology`].
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    topology: CpuTopology,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instruction-dependent performance policy.
    pub fn instruction_dependent(mut self, enabled: bool) -> Self {
        self.topology.settings.instruction_dependent = enabled;
        self
    }

    /// Adds a component with zero latency at the layout origin.
    pub fn component(self, id: impl Into<String>, kind: ComponentKind) -> Self {
        self.component_with_latency(id, kind, 0)
    }

    /// Adds a component with the given latency at the layout origin.
    pub fn component_with_latency(
        mut self,
        id: impl Into<String>,
        kind: ComponentKind,
        latency: i32,
    ) -> Self {
        self.topology.components.push(ComponentSpec {
            id: id.into(),
            kind,
            latency,
            position: Point::default(),
            size: Dimension::default(),
            control: false,
            descriptions: BTreeMap::new(),
        });
        self
    }

    /// Adds a fully specified component.
    pub fn component_spec(mut self, spec: ComponentSpec) -> Self {
        self.topology.components.push(spec);
        self
    }

    /// Marks the most recently added component as a control-path seed.
    pub fn control(mut self) -> Self {
        if let Some(spec) = self.topology.components.last_mut() {
            spec.control = true;
        }
        self
    }

    /// Places the most recently added component.
    pub fn placed(mut self, position: Point, size: Dimension) -> Self {
        if let Some(spec) = self.topology.components.last_mut() {
            spec.position = position;
            spec.size = size;
        }
        self
    }

    /// Wires an output to an input.
    pub fn wire(
        mut self,
        from_component: impl Into<String>,
        from_port: impl Into<String>,
        to_component: impl Into<String>,
        to_port: impl Into<String>,
    ) -> Self {
        self.topology.wires.push(WireSpec {
            from: PortSpec {
                component: from_component.into(),
                port: from_port.into(),
            },
            to: PortSpec {
                component: to_component.into(),
                port: to_port.into(),
            },
        });
        self
    }

    /// Validates and returns the topology.
    pub fn build(self) -> TopologyResult<CpuTopology> {
        self.topology.validate()?;
        Ok(self.topology)
    }

    /// Returns the topology without validating, for exercising the
    /// assembly-time checks.
    pub fn build_unchecked(self) -> CpuTopology {
        self.topology
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Adder, Constant};

    const PC_LOOP: &str = r#"
settings:
  instruction_dependent: false
components:
  - id: pc
    type: program_counter
    width: 32
  - id: four
    type: constant
    width: 32
    value: 4
  - id: add
    type: adder
    width: 32
    latency: 2
    descriptions:
      default: adds the step to the current address
wires:
  - from: { component: pc, port: out }
    to: { component: add, port: in1 }
  - from: { component: four, port: out }
    to: { component: add, port: in2 }
  - from: { component: add, port: out }
    to: { component: pc, port: in }
"#;

    #[test]
    fn test_yaml_parse_and_assemble() {
        let topology = CpuTopology::from_yaml(PC_LOOP).unwrap();
        assert_eq!(topology.components.len(), 3);
        assert_eq!(topology.wires.len(), 3);
        assert_eq!(topology.components[2].latency, 2);

        let mut cpu = topology.assemble().unwrap();
        cpu.step();
        assert_eq!(cpu.component("pc").unwrap().output("out").unwrap().value(), 4);
        assert_eq!(
            cpu.component("add").unwrap().custom_description("en"),
            Some("adds the step to the current address")
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let topology = CpuTopology::from_yaml(PC_LOOP).unwrap();
        let reparsed = CpuTopology::from_yaml(&topology.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed.components.len(), 3);
        assert_eq!(reparsed.components[0].id, "pc");
    }

    #[test]
    fn test_json_parse() {
        let source = r#"{
            "components": [
                {"id": "one", "type": "constant", "width": 8, "value": 1}
            ]
        }"#;
        let topology = CpuTopology::from_json(source).unwrap();
        assert_eq!(topology.components.len(), 1);
        assert!(!topology.settings.instruction_dependent);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(matches!(
            CpuTopology::from_yaml("components: [{id: x"),
            Err(TopologyError::Yaml(_))
        ));
    }

    #[test]
    fn test_validate_duplicate_id() {
        let topology = TopologyBuilder::new()
            .component("x", ComponentKind::Constant(Constant { width: 8, value: 0 }))
            .component("x", ComponentKind::Constant(Constant { width: 8, value: 0 }))
            .build_unchecked();
        assert!(matches!(
            topology.validate(),
            Err(TopologyError::Validation(message)) if message.contains("duplicate")
        ));
    }

    #[test]
    fn test_validate_dangling_wire() {
        let topology = TopologyBuilder::new()
            .component("add", ComponentKind::Adder(Adder { width: 32 }))
            .wire("ghost", "out", "add", "in1")
            .build_unchecked();
        assert!(matches!(
            topology.validate(),
            Err(TopologyError::Validation(message)) if message.contains("ghost")
        ));
    }

    #[test]
    fn test_builder_build_validates() {
        let result = TopologyBuilder::new()
            .component("x", ComponentKind::Constant(Constant { width: 8, value: 0 }))
            .component("x", ComponentKind::Constant(Constant { width: 8, value: 0 }))
            .build();
        assert!(result.is_err());
    }
}
