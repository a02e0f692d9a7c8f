//! # Datapath Simulation Engine
//!
//! A cycle-accurate simulation engine for MIPS-like CPU datapaths
//! described as directed component graphs.
//!
//! ## Design Principles
//!
//! - **Graph-Driven**: A CPU is a graph of typed components wired
//!   output-to-input; the declared topology is the source of truth.
//! - **Closed Kind Set**: Component behaviors form a closed sum type,
//!   so every graph-wide analysis is exhaustively checked when a kind
//!   is added.
//! - **Registers Break Cycles**: Synchronous components latch at the
//!   clock edge and drive from latched state, so per-cycle propagation
//!   always sees an acyclic graph.
//! - **Analysis On The Side**: Latency accumulation, critical-path
//!   marking and control-path tagging annotate the graph without
//!   affecting value propagation.
//!
//! ## Quick Start
//!
//! ```rust
//! use datapath::{ComponentKind, Constant, Adder, ProgramCounter, TopologyBuilder};
//!
//! // The classic PC increment loop: pc -> add <- four, add -> pc.
//! let topology = TopologyBuilder::new()
//!     .component("pc", ComponentKind::ProgramCounter(ProgramCounter::new(32)))
//!     .component("four", ComponentKind::Constant(Constant { width: 32, value: 4 }))
//!     .component_with_latency("add", ComponentKind::Adder(Adder { width: 32 }), 2)
//!     .wire("pc", "out", "add", "in1")
//!     .wire("four", "out", "add", "in2")
//!     .wire("add", "out", "pc", "in")
//!     .build()
//!     .unwrap();
//!
//! let mut cpu = topology.assemble().unwrap();
//! cpu.run(3);
//! assert_eq!(cpu.component("pc").unwrap().output("out").unwrap().value(), 12);
//!
//! cpu.compute_performance();
//! assert_eq!(cpu.max_accumulated_latency(), 2);
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use datapath::CpuTopology;
//!
//! let topology = CpuTopology::from_file("single_cycle.yaml")?;
//! let mut cpu = topology.assemble()?;
//! cpu.step();
//! ```

pub mod component;
pub mod components;
pub mod cpu;
pub mod data;
pub mod error;
pub mod geometry;
pub mod port;
pub mod topology;
pub mod types;

// Re-export commonly used types
pub use component::Component;
pub use components::{
    Adder, Alu, AluOperation, BitRange, ComponentKind, Constant, ControlSignal, ControlUnit, Fork,
    Gate, GateOp, Merger, Mux, PipelineRegister, ProgramCounter, RegisterField, ShiftLeft,
    SignExtend, Splitter, ZeroExtend,
};
pub use cpu::{Cpu, CpuStats};
pub use data::Data;
pub use error::{GraphError, GraphResult, TopologyError, TopologyResult};
pub use geometry::{Dimension, Point};
pub use port::{Direction, Input, Output};
pub use topology::{ComponentSpec, CpuSettings, CpuTopology, PortSpec, TopologyBuilder, WireSpec};
pub use types::{Cycle, Latency, Value};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// datapath::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
