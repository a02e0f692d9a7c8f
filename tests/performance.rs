//! Tests for the latency analysis and path marking.
//!
//! These tests verify the correctness of:
//! - Accumulated latency over combinational chains
//! - Critical-path marking and backtracking
//! - Instruction-dependent accumulation through multiplexers
//! - Latency breaks at synchronous components
//! - Control-path tagging and its persistence

use datapath::{
    Adder, ComponentKind, Constant, ControlSignal, ControlUnit, Fork, Mux, ProgramCounter,
    TopologyBuilder,
};

fn adder(width: u8) -> ComponentKind {
    ComponentKind::Adder(Adder { width })
}

fn constant(width: u8, value: u32) -> ComponentKind {
    ComponentKind::Constant(Constant { width, value })
}

// ============================================================================
// Accumulated Latency
// ============================================================================

#[test]
fn test_chain_accumulates_upstream_maximum() {
    let topology = TopologyBuilder::new()
        .component_with_latency("a", adder(32), 2)
        .component_with_latency("b", adder(32), 3)
        .component_with_latency("c", adder(32), 1)
        .wire("a", "out", "b", "in1")
        .wire("b", "out", "c", "in1")
        .build()
        .unwrap();
    let mut cpu = topology.assemble().unwrap();
    cpu.compute_performance();

    assert_eq!(cpu.component("a").unwrap().accumulated_latency(), 2);
    assert_eq!(cpu.component("b").unwrap().accumulated_latency(), 5);
    assert_eq!(cpu.component("c").unwrap().accumulated_latency(), 6);
    assert_eq!(cpu.max_accumulated_latency(), 6);

    // The figure each component pushed downstream.
    assert_eq!(
        cpu.component("b").unwrap().input("in1").unwrap().accumulated_latency(),
        2
    );
    assert_eq!(
        cpu.component("c").unwrap().input("in1").unwrap().accumulated_latency(),
        5
    );
}

#[test]
fn test_join_takes_slower_branch() {
    let topology = TopologyBuilder::new()
        .component_with_latency("slow", adder(32), 9)
        .component_with_latency("fast", adder(32), 1)
        .component_with_latency("join", adder(32), 2)
        .wire("slow", "out", "join", "in1")
        .wire("fast", "out", "join", "in2")
        .build()
        .unwrap();
    let mut cpu = topology.assemble().unwrap();
    cpu.compute_performance();

    assert_eq!(cpu.component("join").unwrap().accumulated_latency(), 11);
}

#[test]
fn test_latency_edit_requires_recompute() {
    let topology = TopologyBuilder::new()
        .component_with_latency("a", adder(32), 2)
        .component_with_latency("b", adder(32), 3)
        .wire("a", "out", "b", "in1")
        .build()
        .unwrap();
    let mut cpu = topology.assemble().unwrap();
    cpu.compute_performance();
    assert_eq!(cpu.component("b").unwrap().accumulated_latency(), 5);

    cpu.component_mut("a").unwrap().set_latency(10);
    // Stale until the pass is re-run.
    assert_eq!(cpu.component("b").unwrap().accumulated_latency(), 5);
    cpu.compute_performance();
    assert_eq!(cpu.component("b").unwrap().accumulated_latency(), 13);

    cpu.component_mut("a").unwrap().reset_latency();
    cpu.compute_performance();
    assert_eq!(cpu.component("b").unwrap().accumulated_latency(), 5);
}

#[test]
fn test_register_breaks_latency_loop() {
    // pc -> add -> pc: the loop is finite because the register's write
    // port does not feed its accumulated latency back around.
    let topology = TopologyBuilder::new()
        .component("pc", ComponentKind::ProgramCounter(ProgramCounter::new(32)))
        .component("four", constant(32, 4))
        .component_with_latency("add", adder(32), 2)
        .wire("pc", "out", "add", "in1")
        .wire("four", "out", "add", "in2")
        .wire("add", "out", "pc", "in")
        .build()
        .unwrap();
    let mut cpu = topology.assemble().unwrap();
    cpu.compute_performance();

    assert_eq!(cpu.component("pc").unwrap().accumulated_latency(), 0);
    assert_eq!(cpu.component("add").unwrap().accumulated_latency(), 2);
    // The write port still records what arrives at it.
    assert_eq!(
        cpu.component("pc").unwrap().input("in").unwrap().accumulated_latency(),
        2
    );
}

// ============================================================================
// Critical Path
// ============================================================================

#[test]
fn test_critical_path_backtracks_from_maximum() {
    let topology = TopologyBuilder::new()
        .component_with_latency("a", adder(32), 2)
        .component_with_latency("b", adder(32), 3)
        .component_with_latency("c", adder(32), 1)
        .component_with_latency("aside", adder(32), 1)
        .wire("a", "out", "b", "in1")
        .wire("b", "out", "c", "in1")
        .wire("aside", "out", "c", "in2")
        .build()
        .unwrap();
    let mut cpu = topology.assemble().unwrap();
    cpu.compute_performance();

    let path = cpu.critical_path();
    assert!(path.contains(&("a".to_string(), "out".to_string())));
    assert!(path.contains(&("b".to_string(), "out".to_string())));
    assert!(path.contains(&("c".to_string(), "out".to_string())));
    // The fast side branch is off the path.
    assert!(!path.contains(&("aside".to_string(), "out".to_string())));

    assert!(cpu.component("b").unwrap().output("out").unwrap().in_critical_path());
    assert!(!cpu.component("aside").unwrap().output("out").unwrap().in_critical_path());
}

#[test]
fn test_reset_performance_clears_figures_and_marks() {
    let topology = TopologyBuilder::new()
        .component_with_latency("a", adder(32), 2)
        .component_with_latency("b", adder(32), 3)
        .wire("a", "out", "b", "in1")
        .build()
        .unwrap();
    let mut cpu = topology.assemble().unwrap();
    cpu.compute_performance();
    assert!(!cpu.critical_path().is_empty());

    cpu.reset_performance();
    assert_eq!(cpu.max_accumulated_latency(), 0);
    assert!(cpu.critical_path().is_empty());
    assert_eq!(cpu.component("b").unwrap().input("in1").unwrap().accumulated_latency(), 0);
}

// ============================================================================
// Instruction-Dependent Accumulation
// ============================================================================

fn mux_topology(instruction_dependent: bool) -> datapath::Cpu {
    // A slow and a fast branch joined by a mux whose selector picks the
    // fast one.
    TopologyBuilder::new()
        .instruction_dependent(instruction_dependent)
        .component_with_latency("slow", adder(32), 10)
        .component_with_latency("fast", adder(32), 1)
        .component("pick2", constant(1, 1))
        .component("mux", ComponentKind::Mux(Mux { width: 32, inputs: 2 }))
        .wire("slow", "out", "mux", "in1")
        .wire("fast", "out", "mux", "in2")
        .wire("pick2", "out", "mux", "sel")
        .build()
        .unwrap()
        .assemble()
        .unwrap()
}

#[test]
fn test_worst_case_mux_counts_every_input() {
    let mut cpu = mux_topology(false);
    cpu.compute_performance();
    assert_eq!(cpu.component("mux").unwrap().accumulated_latency(), 10);
    assert!(cpu.component("mux").unwrap().input("in1").unwrap().is_relevant());
}

#[test]
fn test_instruction_dependent_mux_counts_selected_input() {
    let mut cpu = mux_topology(true);
    cpu.compute_performance();

    let mux = cpu.component("mux").unwrap();
    assert_eq!(mux.accumulated_latency(), 1);
    assert!(!mux.input("in1").unwrap().is_relevant());
    assert!(mux.input("in2").unwrap().is_relevant());
    assert!(mux.input("sel").unwrap().is_relevant());

    // The unselected slow branch still dominates globally.
    assert_eq!(cpu.max_accumulated_latency(), 10);
    assert_eq!(cpu.critical_path(), vec![("slow".to_string(), "out".to_string())]);
}

#[test]
fn test_policy_can_be_flipped_between_passes() {
    let mut cpu = mux_topology(false);
    cpu.compute_performance();
    assert_eq!(cpu.component("mux").unwrap().accumulated_latency(), 10);

    cpu.set_instruction_dependent(true);
    cpu.compute_performance();
    assert_eq!(cpu.component("mux").unwrap().accumulated_latency(), 1);
}

// ============================================================================
// Control Path
// ============================================================================

#[test]
fn test_control_path_closure_and_persistence() {
    let signals = vec![ControlSignal { name: "sig".to_string(), width: 1 }];
    let topology = TopologyBuilder::new()
        .component("opcode", constant(6, 0))
        .component(
            "ctrl",
            ComponentKind::ControlUnit(ControlUnit {
                input_width: 6,
                signals,
                table: Default::default(),
            }),
        )
        .component("fan", ComponentKind::Fork(Fork { width: 1, ways: 2 }))
        .wire("opcode", "out", "ctrl", "in")
        .wire("ctrl", "sig", "fan", "in")
        .build()
        .unwrap();
    let mut cpu = topology.assemble().unwrap();

    // The control unit seeds the path; the fork is downstream of
    // nothing but control, so the closure tags it too.
    assert!(cpu.component("ctrl").unwrap().in_control_path());
    assert!(cpu.component("fan").unwrap().in_control_path());
    assert!(cpu.component("fan").unwrap().output("out1").unwrap().in_control_path());
    // The opcode source itself only feeds control, it is not control.
    assert!(!cpu.component("opcode").unwrap().in_control_path());

    // The tagging survives clocking and performance resets.
    cpu.step();
    cpu.compute_performance();
    cpu.reset_performance();
    assert!(cpu.component("fan").unwrap().in_control_path());
}

#[test]
fn test_explicit_control_seed() {
    let topology = TopologyBuilder::new()
        .component("plain", adder(32))
        .component("seeded", adder(32))
        .control()
        .build()
        .unwrap();
    let cpu = topology.assemble().unwrap();

    assert!(!cpu.component("plain").unwrap().in_control_path());
    assert!(cpu.component("seeded").unwrap().in_control_path());
    assert!(cpu.component("seeded").unwrap().input("in1").unwrap().in_control_path());
}
