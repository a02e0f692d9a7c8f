//! Core type definitions for the datapath engine.
//!
//! This module defines the fundamental scalar types used throughout the
//! component graph.

/// Raw value carried by a port, before width masking is applied.
///
/// Every port declares a bit width of at most 32 bits, so a `u32` holds
/// any representable value.
pub type Value = u32;

/// Propagation latency of a component or port, in abstract time units
/// (typically picoseconds in CPU definition files).
pub type Latency = u32;

/// Simulated clock cycle counter.
pub type Cycle = u64;

/// Index of a component in the CPU's insertion-ordered component arena.
pub type ComponentIndex = usize;

/// Index of a port within a component's input or output registry.
pub type PortIndex = usize;
