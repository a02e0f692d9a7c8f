//! Layout primitives for the graphical datapath.
//!
//! The engine computes static component and port positions as read-only
//! facts; an external renderer consumes them. Nothing here draws.

use serde::{Deserialize, Serialize};

/// An x,y position on the datapath canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    /// Creates a new dimension.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
