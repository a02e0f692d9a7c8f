//! Fixed-width bit-vector values.
//!
//! [`Data`] is the value held by every port: an integer together with a
//! declared bit width. Assignment always truncates to the declared
//! width, so a `Data` can never hold a value that is not representable
//! in its width.

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Maximum supported bit width of a port value.
pub const MAX_SIZE: u8 = 32;

/// A fixed-width bit-vector value.
///
/// # Example
///
/// ```
/// use datapath::data::Data;
///
/// let mut d = Data::new(4, 0xFF); // truncated to 4 bits
/// assert_eq!(d.value(), 0xF);
///
/// d.set_value(0b0101);
/// assert_eq!(d.value(), 5);
/// assert_eq!(d.to_binary(), "0101");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    size: u8,
    value: Value,
}

impl Data {
    /// Creates a new value with the given bit width.
    ///
    /// The width is clamped to `1..=32` and `value` is truncated to it.
    pub fn new(size: u8, value: Value) -> Self {
        let size = size.clamp(1, MAX_SIZE);
        let mut data = Self { size, value: 0 };
        data.set_value(value);
        data
    }

    /// Creates a zero value with the given bit width.
    pub fn zero(size: u8) -> Self {
        Self::new(size, 0)
    }

    /// Returns the bit width.
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Returns the current (unsigned) value.
    pub fn value(&self) -> Value {
        self.value
    }

    /// Returns the bit mask for this width.
    pub fn mask(&self) -> Value {
        if self.size >= MAX_SIZE {
            Value::MAX
        } else {
            (1 << self.size) - 1
        }
    }

    /// Sets the value, truncating to the declared width.
    ///
    /// Returns `true` if the stored value changed.
    pub fn set_value(&mut self, value: Value) -> bool {
        let masked = value & self.mask();
        let changed = masked != self.value;
        self.value = masked;
        changed
    }

    /// Returns the value interpreted as a `size`-bit two's complement
    /// integer, sign-extended to 32 bits.
    pub fn signed_value(&self) -> i32 {
        let shift = 32 - u32::from(self.size);
        ((self.value << shift) as i32) >> shift
    }

    /// Formats the value as a zero-padded binary string.
    pub fn to_binary(&self) -> String {
        format!("{:0width$b}", self.value, width = self.size as usize)
    }

    /// Formats the value as a zero-padded hexadecimal string.
    pub fn to_hex(&self) -> String {
        let digits = (usize::from(self.size) + 3) / 4;
        format!("{:0width$X}", self.value, width = digits)
    }
}
