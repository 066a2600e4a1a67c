use crate::error::{QuantizationError, Result};

use super::MAX_BIT_WIDTH;

/// Bit width and signedness of the integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantConfig {
    pub bit_width: u32,
    pub is_signed: bool,
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            bit_width: 8,
            is_signed: false,
        }
    }
}

impl QuantConfig {
    pub fn new(bit_width: u32, is_signed: bool) -> Self {
        Self {
            bit_width,
            is_signed,
        }
    }

    pub fn with_bit_width(mut self, bit_width: u32) -> Self {
        self.bit_width = bit_width;
        self
    }

    pub fn with_signed(mut self, is_signed: bool) -> Self {
        self.is_signed = is_signed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bit_width == 0 || self.bit_width > MAX_BIT_WIDTH {
            return Err(QuantizationError::UnsupportedBitWidth {
                bit_width: self.bit_width,
                max: MAX_BIT_WIDTH,
            });
        }
        Ok(())
    }

    /// `2^(bit_width - 1)` for signed codes, `0` otherwise and for configs that fail
    /// [`QuantConfig::validate`].
    pub fn signed_offset(&self) -> i64 {
        if self.is_signed && self.validate().is_ok() {
            1_i64 << (self.bit_width - 1)
        } else {
            0
        }
    }
}
