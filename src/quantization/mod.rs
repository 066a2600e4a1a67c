//! Affine (scale / zero-point) quantization of real-valued tensors.
//!
//! See <https://arxiv.org/abs/1712.05877>.

pub mod affine_quantizer;
pub mod config;
pub mod quantized_array;

pub use affine_quantizer::{AffineQuantizer, RangeKind};
pub use config::QuantConfig;
pub use quantized_array::{QuantizedArray, RoundTripError};

/// Ranges narrower than this are treated as a single repeated value.
pub const STABILITY_EPS: f64 = 1e-6;

/// Widest supported code.
pub const MAX_BIT_WIDTH: u32 = 32;

/// Largest zero-point magnitude accepted. Integers up to here, and the code offsets
/// added to them, are exact in `f64`.
pub const MAX_ZERO_POINT: i64 = 1 << 52;

pub trait Quantizer {
    fn quantize(&self, real_val: f64) -> i64;
    fn dequantize(&self, q_val: i64) -> f64;
}
