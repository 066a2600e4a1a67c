use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantizationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unsupported bit width {bit_width} (supported: 1..={max})")]
    UnsupportedBitWidth { bit_width: u32, max: u32 },
    #[error("Range [{min}, {max}] has no exact {bit_width}-bit affine parameters")]
    UnsupportedRange { min: f64, max: f64, bit_width: u32 },
    #[error("Cannot quantize an empty array")]
    EmptyValues,
    #[error("Non-finite value {value} at index {index}")]
    NonFiniteValue { index: usize, value: f64 },
    #[error("Code {code} at index {index} outside representable range [{min}, {max}]")]
    CodeOutOfRange {
        index: usize,
        code: i64,
        min: i64,
        max: i64,
    },
    #[error("Shape {shape:?} holds {expected} elements, got {actual}")]
    ElementCountMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },
}

pub type Result<T> = std::result::Result<T, QuantizationError>;
