pub mod error;
pub mod quantization;
pub mod tensor;

pub use error::{QuantizationError, Result};
pub use quantization::{
    AffineQuantizer, QuantConfig, QuantizedArray, Quantizer, RangeKind, RoundTripError,
};
pub use tensor::Tensor;
