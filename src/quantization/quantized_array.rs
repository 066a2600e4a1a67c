use log::trace;

use super::{AffineQuantizer, QuantConfig, RangeKind};
use crate::error::{QuantizationError, Result};
use crate::tensor::Tensor;

/// Error of reconstructing real values from their codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTripError {
    pub mse: f64,
    pub max_abs: f64,
}

/// A real-valued tensor together with its quantized codes and the affine parameters
/// relating them.
///
/// Parameters are fixed after construction; replacing either side recomputes the other
/// with the existing parameters. Only [`QuantizedArray::recompute_parameters`] derives
/// new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedArray {
    config: QuantConfig,
    quantizer: AffineQuantizer,
    values: Tensor<f64>,
    qvalues: Tensor<i64>,
}

fn check_finite(values: &Tensor<f64>) -> Result<()> {
    match values.first_non_finite() {
        Some((index, value)) => Err(QuantizationError::NonFiniteValue { index, value }),
        None => Ok(()),
    }
}

impl QuantizedArray {
    /// Derives scale and zero point from `values` and quantizes them.
    pub fn from_real(config: QuantConfig, values: Tensor<f64>) -> Result<Self> {
        let (quantizer, _) = AffineQuantizer::derive(config, &values)?;
        let qvalues = quantizer.quantize_tensor(&values);
        Ok(QuantizedArray {
            config,
            quantizer,
            values,
            qvalues,
        })
    }

    /// Wraps codes that were quantized elsewhere and reconstructs their real values.
    ///
    /// `scale` and `zero_point` must both be given.
    pub fn from_quantized(
        config: QuantConfig,
        qvalues: Tensor<i64>,
        scale: Option<f64>,
        zero_point: Option<i64>,
    ) -> Result<Self> {
        let (Some(scale), Some(zero_point)) = (scale, zero_point) else {
            return Err(QuantizationError::InvalidArgument(
                "scale and zero_point are both required for already quantized values".to_string(),
            ));
        };
        let quantizer = AffineQuantizer::new(config, scale, zero_point)?;
        quantizer.check_codes(&qvalues)?;
        let values = quantizer.dequantize_tensor(&qvalues);
        Ok(QuantizedArray {
            config,
            quantizer,
            values,
            qvalues,
        })
    }

    /// Quantizes a new batch with this array's parameters, leaving `self` untouched.
    pub fn requantize_with(&self, values: Tensor<f64>) -> Result<Self> {
        check_finite(&values)?;
        let qvalues = self.quantizer.quantize_tensor(&values);
        Ok(QuantizedArray {
            config: self.config,
            quantizer: self.quantizer,
            values,
            qvalues,
        })
    }

    /// Recomputes the codes from the current real values with the existing parameters.
    pub fn quantize(&mut self) -> &Tensor<i64> {
        trace!("quantizing {} values", self.values.len());
        self.qvalues = self.quantizer.quantize_tensor(&self.values);
        &self.qvalues
    }

    /// Recomputes the real values from the current codes.
    pub fn dequantize(&mut self) -> &Tensor<f64> {
        trace!("dequantizing {} codes", self.qvalues.len());
        self.values = self.quantizer.dequantize_tensor(&self.qvalues);
        &self.values
    }

    pub fn replace_real_values(&mut self, values: Tensor<f64>) -> Result<&Tensor<i64>> {
        check_finite(&values)?;
        self.values = values;
        Ok(self.quantize())
    }

    pub fn replace_quantized_values(&mut self, qvalues: Tensor<i64>) -> Result<&Tensor<f64>> {
        self.quantizer.check_codes(&qvalues)?;
        self.qvalues = qvalues;
        Ok(self.dequantize())
    }

    /// Derives fresh parameters from the current real values and re-quantizes them.
    /// The signed offset is restored from the config before deriving.
    pub fn recompute_parameters(&mut self) -> Result<RangeKind> {
        let (quantizer, kind) = AffineQuantizer::derive(self.config, &self.values)?;
        self.quantizer = quantizer;
        self.quantize();
        Ok(kind)
    }

    pub fn round_trip_error(&self, original: &Tensor<f64>) -> Result<RoundTripError> {
        let reconstructed = self.quantizer.dequantize_tensor(&self.qvalues);
        Ok(RoundTripError {
            mse: original.mean_squared_error(&reconstructed)?,
            max_abs: original.max_abs_error(&reconstructed)?,
        })
    }

    pub fn values(&self) -> &Tensor<f64> {
        &self.values
    }

    pub fn qvalues(&self) -> &Tensor<i64> {
        &self.qvalues
    }

    pub fn quantizer(&self) -> &AffineQuantizer {
        &self.quantizer
    }

    pub fn scale(&self) -> f64 {
        self.quantizer.scale
    }

    pub fn zero_point(&self) -> i64 {
        self.quantizer.zero_point
    }

    pub fn offset(&self) -> i64 {
        self.quantizer.offset
    }

    pub fn bit_width(&self) -> u32 {
        self.config.bit_width
    }

    pub fn is_signed(&self) -> bool {
        self.config.is_signed
    }

    pub fn qmin(&self) -> i64 {
        self.quantizer.qmin()
    }

    pub fn qmax(&self) -> i64 {
        self.quantizer.qmax()
    }
}
