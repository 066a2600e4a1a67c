use log::debug;

use super::{QuantConfig, Quantizer, MAX_BIT_WIDTH, MAX_ZERO_POINT, STABILITY_EPS};
use crate::error::{QuantizationError, Result};
use crate::tensor::Tensor;

/// Which branch of parameter derivation produced an [`AffineQuantizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// Every value is within `STABILITY_EPS` of zero.
    Zero,
    /// A single repeated non-zero value.
    Constant,
    General,
}

/// Affine map between real values and `bit_width`-bit codes:
/// `code = round(real / scale + zero_point)`, `real = scale * (code - zero_point)`.
///
/// Codes live in `[-offset, 2^bit_width - 1 - offset]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineQuantizer {
    pub scale: f64,
    pub zero_point: i64,
    pub offset: i64,
    pub bit_width: u32,
}

/// `2^bit_width - 1`, the number of steps between the smallest and largest code.
fn code_span(bit_width: u32) -> i64 {
    (1_i64 << bit_width.min(MAX_BIT_WIDTH)) - 1
}

/// Scale for a non-degenerate range. Equal bounds never reach here once the
/// `STABILITY_EPS` check has run; the unit scale keeps division well defined anyway.
///
/// Bounds near `±f64::MAX` overflow `rmax - rmin`; each bound is then divided first.
fn general_scale(rmin: f64, rmax: f64, span: f64) -> f64 {
    if rmax == rmin {
        return 1.0;
    }
    let range = rmax - rmin;
    if range.is_finite() {
        range / span
    } else {
        rmax / span - rmin / span
    }
}

/// Unrounded zero point placing `rmin` on code `-offset` and `rmax` on the top code.
fn general_zero_point(rmin: f64, rmax: f64, span: f64, offset: f64, scale: f64) -> f64 {
    let zero_point = (rmax * -offset - rmin * (span - offset)) / (rmax - rmin);
    if zero_point.is_finite() {
        zero_point
    } else {
        -offset - rmin / scale
    }
}

impl AffineQuantizer {
    /// Builds a quantizer from externally calibrated parameters.
    pub fn new(config: QuantConfig, scale: f64, zero_point: i64) -> Result<Self> {
        config.validate()?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(QuantizationError::InvalidArgument(format!(
                "scale must be positive and finite, got {scale}"
            )));
        }
        if zero_point.unsigned_abs() > MAX_ZERO_POINT as u64 {
            return Err(QuantizationError::InvalidArgument(format!(
                "zero_point {zero_point} exceeds ±{MAX_ZERO_POINT}"
            )));
        }
        Ok(AffineQuantizer {
            scale,
            zero_point,
            offset: config.signed_offset(),
            bit_width: config.bit_width,
        })
    }

    /// Derives scale, zero point and offset so that `values` span the code range.
    ///
    /// A (numerically) constant input drops the signed offset. A constant near zero gets a
    /// unit scale; any other constant is mapped onto an extreme code with `scale = |value| / span`.
    ///
    /// Fails with `UnsupportedRange` when the scale is not finite or the zero point
    /// exceeds [`MAX_ZERO_POINT`], e.g. a narrow range far from zero at a wide bit width.
    pub fn derive(config: QuantConfig, values: &Tensor<f64>) -> Result<(Self, RangeKind)> {
        config.validate()?;
        if let Some((index, value)) = values.first_non_finite() {
            return Err(QuantizationError::NonFiniteValue { index, value });
        }
        let (rmin, rmax) = values.min_and_max().ok_or(QuantizationError::EmptyValues)?;

        let span = code_span(config.bit_width);
        let span_f = span as f64;

        let (quantizer, kind) = if rmax - rmin < STABILITY_EPS {
            if rmax.abs() < STABILITY_EPS {
                let quantizer = AffineQuantizer {
                    scale: 1.0,
                    zero_point: (-rmin).round_ties_even() as i64,
                    offset: 0,
                    bit_width: config.bit_width,
                };
                (quantizer, RangeKind::Zero)
            } else {
                // Positive constants land on the top code, negative ones on code 0.
                let zero_point = if rmax > 0.0 { 0 } else { span };
                let quantizer = AffineQuantizer {
                    scale: rmax.abs() / span_f,
                    zero_point,
                    offset: 0,
                    bit_width: config.bit_width,
                };
                (quantizer, RangeKind::Constant)
            }
        } else {
            let unsupported = QuantizationError::UnsupportedRange {
                min: rmin,
                max: rmax,
                bit_width: config.bit_width,
            };
            let offset = config.signed_offset();
            let scale = general_scale(rmin, rmax, span_f);
            if !scale.is_finite() {
                return Err(unsupported);
            }
            let zero_point =
                general_zero_point(rmin, rmax, span_f, offset as f64, scale).round_ties_even();
            if zero_point.is_nan() || zero_point.abs() > MAX_ZERO_POINT as f64 {
                return Err(unsupported);
            }
            let quantizer = AffineQuantizer {
                scale,
                zero_point: zero_point as i64,
                offset,
                bit_width: config.bit_width,
            };
            (quantizer, RangeKind::General)
        };

        if kind != RangeKind::General {
            debug!("degenerate range [{rmin}, {rmax}] handled as {kind:?} with zero offset");
        }
        debug!(
            "derived {}-bit quantizer: scale={} zero_point={} offset={}",
            quantizer.bit_width, quantizer.scale, quantizer.zero_point, quantizer.offset
        );

        Ok((quantizer, kind))
    }

    pub fn qmin(&self) -> i64 {
        -self.offset
    }

    pub fn qmax(&self) -> i64 {
        code_span(self.bit_width) - self.offset
    }

    pub fn quantize_tensor(&self, values: &Tensor<f64>) -> Tensor<i64> {
        values.map(|&v| self.quantize(v))
    }

    pub fn dequantize_tensor(&self, codes: &Tensor<i64>) -> Tensor<f64> {
        codes.map(|&q| self.dequantize(q))
    }

    /// Fails on the first code outside `[qmin, qmax]`.
    pub fn check_codes(&self, codes: &Tensor<i64>) -> Result<()> {
        let (min, max) = (self.qmin(), self.qmax());
        match codes
            .data()
            .iter()
            .enumerate()
            .find(|&(_, &code)| code < min || code > max)
        {
            Some((index, &code)) => Err(QuantizationError::CodeOutOfRange {
                index,
                code,
                min,
                max,
            }),
            None => Ok(()),
        }
    }
}

impl Quantizer for AffineQuantizer {
    /// Rounds half to even, then clips into the code range.
    fn quantize(&self, real_val: f64) -> i64 {
        (real_val / self.scale + self.zero_point as f64)
            .round_ties_even()
            .clamp(self.qmin() as f64, self.qmax() as f64) as i64
    }

    fn dequantize(&self, q_val: i64) -> f64 {
        self.scale * (q_val as f64 - self.zero_point as f64)
    }
}
