use std::ops::Range;

use rand::Rng;

use crate::error::{QuantizationError, Result};

/// Owned, row-major buffer with an explicit shape.
///
/// `data.len()` always equals the product of `shape`; an empty shape is a scalar.
#[derive(PartialEq, Debug, Clone)]
pub struct Tensor<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

impl<T> Tensor<T> {
    pub fn from_vec(data: Vec<T>, shape: Vec<usize>) -> Result<Self> {
        let expected = element_count(&shape);
        if data.len() != expected {
            return Err(QuantizationError::ElementCountMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Applies `f` element-wise, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Tensor<U> {
        Tensor {
            data: self.data.iter().map(f).collect(),
            shape: self.shape.clone(),
        }
    }
}

impl<T> From<Vec<T>> for Tensor<T> {
    fn from(data: Vec<T>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }
}

impl Tensor<f64> {
    pub fn random(shape: Vec<usize>, range: Range<f64>) -> Self {
        let size = element_count(&shape);
        let mut data = Vec::<f64>::with_capacity(size);

        let mut rng = rand::rng();

        for _ in 0..size {
            data.push(rng.random_range(range.clone()));
        }

        Tensor { data, shape }
    }

    /// Returns `None` for an empty tensor.
    pub fn min_and_max(&self) -> Option<(f64, f64)> {
        let first = *self.data.first()?;
        Some(
            self.data
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Index and value of the first NaN or infinite element.
    pub fn first_non_finite(&self) -> Option<(usize, f64)> {
        self.data
            .iter()
            .copied()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
    }

    pub fn mean_squared_error(&self, other: &Self) -> Result<f64> {
        self.check_same_shape(other)?;
        if self.is_empty() {
            return Ok(0.0);
        }
        let n = self.len() as f64;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&x, &y)| (x - y).powi(2))
            .sum::<f64>()
            / n)
    }

    pub fn max_abs_error(&self, other: &Self) -> Result<f64> {
        self.check_same_shape(other)?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&x, &y)| (x - y).abs())
            .fold(0.0, f64::max))
    }

    fn check_same_shape(&self, other: &Self) -> Result<()> {
        if self.shape != other.shape {
            return Err(QuantizationError::ShapeMismatch {
                left: self.shape.clone(),
                right: other.shape.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_element_count() {
        let err = Tensor::from_vec(vec![1.0, 2.0, 3.0], vec![2, 2]).unwrap_err();
        assert_eq!(
            err,
            QuantizationError::ElementCountMismatch {
                shape: vec![2, 2],
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn scalar_shape_holds_one_element() {
        let scalar = Tensor::from_vec(vec![4.5], vec![]).unwrap();
        assert_eq!(scalar.len(), 1);
        assert!(scalar.shape().is_empty());
    }

    #[test]
    fn map_keeps_shape() {
        let t = Tensor::from_vec(vec![1.0, -2.0, 3.0, -4.0], vec![2, 2]).unwrap();
        let signs = t.map(|&v| v > 0.0);
        assert_eq!(signs.shape(), &[2, 2]);
        assert_eq!(signs.data(), &[true, false, true, false]);
    }

    #[test]
    fn min_and_max_of_mixed_values() {
        let t = Tensor::from(vec![3.0, -7.5, 0.25, 12.0]);
        assert_eq!(t.min_and_max(), Some((-7.5, 12.0)));
        assert_eq!(Tensor::<f64>::from(vec![]).min_and_max(), None);
    }

    #[test]
    fn first_non_finite_reports_index() {
        let t = Tensor::from(vec![1.0, 2.0, f64::INFINITY, f64::NAN]);
        assert_eq!(t.first_non_finite(), Some((2, f64::INFINITY)));
        assert_eq!(Tensor::from(vec![1.0]).first_non_finite(), None);
    }

    #[test]
    fn random_stays_in_range() {
        let t = Tensor::random(vec![8, 8], -1.0..1.0);
        assert_eq!(t.len(), 64);
        assert!(t.data().iter().all(|&v| (-1.0..1.0).contains(&v)));
    }

    #[test]
    fn error_metrics() {
        let a = Tensor::from(vec![1.0, 2.0, 3.0, 4.0]);
        let b = Tensor::from(vec![1.0, 2.5, 3.0, 3.0]);
        assert_eq!(a.mean_squared_error(&b).unwrap(), (0.25 + 1.0) / 4.0);
        assert_eq!(a.max_abs_error(&b).unwrap(), 1.0);
    }

    #[test]
    fn error_metrics_reject_shape_mismatch() {
        let a = Tensor::from(vec![1.0, 2.0]);
        let b = Tensor::from_vec(vec![1.0, 2.0], vec![2, 1]).unwrap();
        assert!(matches!(
            a.mean_squared_error(&b),
            Err(QuantizationError::ShapeMismatch { .. })
        ));
    }
}
