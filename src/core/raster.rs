//! Fixed-shape rasters and the validity mask that travels with the working grid.
//!
//! A [`Raster`] wraps a row-major `ndarray::Array2` (`height` rows by `width`
//! columns). Stages change the element type and values of a raster but never
//! its shape.
use std::fmt;

use ndarray::Array2;
use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Shape {
    pub width: usize,
    pub height: usize,
}

impl Shape {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Element count, or `None` when `width * height` overflows `usize`.
    pub fn checked_len(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Element count, saturating at `usize::MAX`. Shapes accepted by
    /// `PipelineConfig` or backed by an allocated raster never saturate.
    pub fn len(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(rows, cols)` as used by `ndarray`.
    pub fn dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Floating-point element type of the log-domain working raster.
pub trait WorkingFloat:
    Float + FromPrimitive + From<u16> + Into<f64> + fmt::Debug + Send + Sync + 'static
{
}

impl WorkingFloat for f32 {}
impl WorkingFloat for f64 {}

/// Raw sensor input.
pub type SourceRaster = Raster<u16>;

#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    data: Array2<T>,
}

impl<T> Raster<T> {
    /// Build a raster from row-major samples.
    pub fn from_vec(shape: Shape, data: Vec<T>) -> Result<Self> {
        let len = data.len();
        Array2::from_shape_vec(shape.dim(), data)
            .map(|data| Self { data })
            .map_err(|_| Error::InvalidShape { shape, len })
    }

    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    pub fn shape(&self) -> Shape {
        let (rows, cols) = self.data.dim();
        Shape::new(cols, rows)
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_array(&self) -> &Array2<T> {
        &self.data
    }

    pub(crate) fn as_array_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&T> {
        self.data.get((row, col))
    }

    /// Row-major contiguous view; rasters built by this crate are always contiguous.
    pub fn as_slice(&self) -> Option<&[T]> {
        self.data.as_slice()
    }

    /// Row-major copy of the samples.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.iter().cloned().collect()
    }
}

impl<T: Clone> Raster<T> {
    pub fn from_elem(shape: Shape, value: T) -> Self {
        Self {
            data: Array2::from_elem(shape.dim(), value),
        }
    }
}

/// True where the source sample is eligible for the log transform (value > 0).
#[derive(Clone, Debug, PartialEq)]
pub struct ValidityMask {
    valid: Array2<bool>,
}

impl ValidityMask {
    pub fn from_source(source: &SourceRaster) -> Self {
        Self {
            valid: source.as_array().mapv(|v| v > 0),
        }
    }

    pub fn shape(&self) -> Shape {
        let (rows, cols) = self.valid.dim();
        Shape::new(cols, rows)
    }

    pub fn is_valid(&self, col: usize, row: usize) -> bool {
        self.valid.get((row, col)).copied().unwrap_or(false)
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.valid.len() - self.valid_count()
    }

    pub fn as_array(&self) -> &Array2<bool> {
        &self.valid
    }

    /// Clear cells whose working value became NaN. Returns how many cells were
    /// newly invalidated. The mask only ever narrows.
    pub fn narrow<W: WorkingFloat>(&mut self, working: &Raster<W>) -> usize {
        let mut narrowed = 0usize;
        ndarray::Zip::from(&mut self.valid)
            .and(working.as_array())
            .for_each(|valid, value| {
                if *valid && value.is_nan() {
                    *valid = false;
                    narrowed += 1;
                }
            });
        narrowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Raster::from_vec(Shape::new(3, 2), vec![0u16; 5]).unwrap_err();
        assert!(matches!(err, Error::InvalidShape { len: 5, .. }));
    }

    #[test]
    fn shape_is_width_by_height() {
        let raster = Raster::from_vec(Shape::new(3, 2), vec![1u16, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.get(2, 1), Some(&6));
        assert_eq!(raster.get(0, 1), Some(&4));
    }

    #[test]
    fn oversized_shape_len_does_not_overflow() {
        let shape = Shape::new(usize::MAX, 2);
        assert_eq!(shape.checked_len(), None);
        assert_eq!(shape.len(), usize::MAX);
        assert_eq!(Shape::new(3, 2).checked_len(), Some(6));

        let err = Raster::from_vec(shape, vec![0u16; 4]).unwrap_err();
        assert!(matches!(err, Error::InvalidShape { len: 4, .. }));
    }

    #[test]
    fn mask_marks_zero_samples_invalid() {
        let source = Raster::from_vec(Shape::new(2, 2), vec![0u16, 7, 1, 0]).unwrap();
        let mask = ValidityMask::from_source(&source);
        assert!(!mask.is_valid(0, 0));
        assert!(mask.is_valid(1, 0));
        assert!(mask.is_valid(0, 1));
        assert_eq!(mask.invalid_count(), 2);
    }

    #[test]
    fn mask_only_narrows() {
        let source = Raster::from_vec(Shape::new(3, 1), vec![0u16, 5, 5]).unwrap();
        let mut mask = ValidityMask::from_source(&source);
        let working = Raster::from_vec(Shape::new(3, 1), vec![1.0f64, f64::NAN, 2.0]).unwrap();
        assert_eq!(mask.narrow(&working), 1);
        assert!(!mask.is_valid(0, 0));
        assert!(!mask.is_valid(1, 0));
        assert!(mask.is_valid(2, 0));
    }
}
