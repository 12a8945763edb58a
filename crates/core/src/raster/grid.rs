//! Single-band raster grid

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::{Array2, ArrayView2, ArrayViewMut2};

/// A georeferenced single-band raster.
///
/// Cells are stored row-major as `(line, sample)`. Edge maps, boolean
/// roughness masks and label images all use this type with different
/// element types.
///
/// # Example
///
/// ```ignore
/// use hyperseg_core::Raster;
///
/// let mut mask: Raster<u8> = Raster::new(64, 64);
/// mask.set(10, 20, 1)?;
/// assert_eq!(mask.get(10, 20)?, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
    transform: GeoTransform,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(lines: usize, samples: usize) -> Self {
        Self::from_array(Array2::zeros((lines, samples)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(lines: usize, samples: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((lines, samples), value))
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, lines: usize, samples: usize) -> Result<Self> {
        if data.len() != lines * samples {
            return Err(Error::InvalidDimensions { samples, lines });
        }
        let array = Array2::from_shape_vec((lines, samples), data)
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Create a raster of another element type sharing this raster's
    /// extent and georeferencing, filled with zeros
    pub fn with_same_meta<U: RasterElement>(&self) -> Raster<U> {
        Raster {
            data: Array2::zeros(self.data.dim()),
            transform: self.transform,
            nodata: None,
        }
    }

    /// Replace the cell data, keeping the metadata. The new data must
    /// have the same shape.
    pub fn with_data<U: RasterElement>(&self, data: Vec<U>) -> Result<Raster<U>> {
        let (lines, samples) = self.shape();
        let mut out = Raster::from_vec(data, lines, samples)?;
        out.transform = self.transform;
        Ok(out)
    }

    /// Number of lines (rows)
    pub fn lines(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples (columns)
    pub fn samples(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (lines, samples)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.lines(),
                cols: self.samples(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.data.nrows(),
                cols: self.data.ncols(),
            }),
        }
    }

    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, T> {
        self.data.view_mut()
    }

    /// Raw backing array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Check if a value is no-data for this raster
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.samples(), self.lines())
    }

    /// Min, max and mean over valid cells
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter().filter(|v| !self.is_nodata(**v)) {
            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }
            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        RasterStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f32> = Raster::new(100, 200);
        assert_eq!(raster.lines(), 100);
        assert_eq!(raster.samples(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut raster: Raster<u8> = Raster::new(4, 4);
        assert!(raster.set(4, 0, 1).is_err());
        assert!(matches!(
            raster.get(0, 9),
            Err(Error::IndexOutOfBounds { col: 9, .. })
        ));
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let result = Raster::<f64>::from_vec(vec![0.0; 5], 2, 3);
        assert!(matches!(result, Err(Error::InvalidDimensions { samples: 3, lines: 2 })));
    }

    #[test]
    fn test_with_data_keeps_transform() {
        let mut edges: Raster<f64> = Raster::new(2, 2);
        edges.set_transform(GeoTransform::new(10.0, 20.0, 2.0, -2.0));
        let mask = edges.with_data(vec![0u8, 1, 1, 0]).unwrap();
        assert_eq!(mask.transform(), edges.transform());
        assert_eq!(mask.get(0, 1).unwrap(), 1);
    }

    #[test]
    fn test_statistics_skip_nodata() {
        let mut raster = Raster::from_vec(vec![1.0, 2.0, f64::NAN, 5.0], 2, 2).unwrap();
        raster.set_nodata(Some(5.0));
        let stats = raster.statistics();
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(2.0));
        assert_eq!(stats.valid_count, 2);
        assert_eq!(stats.nodata_count, 2);
    }
}
