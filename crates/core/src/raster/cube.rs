//! Multi-band spectral cube

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster};
use ndarray::{s, Array2, Array3, ArrayView2};

/// A multi-band image cube stored band-interleaved-by-pixel.
///
/// The backing array has shape `(lines, samples, bands)` so that the
/// spectrum of one pixel is a contiguous slice, which is what the
/// border statistics of the merge phase read pixel after pixel.
#[derive(Debug, Clone)]
pub struct SpectralCube {
    data: Array3<f64>,
    transform: GeoTransform,
}

impl SpectralCube {
    /// Create a zero-filled cube
    pub fn new(lines: usize, samples: usize, bands: usize) -> Self {
        Self::from_array(Array3::zeros((lines, samples, bands)))
    }

    /// Create a cube from a `(lines, samples, bands)` array
    pub fn from_array(data: Array3<f64>) -> Self {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self {
            data,
            transform: GeoTransform::default(),
        }
    }

    /// Stack single-band rasters into a cube.
    ///
    /// All rasters must share the extent of the first one; its
    /// georeferencing is kept.
    pub fn from_bands(bands: &[Raster<f64>]) -> Result<Self> {
        let first = bands.first().ok_or_else(|| Error::InvalidParameter {
            name: "bands",
            value: "0".to_string(),
            reason: "a cube needs at least one band".to_string(),
        })?;
        let (lines, samples) = first.shape();

        let mut data = Array3::zeros((lines, samples, bands.len()));
        for (b, band) in bands.iter().enumerate() {
            if band.shape() != (lines, samples) {
                return Err(Error::SizeMismatch {
                    er: lines,
                    ec: samples,
                    ar: band.lines(),
                    ac: band.samples(),
                });
            }
            data.slice_mut(s![.., .., b]).assign(band.data());
        }

        let mut cube = Self::from_array(data);
        cube.transform = *first.transform();
        Ok(cube)
    }

    pub fn lines(&self) -> usize {
        self.data.dim().0
    }

    pub fn samples(&self) -> usize {
        self.data.dim().1
    }

    pub fn bands(&self) -> usize {
        self.data.dim().2
    }

    /// Spatial dimensions as (lines, samples)
    pub fn shape(&self) -> (usize, usize) {
        (self.lines(), self.samples())
    }

    /// Raw backing array, `(lines, samples, bands)`
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Strided view of one band
    pub fn band_view(&self, index: usize) -> Result<ArrayView2<'_, f64>> {
        self.check_band(index)?;
        Ok(self.data.slice(s![.., .., index]))
    }

    /// Copy one band out as a raster with the cube's georeferencing
    pub fn get_band(&self, index: usize) -> Result<Raster<f64>> {
        let band: Array2<f64> = self.band_view(index)?.to_owned();
        let mut raster = Raster::from_array(band);
        raster.set_transform(self.transform);
        Ok(raster)
    }

    /// Spectrum of the pixel at sample `x`, line `y`
    pub fn spectrum(&self, x: usize, y: usize) -> Result<&[f64]> {
        if y >= self.lines() || x >= self.samples() {
            return Err(Error::IndexOutOfBounds {
                row: y,
                col: x,
                rows: self.lines(),
                cols: self.samples(),
            });
        }
        self.data
            .slice(s![y, x, ..])
            .to_slice()
            .ok_or_else(|| Error::Other("cube spectrum is not contiguous".into()))
    }

    /// Evaluate a spectral distance between two pixels given as `(x, y)`
    pub fn distance<F>(&self, a: (usize, usize), b: (usize, usize), measure: F) -> Result<f64>
    where
        F: Fn(&[f64], &[f64]) -> f64,
    {
        Ok(measure(self.spectrum(a.0, a.1)?, self.spectrum(b.0, b.1)?))
    }

    fn check_band(&self, index: usize) -> Result<()> {
        if index >= self.bands() {
            return Err(Error::BandOutOfRange {
                band: index,
                bands: self.bands(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_band_cube() -> SpectralCube {
        let a = Raster::from_vec((0..6).map(f64::from).collect(), 2, 3).unwrap();
        let b = Raster::from_vec((10..16).map(f64::from).collect(), 2, 3).unwrap();
        SpectralCube::from_bands(&[a, b]).unwrap()
    }

    #[test]
    fn test_stacked_extents() {
        let cube = two_band_cube();
        assert_eq!(cube.lines(), 2);
        assert_eq!(cube.samples(), 3);
        assert_eq!(cube.bands(), 2);
    }

    #[test]
    fn test_spectrum_is_per_pixel() {
        let cube = two_band_cube();
        // x = 2, y = 1 -> flat index 5
        assert_eq!(cube.spectrum(2, 1).unwrap(), &[5.0, 15.0]);
        assert!(cube.spectrum(3, 0).is_err());
    }

    #[test]
    fn test_get_band_roundtrip() {
        let cube = two_band_cube();
        let band = cube.get_band(1).unwrap();
        assert_eq!(band.get(0, 1).unwrap(), 11.0);
        assert!(matches!(
            cube.get_band(2),
            Err(Error::BandOutOfRange { band: 2, bands: 2 })
        ));
    }

    #[test]
    fn test_from_bands_rejects_mismatched_extent() {
        let a: Raster<f64> = Raster::new(2, 3);
        let b: Raster<f64> = Raster::new(3, 2);
        assert!(matches!(
            SpectralCube::from_bands(&[a, b]),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_distance_uses_both_spectra() {
        let cube = two_band_cube();
        let d = cube
            .distance((0, 0), (1, 0), |a, b| (a[0] - b[0]).abs() + (a[1] - b[1]).abs())
            .unwrap();
        assert_eq!(d, 2.0);
    }
}
