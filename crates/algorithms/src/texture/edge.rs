//! Sobel edge detection

use crate::maybe_rayon::*;
use hyperseg_core::raster::Raster;
use hyperseg_core::{Error, Result};

/// Sobel gradient magnitude `G = sqrt(Gx² + Gy²)`.
///
/// The outermost ring of cells has no full 3x3 window and is set to NaN,
/// which the thresholding step treats as smooth. NaN inputs inside a
/// window are read as 0.
pub fn sobel_edge(raster: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = raster.shape();
    if rows < 3 || cols < 3 {
        return Err(Error::Algorithm("Sobel requires at least 3x3 raster".into()));
    }
    let src = raster.data();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            if row == 0 || row == rows - 1 {
                return row_data;
            }

            let z = |r: usize, c: usize| {
                let v = src[(r, c)];
                if v.is_nan() { 0.0 } else { v }
            };

            for (col, out) in row_data.iter_mut().enumerate().take(cols - 1).skip(1) {
                let gx = (z(row - 1, col + 1) + 2.0 * z(row, col + 1) + z(row + 1, col + 1))
                    - (z(row - 1, col - 1) + 2.0 * z(row, col - 1) + z(row + 1, col - 1));
                let gy = (z(row + 1, col - 1) + 2.0 * z(row + 1, col) + z(row + 1, col + 1))
                    - (z(row - 1, col - 1) + 2.0 * z(row - 1, col) + z(row - 1, col + 1));
                *out = gx.hypot(gy);
            }
            row_data
        })
        .collect();

    let mut output = raster.with_data(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}
