//! Edge-map thresholding

use crate::maybe_rayon::*;
use hyperseg_core::raster::Raster;
use hyperseg_core::Result;

/// Mark cells whose edge intensity exceeds `level` as rough.
///
/// Returns a `u8` mask with 1 for `value > level` and 0 otherwise.
/// NaN and nodata cells are never rough.
pub fn threshold(edges: &Raster<f64>, level: f64) -> Result<Raster<u8>> {
    let (rows, cols) = edges.shape();
    let nodata = edges.nodata();
    let src = edges.data();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let v = src[(row, col)];
                    let valid = !v.is_nan() && nodata.map_or(true, |nd| v != nd);
                    u8::from(valid && v > level)
                })
                .collect::<Vec<u8>>()
        })
        .collect();

    edges.with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let edges = Raster::from_vec(vec![0.0, 0.5, 0.5001, 2.0], 2, 2).unwrap();
        let mask = threshold(&edges, 0.5).unwrap();
        assert_eq!(mask.data().iter().copied().collect::<Vec<_>>(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_threshold_ignores_nodata() {
        let mut edges = Raster::from_vec(vec![f64::NAN, -9999.0, 10.0, 10.0], 2, 2).unwrap();
        edges.set_nodata(Some(-9999.0));
        let mask = threshold(&edges, -1e9).unwrap();
        assert_eq!(mask.get(0, 0).unwrap(), 0);
        assert_eq!(mask.get(0, 1).unwrap(), 0);
        assert_eq!(mask.get(1, 0).unwrap(), 1);
    }
}
