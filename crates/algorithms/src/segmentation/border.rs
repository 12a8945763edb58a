//! Spectral dissimilarity along the edge shared by two regions

use super::adjacency::Side;
use super::cluster::MergeCriterion;
use super::quadtree::Rect;
use crate::imagery::SpectralDistance;
use hyperseg_core::{Error, Result, SpectralCube};
use std::fmt;
use std::str::FromStr;

/// How per-pixel distances across a border are reduced to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStatistic {
    #[default]
    Max,
    Mean,
}

impl fmt::Display for BorderStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorderStatistic::Max => write!(f, "max"),
            BorderStatistic::Mean => write!(f, "mean"),
        }
    }
}

impl FromStr for BorderStatistic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "max" | "maximum" => Ok(BorderStatistic::Max),
            "mean" | "average" => Ok(BorderStatistic::Mean),
            _ => Err(Error::InvalidParameter {
                name: "statistic",
                value: s.to_string(),
                reason: "expected max or mean".to_string(),
            }),
        }
    }
}

/// Aggregate `distance` over every facing pixel pair of the edge shared
/// by `a` and `b`.
///
/// Pixels are passed as `(x, y)`, the first from `a` and the second from
/// `b`. Rectangles that do not share an edge yield
/// [`Error::RegionsNotAdjacent`]. A NaN distance anywhere on the border
/// makes the statistic NaN, which no merge level accepts.
pub fn border_statistic<F>(a: &Rect, b: &Rect, statistic: BorderStatistic, mut distance: F) -> Result<f64>
where
    F: FnMut((usize, usize), (usize, usize)) -> Result<f64>,
{
    let border = a.border_with(b).ok_or(Error::RegionsNotAdjacent {
        first: a.bounds(),
        second: b.bounds(),
    })?;

    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for t in border.start..border.end {
        let (pa, pb) = match border.side {
            Side::Right => ((a.x1 - 1, t), (b.x0, t)),
            Side::Left => ((a.x0, t), (b.x1 - 1, t)),
            Side::Below => ((t, a.y1 - 1), (t, b.y0)),
            Side::Above => ((t, a.y0), (t, b.y1 - 1)),
        };
        let d = distance(pa, pb)?;
        if d.is_nan() {
            return Ok(f64::NAN);
        }
        max = max.max(d);
        sum += d;
    }

    Ok(match statistic {
        BorderStatistic::Max => max,
        BorderStatistic::Mean => sum / border.len() as f64,
    })
}

/// Merge two regions when their border statistic stays within
/// `merge_level`
#[derive(Debug, Clone, Copy)]
pub struct BorderCriterion<'a> {
    pub cube: &'a SpectralCube,
    pub measure: SpectralDistance,
    pub statistic: BorderStatistic,
    pub merge_level: f64,
}

impl<'a> BorderCriterion<'a> {
    pub fn new(cube: &'a SpectralCube, measure: SpectralDistance, statistic: BorderStatistic, merge_level: f64) -> Self {
        Self {
            cube,
            measure,
            statistic,
            merge_level,
        }
    }

    pub fn evaluate(&self, a: &Rect, b: &Rect) -> Result<f64> {
        border_statistic(a, b, self.statistic, |pa, pb| {
            self.cube.distance(pa, pb, |u, v| self.measure.measure(u, v))
        })
    }
}

impl MergeCriterion for BorderCriterion<'_> {
    fn can_merge(&self, a: &Rect, b: &Rect) -> Result<bool> {
        Ok(self.evaluate(a, b)? <= self.merge_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    /// 8x4 cube, 2 bands. Left half (x < 4) is [1, 2], right half is
    /// [2, 4]: same direction, different magnitude.
    fn two_block_cube() -> SpectralCube {
        let data = Array3::from_shape_fn((4, 8, 2), |(_, x, b)| {
            let scale = if x < 4 { 1.0 } else { 2.0 };
            scale * (b as f64 + 1.0)
        });
        SpectralCube::from_array(data)
    }

    #[test]
    fn test_parallel_spectra_have_zero_angle() {
        let cube = two_block_cube();
        let a = Rect::new(0, 4, 0, 4);
        let b = Rect::new(4, 8, 0, 4);
        let crit = BorderCriterion::new(&cube, SpectralDistance::SpectralAngle, BorderStatistic::Max, 0.0);
        assert_eq!(crit.evaluate(&a, &b).unwrap(), 0.0);
        assert!(crit.can_merge(&a, &b).unwrap());
        assert!(crit.can_merge(&b, &a).unwrap());
    }

    #[test]
    fn test_euclidean_border() {
        let cube = two_block_cube();
        let a = Rect::new(0, 4, 0, 4);
        let b = Rect::new(4, 8, 0, 4);
        let crit = BorderCriterion::new(&cube, SpectralDistance::Euclidean, BorderStatistic::Mean, 2.0);
        assert_relative_eq!(crit.evaluate(&a, &b).unwrap(), 5f64.sqrt(), epsilon = 1e-12);
        assert!(!crit.can_merge(&a, &b).unwrap());
    }

    #[test]
    fn test_pixel_pairs_per_side() {
        let a = Rect::new(2, 4, 2, 4);
        let mut pairs = Vec::new();
        let mut record = |pa: (usize, usize), pb: (usize, usize)| -> Result<f64> {
            pairs.push((pa, pb));
            Ok(0.0)
        };
        border_statistic(&a, &Rect::new(4, 6, 3, 5), BorderStatistic::Max, &mut record).unwrap();
        border_statistic(&a, &Rect::new(0, 2, 2, 3), BorderStatistic::Max, &mut record).unwrap();
        border_statistic(&a, &Rect::new(2, 3, 4, 6), BorderStatistic::Max, &mut record).unwrap();
        border_statistic(&a, &Rect::new(3, 5, 0, 2), BorderStatistic::Max, &mut record).unwrap();
        assert_eq!(
            pairs,
            vec![
                ((3, 3), (4, 3)),
                ((2, 2), (1, 2)),
                ((2, 3), (2, 4)),
                ((3, 2), (3, 1)),
            ]
        );
    }

    #[test]
    fn test_max_and_mean() {
        let a = Rect::new(0, 1, 0, 3);
        let b = Rect::new(1, 2, 0, 3);
        let by_row = |_: (usize, usize), pb: (usize, usize)| -> Result<f64> { Ok(pb.1 as f64) };
        assert_eq!(border_statistic(&a, &b, BorderStatistic::Max, by_row).unwrap(), 2.0);
        assert_eq!(border_statistic(&a, &b, BorderStatistic::Mean, by_row).unwrap(), 1.0);
    }

    #[test]
    fn test_nodata_border_refuses_merge() {
        // Column x = 3 is nodata on every band.
        let mut data = two_block_cube().data().clone();
        for y in 0..4 {
            for b in 0..2 {
                data[(y, 3, b)] = f64::NAN;
            }
        }
        let cube = SpectralCube::from_array(data);
        let a = Rect::new(0, 4, 0, 4);
        let b = Rect::new(4, 8, 0, 4);
        for statistic in [BorderStatistic::Max, BorderStatistic::Mean] {
            let crit = BorderCriterion::new(&cube, SpectralDistance::SpectralAngle, statistic, f64::MAX);
            assert!(crit.evaluate(&a, &b).unwrap().is_nan(), "{}", statistic);
            assert!(!crit.can_merge(&a, &b).unwrap(), "{}", statistic);
        }
    }

    #[test]
    fn test_single_nan_distance_poisons_max() {
        let a = Rect::new(0, 1, 0, 3);
        let b = Rect::new(1, 2, 0, 3);
        let one_nan = |_: (usize, usize), pb: (usize, usize)| -> Result<f64> {
            Ok(if pb.1 == 1 { f64::NAN } else { 0.5 })
        };
        assert!(border_statistic(&a, &b, BorderStatistic::Max, one_nan).unwrap().is_nan());
        assert!(border_statistic(&a, &b, BorderStatistic::Mean, one_nan).unwrap().is_nan());
    }

    #[test]
    fn test_not_adjacent() {
        let cube = two_block_cube();
        let crit = BorderCriterion::new(&cube, SpectralDistance::SpectralAngle, BorderStatistic::Max, 1.0);
        let a = Rect::new(0, 2, 0, 2);
        let corner = Rect::new(2, 4, 2, 4);
        let far = Rect::new(6, 8, 0, 2);
        for b in [corner, far] {
            assert!(matches!(crit.can_merge(&a, &b), Err(Error::RegionsNotAdjacent { .. })));
        }
    }

    #[test]
    fn test_distance_errors_propagate() {
        let a = Rect::new(0, 1, 0, 1);
        let b = Rect::new(1, 2, 0, 1);
        let res = border_statistic(&a, &b, BorderStatistic::Max, |_, _| {
            Err(Error::Algorithm("bad pixel".into()))
        });
        assert!(res.is_err());
    }

    #[test]
    fn test_statistic_from_str() {
        assert_eq!("max".parse::<BorderStatistic>().unwrap(), BorderStatistic::Max);
        assert_eq!("Mean".parse::<BorderStatistic>().unwrap(), BorderStatistic::Mean);
        assert!("median".parse::<BorderStatistic>().is_err());
    }
}
