//! Adaptive splitting of quadtree nodes
//!
//! A node is subdivided while its rectangle is rough. Split points come
//! from [`split_1d`]; among the candidate two- and four-way partitions the
//! one whose smooth sub-rectangles cover the most area wins.

use super::quadtree::{NodeId, QuadTree, Quadrant, Rect};
use hyperseg_core::raster::Raster;
use ndarray::Array2;
use rand::Rng;

/// Decides whether a rectangle still needs subdividing
pub trait RoughnessTest {
    fn is_rough(&self, rect: &Rect) -> bool;
}

impl<F> RoughnessTest for F
where
    F: Fn(&Rect) -> bool,
{
    fn is_rough(&self, rect: &Rect) -> bool {
        self(rect)
    }
}

/// "Any pixel in the rectangle is rough" over a boolean mask.
///
/// Backed by a summed-area table so each query is four lookups.
#[derive(Debug, Clone)]
pub struct RoughMask {
    /// `(lines + 1) x (samples + 1)`, entry `(y, x)` counts rough pixels
    /// in `[0, x) x [0, y)`
    integral: Array2<u64>,
}

impl RoughMask {
    /// Nonzero mask cells count as rough
    pub fn new(mask: &Raster<u8>) -> Self {
        let (lines, samples) = mask.shape();
        let src = mask.data();
        let mut integral = Array2::<u64>::zeros((lines + 1, samples + 1));
        for y in 0..lines {
            let mut row_sum = 0u64;
            for x in 0..samples {
                row_sum += u64::from(src[(y, x)] != 0);
                integral[(y + 1, x + 1)] = integral[(y, x + 1)] + row_sum;
            }
        }
        Self { integral }
    }

    pub fn lines(&self) -> usize {
        self.integral.nrows() - 1
    }

    pub fn samples(&self) -> usize {
        self.integral.ncols() - 1
    }

    /// Number of rough pixels inside `rect`
    pub fn count(&self, rect: &Rect) -> u64 {
        let i = &self.integral;
        i[(rect.y1, rect.x1)] + i[(rect.y0, rect.x0)] - i[(rect.y0, rect.x1)] - i[(rect.y1, rect.x0)]
    }
}

impl RoughnessTest for RoughMask {
    fn is_rough(&self, rect: &Rect) -> bool {
        self.count(rect) > 0
    }
}

/// Interior split points of the interval `[x0, x1)`.
///
/// Short intervals use a fixed table, longer ones cut at 0.382 and 0.618
/// of the length. When two points come back their order is swapped with
/// probability one half, which randomises ties between them downstream.
pub fn split_1d<R: Rng + ?Sized>(x0: usize, x1: usize, rng: &mut R) -> Vec<usize> {
    assert!(x0 < x1, "empty interval {}..{}", x0, x1);
    let d = x1 - x0;
    let (a, b) = match d {
        1 => return Vec::new(),
        2 => return vec![x0 + 1],
        3 => (1, 2),
        4 => (1, 3),
        5 => (2, 3),
        6 => (2, 4),
        7 => (3, 4),
        8 => (3, 5),
        _ => (
            (d as f64 * 0.382).round() as usize,
            (d as f64 * 0.618).round() as usize,
        ),
    };
    if rng.random_bool(0.5) {
        vec![x0 + b, x0 + a]
    } else {
        vec![x0 + a, x0 + b]
    }
}

/// Candidate partitions of `rect`: x-only, then y-only, then both axes
fn candidates(rect: &Rect, xs: &[usize], ys: &[usize]) -> Vec<Vec<(Quadrant, Rect)>> {
    let Rect { x0, x1, y0, y1 } = *rect;
    let mut out = Vec::with_capacity(xs.len() + ys.len() + xs.len() * ys.len());

    for &mx in xs {
        out.push(vec![
            (Quadrant::UpperLeft, Rect::new(x0, mx, y0, y1)),
            (Quadrant::UpperRight, Rect::new(mx, x1, y0, y1)),
        ]);
    }
    for &my in ys {
        out.push(vec![
            (Quadrant::UpperLeft, Rect::new(x0, x1, y0, my)),
            (Quadrant::LowerLeft, Rect::new(x0, x1, my, y1)),
        ]);
    }
    for &mx in xs {
        for &my in ys {
            out.push(vec![
                (Quadrant::UpperLeft, Rect::new(x0, mx, y0, my)),
                (Quadrant::UpperRight, Rect::new(mx, x1, y0, my)),
                (Quadrant::LowerLeft, Rect::new(x0, mx, my, y1)),
                (Quadrant::LowerRight, Rect::new(mx, x1, my, y1)),
            ]);
        }
    }
    out
}

impl QuadTree {
    /// Build a tree over `extent` and split it from the root
    pub fn build<T, R>(extent: Rect, roughness: &T, rng: &mut R) -> Self
    where
        T: RoughnessTest + ?Sized,
        R: Rng + ?Sized,
    {
        let mut tree = QuadTree::new(extent);
        let root = tree.root();
        tree.split(root, roughness, rng);
        tree
    }

    /// Recursively subdivide leaf `id` until every leaf is a unit cell
    /// or smooth.
    pub fn split<T, R>(&mut self, id: NodeId, roughness: &T, rng: &mut R)
    where
        T: RoughnessTest + ?Sized,
        R: Rng + ?Sized,
    {
        let rect = self.rect(id);
        if rect.is_unit() || !roughness.is_rough(&rect) {
            return;
        }

        let xs = split_1d(rect.x0, rect.x1, rng);
        let ys = split_1d(rect.y0, rect.y1, rng);

        let mut best: Option<Vec<(Quadrant, Rect)>> = None;
        let mut best_score = 0;
        for parts in candidates(&rect, &xs, &ys) {
            let score: usize = parts
                .iter()
                .filter(|(_, r)| !roughness.is_rough(r))
                .map(|(_, r)| r.area())
                .sum();
            // Later candidates win ties.
            if best.is_none() || score >= best_score {
                best_score = score;
                best = Some(parts);
            }
        }

        let Some(parts) = best else {
            return;
        };
        for child in self.subdivide(id, &parts) {
            self.split(child, roughness, rng);
        }
    }
}
