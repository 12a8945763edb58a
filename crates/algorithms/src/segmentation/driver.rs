//! End-to-end split-and-merge segmentation

use super::adjacency::AdjacencyMethod;
use super::border::{BorderCriterion, BorderStatistic};
use super::cluster::{do_cluster, ClusterId, ClusterTable};
use super::progress::Progress;
use super::quadtree::{QuadTree, Rect};
use super::render::{rasterize_clusters, rasterize_leaves};
use super::split::RoughMask;
use crate::imagery::{threshold, SpectralDistance};
use crate::morphology::{salt_pepper_filter, Connectivity};
use hyperseg_core::raster::Raster;
use hyperseg_core::{Algorithm, Error, Result, SpectralCube};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Parameters for split-and-merge segmentation
#[derive(Debug, Clone)]
pub struct SegmentationParams {
    /// Edge intensity above which a pixel is rough
    pub split_level: f64,
    /// Largest border statistic at which two regions still merge
    pub merge_level: f64,
    /// Spectral distance evaluated across region borders
    pub distance: SpectralDistance,
    pub statistic: BorderStatistic,
    /// Neighbourhood of the salt-and-pepper filter
    pub connectivity: Connectivity,
    pub adjacency: AdjacencyMethod,
    /// Seed for the split-point order
    pub seed: u64,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            split_level: 0.5,
            merge_level: 0.1,
            distance: SpectralDistance::default(),
            statistic: BorderStatistic::default(),
            connectivity: Connectivity::default(),
            adjacency: AdjacencyMethod::default(),
            seed: 42,
        }
    }
}

/// Everything the pipeline produces, intermediate masks included
#[derive(Debug, Clone)]
pub struct SegmentationOutput {
    /// Thresholded edge map, 1 = rough
    pub rough: Raster<u8>,
    /// Rough mask after salt-and-pepper cleanup
    pub filtered: Raster<u8>,
    /// Leaf ordinals, 1-based
    pub leaves: Raster<i32>,
    /// Cluster id per pixel
    pub labels: Raster<i32>,
    pub tree: QuadTree,
    pub clusters: ClusterTable,
    pub edge_count: usize,
}

impl SegmentationOutput {
    pub fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn cluster_ids(&self) -> Vec<ClusterId> {
        self.clusters.ids().collect()
    }
}

/// Split-and-merge segmentation of a spectral cube
#[derive(Debug, Clone, Default)]
pub struct SplitMerge;

impl Algorithm for SplitMerge {
    type Input = (Raster<f64>, SpectralCube);
    type Output = SegmentationOutput;
    type Params = SegmentationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Split-Merge"
    }

    fn description(&self) -> &'static str {
        "Quadtree split on an edge map, then merge of spectrally similar regions"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (edges, cube) = input;
        segment(&edges, &cube, &params, &mut super::progress::NoProgress)
    }
}

/// Segment `cube` guided by the edge map `edges`.
///
/// # Algorithm
/// 1. Threshold the edge map at `split_level` into a rough mask
/// 2. Remove isolated pixels from the mask
/// 3. Split the full extent until every leaf is smooth or a single pixel
/// 4. Link touching leaves
/// 5. Merge neighbours whose border statistic is within `merge_level`
///
/// The edge map and the cube must cover the same `lines x samples` grid.
/// Output rasters carry the edge map's georeferencing.
pub fn segment(
    edges: &Raster<f64>,
    cube: &SpectralCube,
    params: &SegmentationParams,
    progress: &mut dyn Progress,
) -> Result<SegmentationOutput> {
    if edges.shape() != cube.shape() {
        let (er, ec) = edges.shape();
        let (ar, ac) = cube.shape();
        return Err(Error::SizeMismatch { er, ec, ar, ac });
    }
    let (lines, samples) = edges.shape();
    if lines == 0 || samples == 0 {
        return Err(Error::InvalidDimensions { samples, lines });
    }
    check_level("split_level", params.split_level)?;
    check_level("merge_level", params.merge_level)?;

    progress.message("thresholding edge map");
    let rough = threshold(edges, params.split_level)?;
    let filtered = salt_pepper_filter(&rough, params.connectivity)?;
    debug!(
        rough = count_set(&rough),
        filtered = count_set(&filtered),
        "rough pixels"
    );

    progress.message("splitting");
    let mask = RoughMask::new(&filtered);
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut tree = QuadTree::build(Rect::new(0, samples, 0, lines), &mask, &mut rng);
    let leaves = rasterize_leaves(&tree, *edges.transform());
    debug!(leaves = tree.leaf_count(), nodes = tree.len(), "split done");

    progress.message("building adjacency");
    let adjacency = params.adjacency.build(&tree);
    let edge_count = adjacency.edge_count();
    debug!(edges = edge_count, method = ?params.adjacency, "adjacency built");

    progress.message("merging");
    let criterion = BorderCriterion::new(cube, params.distance, params.statistic, params.merge_level);
    let clusters = do_cluster(&mut tree, &adjacency, &criterion, progress)?;
    let labels = rasterize_clusters(&tree, *edges.transform());
    debug!(clusters = clusters.len(), distance = %params.distance, "merge done");

    Ok(SegmentationOutput {
        rough,
        filtered,
        leaves,
        labels,
        tree,
        clusters,
        edge_count,
    })
}

fn check_level(name: &'static str, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be a number".to_string(),
        });
    }
    Ok(())
}

fn count_set(mask: &Raster<u8>) -> usize {
    mask.data().iter().filter(|&&v| v != 0).count()
}
