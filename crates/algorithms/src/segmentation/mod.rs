//! Quadtree split-and-merge segmentation
//!
//! The image extent is recursively divided wherever a rough mask (a
//! thresholded edge map) reports structure, producing rectangular leaves
//! that tile the image. Touching leaves are then merged greedily, largest
//! first, whenever a spectral distance measured along their shared border
//! stays within a merge level.
//!
//! - [`quadtree`]: arena tree of rectangles
//! - [`split`]: split-point selection and recursive subdivision
//! - [`adjacency`]: touching-leaf graph, pairwise or by pixel scan
//! - [`cluster`]: cluster bookkeeping and the merge loop
//! - [`border`]: border statistics and the spectral merge criterion
//! - [`driver`]: the full pipeline from edge map to label raster

pub mod adjacency;
pub mod border;
pub mod cluster;
pub mod driver;
mod progress;
pub mod quadtree;
mod render;
pub mod split;

pub use adjacency::{adjacency_pairwise, adjacency_pixel_scan, Adjacency, AdjacencyMethod, Border, Side};
pub use border::{border_statistic, BorderCriterion, BorderStatistic};
pub use cluster::{do_cluster, ClusterId, ClusterTable, MergeCriterion};
pub use driver::{segment, SegmentationOutput, SegmentationParams, SplitMerge};
pub use progress::{NoProgress, Progress};
pub use quadtree::{NodeId, QuadNode, QuadTree, Quadrant, Rect};
pub use render::{rasterize_clusters, rasterize_leaves};
pub use split::{split_1d, RoughMask, RoughnessTest};
