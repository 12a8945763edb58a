//! # Hyperseg Algorithms
//!
//! Image analysis for spectral cubes, centred on quadtree split-and-merge
//! segmentation.
//!
//! ## Modules
//!
//! - **imagery**: spectral distance measures, edge-map thresholding
//! - **texture**: Sobel gradient magnitude for building edge maps
//! - **morphology**: salt-and-pepper cleanup of boolean masks
//! - **segmentation**: quadtree splitter, leaf adjacency, region merging
//!   and the end-to-end driver

pub mod imagery;
mod maybe_rayon;
pub mod morphology;
pub mod segmentation;
pub mod texture;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{threshold, SpectralDistance};
    pub use crate::morphology::{salt_pepper_filter, Connectivity};
    pub use crate::segmentation::{
        segment, AdjacencyMethod, BorderStatistic, NoProgress, Progress, SegmentationOutput,
        SegmentationParams, SplitMerge,
    };
    pub use crate::texture::sobel_edge;
    pub use hyperseg_core::prelude::*;
}
