//! Imagery analysis algorithms
//!
//! - Spectral distances: spectral angle, Euclidean, Bray-Curtis, spectral
//!   information divergence, intensity difference
//! - Thresholding: edge-intensity raster to a boolean roughness mask

mod spectral_distance;
mod threshold;

pub use spectral_distance::SpectralDistance;
pub use threshold::threshold;
