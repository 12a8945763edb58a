//! Texture filters
//!
//! - **Sobel**: gradient magnitude, used to derive an edge map from a band

mod edge;

pub use edge::sobel_edge;
