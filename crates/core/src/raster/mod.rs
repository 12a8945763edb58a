//! Raster data structures: single-band grids and multi-band cubes

mod cube;
mod element;
mod geotransform;
mod grid;

pub use cube::SpectralCube;
pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
