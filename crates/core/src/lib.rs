//! # Hyperseg Core
//!
//! Raster types, errors and I/O shared by the hyperseg crates.
//!
//! This crate provides:
//! - `Raster<T>`: a single-band grid of `lines x samples` cells
//! - `SpectralCube`: a multi-band cube with per-pixel spectra
//! - `GeoTransform`: affine georeferencing carried through the pipeline
//! - the `Algorithm` trait used for a uniform algorithm API
//! - native GeoTIFF reading and writing

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, SpectralCube};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement, SpectralCube};
    pub use crate::Algorithm;
}

/// Core trait for algorithms operating on rasters and cubes.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
