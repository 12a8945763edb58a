//! Reading and writing rasters and cubes

mod geotiff;

pub use geotiff::{
    read_cube, read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer,
};
