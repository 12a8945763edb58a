//! # Hyperseg Colormap
//!
//! Colour ramps and per-class colour tables for hyperseg label rasters.
//!
//! Label rasters hold integer ids; the tables here give every id a stable
//! colour and a name so that viewers can display a segmentation without
//! re-deriving anything. Cluster colours are pseudo-random but seeded by
//! the id, so the same cluster gets the same colour on every run.
//!
//! ## Usage
//!
//! ```ignore
//! use hyperseg_colormap::ClassTable;
//!
//! let table = ClassTable::for_clusters([1, 2, 5]);
//! table.write_json("labels.tif.classes.json")?;
//! ```

mod palette;
mod scheme;

pub use palette::{area_color, class_color, sidecar_path, ClassEntry, ClassTable};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};
