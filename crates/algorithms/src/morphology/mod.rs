//! Morphological cleanup of boolean masks
//!
//! - **Salt-and-pepper filter**: flips isolated single-pixel outliers
//!   under 4- or 8-neighbour connectivity

mod salt_pepper;

pub use salt_pepper::{salt_pepper_filter, Connectivity};
