//! Salt-and-pepper removal for rough/smooth masks

use crate::maybe_rayon::*;
use hyperseg_core::raster::Raster;
use hyperseg_core::{Error, Result};
use std::str::FromStr;

const ROOK: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
const QUEEN: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Neighbourhood used to decide whether a pixel is isolated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge neighbours only
    Four,
    /// Edge and corner neighbours
    #[default]
    Eight,
}

impl Connectivity {
    /// (dr, dc) offsets of the 3x3 pattern, centre excluded
    pub fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &ROOK,
            Connectivity::Eight => &QUEEN,
        }
    }
}

impl FromStr for Connectivity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "4" | "four" => Ok(Connectivity::Four),
            "8" | "eight" => Ok(Connectivity::Eight),
            _ => Err(Error::InvalidParameter {
                name: "connectivity",
                value: s.to_string(),
                reason: "expected 4 or 8".to_string(),
            }),
        }
    }
}

/// Flip every pixel whose in-bounds neighbours all disagree with it.
///
/// A rough pixel surrounded by smooth ones becomes smooth and vice
/// versa. The pass reads only from the input, so a flip never feeds
/// into a neighbour's decision. Nonzero input values count as rough.
pub fn salt_pepper_filter(mask: &Raster<u8>, connectivity: Connectivity) -> Result<Raster<u8>> {
    let (rows, cols) = mask.shape();
    let src = mask.data();
    let offsets = connectivity.offsets();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = Vec::with_capacity(cols);
            for col in 0..cols {
                let center = src[(row, col)] != 0;
                let mut seen = 0usize;
                let mut isolated = true;
                for &(dr, dc) in offsets {
                    let (Some(r), Some(c)) = (
                        row.checked_add_signed(dr).filter(|&r| r < rows),
                        col.checked_add_signed(dc).filter(|&c| c < cols),
                    ) else {
                        continue;
                    };
                    seen += 1;
                    if (src[(r, c)] != 0) == center {
                        isolated = false;
                        break;
                    }
                }
                let flip = isolated && seen > 0;
                row_data.push(u8::from(center != flip));
            }
            row_data
        })
        .collect();

    mask.with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Raster<u8> {
        let cols = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| u8::from(b == b'#')))
            .collect();
        Raster::from_vec(data, rows.len(), cols).unwrap()
    }

    #[test]
    fn test_isolated_rough_pixel_is_removed() {
        let mask = mask_from(&["....", ".#..", "....", "...."]);
        let out = salt_pepper_filter(&mask, Connectivity::Eight).unwrap();
        assert!(out.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_isolated_smooth_pixel_is_filled() {
        let mask = mask_from(&["###", "#.#", "###"]);
        let out = salt_pepper_filter(&mask, Connectivity::Four).unwrap();
        assert_eq!(out.get(1, 1).unwrap(), 1);
    }

    #[test]
    fn test_connectivity_matters_for_diagonals() {
        // The centre touches a rough pixel only diagonally.
        let mask = mask_from(&["#..", ".#.", "..."]);
        let four = salt_pepper_filter(&mask, Connectivity::Four).unwrap();
        let eight = salt_pepper_filter(&mask, Connectivity::Eight).unwrap();
        assert_eq!(four.get(1, 1).unwrap(), 0);
        assert_eq!(eight.get(1, 1).unwrap(), 1);
    }

    #[test]
    fn test_lines_survive() {
        let mask = mask_from(&["....", "####", "...."]);
        let out = salt_pepper_filter(&mask, Connectivity::Eight).unwrap();
        assert_eq!(out.data(), mask.data());
    }

    #[test]
    fn test_parse_connectivity() {
        assert_eq!("4".parse::<Connectivity>().unwrap(), Connectivity::Four);
        assert!("6".parse::<Connectivity>().is_err());
    }
}
