//! Spectral distance measures between two pixel spectra

use hyperseg_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Guards logarithms and divisions in the information divergence
const SID_EPSILON: f64 = 1e-12;

/// Named distance between two spectra of equal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpectralDistance {
    /// Angle between spectra as vectors, in radians
    #[default]
    SpectralAngle,
    /// L2 norm of the difference
    Euclidean,
    /// `Σ|a-b| / Σ|a+b|`
    BrayCurtis,
    /// Symmetric Kullback-Leibler divergence of the normalised spectra (SID)
    InformationDivergence,
    /// Absolute difference of the mean intensities
    IntensityDifference,
}

impl SpectralDistance {
    pub const ALL: [SpectralDistance; 5] = [
        Self::SpectralAngle,
        Self::Euclidean,
        Self::BrayCurtis,
        Self::InformationDivergence,
        Self::IntensityDifference,
    ];

    /// Short name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpectralAngle => "sam",
            Self::Euclidean => "euclidean",
            Self::BrayCurtis => "bray-curtis",
            Self::InformationDivergence => "sid",
            Self::IntensityDifference => "intensity",
        }
    }

    /// Evaluate the distance. Both spectra must have the same length.
    pub fn measure(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Self::SpectralAngle => spectral_angle(a, b),
            Self::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            Self::BrayCurtis => {
                let (num, den) = a
                    .iter()
                    .zip(b)
                    .fold((0.0, 0.0), |(n, d), (x, y)| (n + (x - y).abs(), d + (x + y).abs()));
                if den == 0.0 { 0.0 } else { num / den }
            }
            Self::InformationDivergence => information_divergence(a, b),
            Self::IntensityDifference => {
                if a.is_empty() {
                    return 0.0;
                }
                let n = a.len() as f64;
                (a.iter().sum::<f64>() / n - b.iter().sum::<f64>() / n).abs()
            }
        }
    }
}

fn spectral_angle(a: &[f64], b: &[f64]) -> f64 {
    let (dot, aa, bb) = a
        .iter()
        .zip(b)
        .fold((0.0, 0.0, 0.0), |(d, na, nb), (x, y)| (d + x * y, na + x * x, nb + y * y));
    match (aa == 0.0, bb == 0.0) {
        (true, true) => 0.0,
        (true, false) | (false, true) => std::f64::consts::FRAC_PI_2,
        // sqrt(|a|²|b|²) keeps identical spectra at exactly cos = 1
        _ => (dot / (aa * bb).sqrt()).clamp(-1.0, 1.0).acos(),
    }
}

fn information_divergence(a: &[f64], b: &[f64]) -> f64 {
    let sa: f64 = a.iter().map(|v| v.max(0.0)).sum();
    let sb: f64 = b.iter().map(|v| v.max(0.0)).sum();
    if sa <= 0.0 || sb <= 0.0 {
        return if sa <= 0.0 && sb <= 0.0 { 0.0 } else { f64::INFINITY };
    }

    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let p = x.max(0.0) / sa + SID_EPSILON;
            let q = y.max(0.0) / sb + SID_EPSILON;
            (p - q) * (p / q).ln()
        })
        .sum()
}

impl fmt::Display for SpectralDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpectralDistance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sam" | "angle" | "spectral-angle" => Ok(Self::SpectralAngle),
            "euclidean" | "ed" => Ok(Self::Euclidean),
            "bray-curtis" | "braycurtis" | "bc" => Ok(Self::BrayCurtis),
            "sid" | "divergence" => Ok(Self::InformationDivergence),
            "intensity" | "id" => Ok(Self::IntensityDifference),
            _ => Err(Error::InvalidParameter {
                name: "distance",
                value: s.to_string(),
                reason: "expected sam, euclidean, bray-curtis, sid or intensity".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_spectra_are_zero_for_every_measure() {
        let a = [0.12, 0.34, 0.56, 0.78];
        for m in SpectralDistance::ALL {
            assert_eq!(m.measure(&a, &a), 0.0, "{} should vanish on identical spectra", m);
        }
    }

    #[test]
    fn test_spectral_angle_ignores_scale() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.0];
        assert_relative_eq!(SpectralDistance::SpectralAngle.measure(&a, &b), 0.0, epsilon = 1e-7);
        let c = [1.0, 0.0];
        let d = [0.0, 1.0];
        assert_relative_eq!(
            SpectralDistance::SpectralAngle.measure(&c, &d),
            std::f64::consts::FRAC_PI_2
        );
    }

    #[test]
    fn test_spectral_angle_zero_vector() {
        assert_eq!(SpectralDistance::SpectralAngle.measure(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_relative_eq!(
            SpectralDistance::SpectralAngle.measure(&[0.0, 0.0], &[1.0, 0.0]),
            std::f64::consts::FRAC_PI_2
        );
    }

    #[test]
    fn test_euclidean_and_bray_curtis() {
        let a = [1.0, 2.0];
        let b = [4.0, 6.0];
        assert_relative_eq!(SpectralDistance::Euclidean.measure(&a, &b), 5.0);
        assert_relative_eq!(SpectralDistance::BrayCurtis.measure(&a, &b), 7.0 / 13.0);
    }

    #[test]
    fn test_intensity_difference() {
        let a = [1.0, 3.0];
        let b = [10.0, 10.0];
        assert_relative_eq!(SpectralDistance::IntensityDifference.measure(&a, &b), 8.0);
    }

    #[test]
    fn test_sid_is_symmetric_and_positive() {
        let a = [0.2, 0.3, 0.5];
        let b = [0.5, 0.3, 0.2];
        let ab = SpectralDistance::InformationDivergence.measure(&a, &b);
        let ba = SpectralDistance::InformationDivergence.measure(&b, &a);
        assert!(ab > 0.0);
        assert_relative_eq!(ab, ba, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_names() {
        for m in SpectralDistance::ALL {
            assert_eq!(m.name().parse::<SpectralDistance>().unwrap(), m);
        }
        assert!("cosine".parse::<SpectralDistance>().is_err());
    }
}
