//! Colour ramps and multi-stop interpolation

use serde::{Deserialize, Serialize};

/// RGB colour with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Position in [0, 1] mapped to a colour
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    /// Black -> White
    Grayscale,
    /// Dark purple -> teal -> yellow, for region sizes
    #[default]
    Area,
    /// Black -> red -> yellow -> white, for edge intensity
    Heat,
}

impl ColorScheme {
    pub const ALL: &[ColorScheme] = &[Self::Grayscale, Self::Area, Self::Heat];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "Grayscale",
            Self::Area => "Area",
            Self::Heat => "Heat",
        }
    }
}

const AREA_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 68, 1, 84),
    ColorStop::new(0.25, 59, 82, 139),
    ColorStop::new(0.50, 33, 145, 140),
    ColorStop::new(0.75, 94, 201, 98),
    ColorStop::new(1.00, 253, 231, 37),
];

const HEAT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 0, 0, 0),
    ColorStop::new(0.40, 190, 30, 20),
    ColorStop::new(0.75, 250, 200, 40),
    ColorStop::new(1.00, 255, 255, 255),
];

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    let ch = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb::new(ch(c1.r, c2.r), ch(c1.g, c2.g), ch(c1.b, c2.b))
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let (first, last) = (stops[0], stops[stops.len() - 1]);
    if t.is_nan() || t <= first.t {
        return first.color;
    }
    stops
        .windows(2)
        .find(|w| t <= w[1].t)
        .map(|w| lerp_color(w[0].color, w[1].color, (t - w[0].t) / (w[1].t - w[0].t)))
        .unwrap_or(last.color)
}

/// Evaluate a scheme at `t` in [0, 1]; values outside are clamped
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
        ColorScheme::Area => multi_stop(AREA_STOPS, t),
        ColorScheme::Heat => multi_stop(HEAT_STOPS, t),
    }
}
