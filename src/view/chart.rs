//! Renderer-agnostic chart dataset descriptors.

use std::fmt;

use serde::{Serialize, Serializer};

/// Kind of visualization a dataset is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Proportional ring, one segment per category.
    Doughnut,
    /// Quality profile, one axis per category.
    Radar,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doughnut => write!(f, "doughnut"),
            Self::Radar => write!(f, "radar"),
        }
    }
}

/// An RGBA colour. Displays and serializes as CSS `rgba(r,g,b,a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One named series of values. Colours pair positionally with categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    pub fill_colors: Vec<Rgba>,
    pub stroke_colors: Vec<Rgba>,
    pub border_width: u32,
}

/// A chart descriptor: ordered categories plus one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub kind: ChartKind,
    pub title: String,
    pub category_labels: Vec<String>,
    pub series: Series,
}

impl ChartDataset {
    /// Iterate `(label, value, fill, stroke)` per category.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64, Rgba, Rgba)> + '_ {
        self.category_labels
            .iter()
            .zip(&self.series.values)
            .zip(self.series.fill_colors.iter().zip(&self.series.stroke_colors))
            .map(|((label, &value), (&fill, &stroke))| (label.as_str(), value, fill, stroke))
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.series.values.iter().sum()
    }
}
