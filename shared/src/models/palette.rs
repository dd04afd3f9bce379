//! Heatmap color ramp for NDVI imagery
//!
//! The same table drives the provider-side rendering script and the legend
//! shown by clients.

use serde::{Deserialize, Serialize};

/// Lower edges of buckets 1..=8; bucket 0 is everything below 0.0
pub const HEATMAP_EDGES: [f64; 8] = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];

/// One RGB triple per bucket, from bare/water to dense vegetation
pub const HEATMAP_COLORS: [[u8; 3]; 9] = [
    [128, 128, 128],
    [165, 0, 38],
    [215, 48, 39],
    [244, 109, 67],
    [253, 174, 97],
    [254, 224, 139],
    [217, 239, 139],
    [102, 189, 99],
    [26, 152, 80],
];

/// Color for masked (cloud, snow, no-data) pixels
pub const MASKED_COLOR: [u8; 3] = [0, 0, 0];

/// Ramp color for an NDVI value; non-finite values are masked
pub fn heatmap_color(ndvi: f64) -> [u8; 3] {
    if !ndvi.is_finite() {
        return MASKED_COLOR;
    }
    let bucket = HEATMAP_EDGES.iter().take_while(|&&edge| ndvi >= edge).count();
    HEATMAP_COLORS[bucket]
}

/// One row of the heatmap legend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegendEntry {
    /// Inclusive lower bound, `None` for the open-ended first bucket
    pub min: Option<f64>,
    /// Exclusive upper bound, `None` for the open-ended last bucket
    pub max: Option<f64>,
    pub color: String,
}

fn hex(color: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Legend for all ramp buckets, lowest first
pub fn heatmap_legend() -> Vec<LegendEntry> {
    HEATMAP_COLORS
        .iter()
        .enumerate()
        .map(|(i, &color)| LegendEntry {
            min: i.checked_sub(1).map(|j| HEATMAP_EDGES[j]),
            max: HEATMAP_EDGES.get(i).copied(),
            color: hex(color),
        })
        .collect()
}
