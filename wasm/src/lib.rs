//! WebAssembly module for agricultural field monitoring
//!
//! Provides client-side computation for:
//! - Vegetation health classification
//! - Per-pixel NDVI from band reflectances
//! - Heatmap colors and legend
//! - Trend analysis of a cached NDVI series

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("agromonitor wasm ready"));
}

/// Classify vegetation health from an NDVI value
#[wasm_bindgen]
pub fn classify_ndvi_health(ndvi: f64) -> String {
    HealthStatus::classify(ndvi).to_string()
}

/// NDVI from near-infrared and red reflectance, NaN when undefined
#[wasm_bindgen]
pub fn compute_ndvi(nir: f64, red: f64) -> f64 {
    ndvi_from_bands(nir, red).unwrap_or(f64::NAN)
}

/// Management recommendations for a health bucket
#[wasm_bindgen]
pub fn health_recommendations(ndvi: f64) -> Vec<String> {
    HealthStatus::classify(ndvi)
        .recommendations()
        .iter()
        .map(|r| r.to_string())
        .collect()
}

/// Heatmap color for an NDVI value as `#rrggbb`
#[wasm_bindgen]
pub fn heatmap_color_hex(ndvi: f64) -> String {
    let [r, g, b] = heatmap_color(ndvi);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Color an NDVI raster into RGBA bytes for a canvas; NaN pixels are black
#[wasm_bindgen]
pub fn render_heatmap_rgba(values: &[f32]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(values.len() * 4);
    for &value in values {
        let [r, g, b] = heatmap_color(f64::from(value));
        rgba.extend_from_slice(&[r, g, b, 255]);
    }
    rgba
}

/// Heatmap legend as JSON
#[wasm_bindgen]
pub fn heatmap_legend_json() -> String {
    serde_json::to_string(&heatmap_legend()).unwrap_or_else(|_| "[]".to_string())
}

/// Analyze the trend of a JSON array of history points
#[wasm_bindgen]
pub fn analyze_ndvi_trend(history_json: &str) -> Result<String, JsValue> {
    trend_json(history_json).map_err(|e| JsValue::from_str(&e))
}

fn trend_json(history_json: &str) -> Result<String, String> {
    let mut series: Vec<HistoryPoint> = serde_json::from_str(history_json)
        .map_err(|e| format!("Invalid history JSON: {}", e))?;
    series.sort_by_key(|p| p.date);

    serde_json::to_string(&analyze_trend(&series))
        .map_err(|e| format!("Failed to serialize trend: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ndvi_health() {
        assert_eq!(classify_ndvi_health(0.1), "Poor");
        assert_eq!(classify_ndvi_health(0.2), "Fair");
        assert_eq!(classify_ndvi_health(0.45), "Good");
        assert_eq!(classify_ndvi_health(0.6), "Excellent");
        assert_eq!(classify_ndvi_health(f64::NAN), "Unknown");
    }

    #[test]
    fn test_compute_ndvi() {
        assert!((compute_ndvi(0.5, 0.1) - 0.4 / 0.6).abs() < 1e-9);
        assert!(compute_ndvi(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_heatmap_rgba() {
        let rgba = render_heatmap_rgba(&[f32::NAN, 0.8]);
        assert_eq!(rgba, vec![0, 0, 0, 255, 26, 152, 80, 255]);
        assert_eq!(heatmap_color_hex(0.8), "#1a9850");
    }

    #[test]
    fn test_legend_json_has_all_buckets() {
        let legend: Vec<LegendEntry> = serde_json::from_str(&heatmap_legend_json()).unwrap();
        assert_eq!(legend.len(), 9);
    }

    #[test]
    fn test_trend_json_sorts_by_date() {
        let history = r#"[
            {"date": "2024-06-22", "ndvi_value": 0.6},
            {"date": "2024-06-01", "ndvi_value": 0.3},
            {"date": "2024-06-08", "ndvi_value": 0.4},
            {"date": "2024-06-15", "ndvi_value": 0.5}
        ]"#;
        let trend: TrendResult = serde_json::from_str(&trend_json(history).unwrap()).unwrap();
        assert_eq!(trend.trend, TrendLabel::ImprovingFast);
        assert_eq!(trend.slope, 0.1);
    }

    #[test]
    fn test_trend_json_rejects_garbage() {
        assert!(trend_json("not json").is_err());
    }
}
