//! Raster request construction
//!
//! Turns a validated bounding box and time window into a provider request:
//! pixel dimensions at a fixed ground resolution, an evalscript for the
//! requested purpose, and the output encoding.

use shared::{BoundingBox, TimeInterval, HEATMAP_COLORS, HEATMAP_EDGES, MASKED_COLOR};

use crate::config::NdviConfig;
use crate::external::{OutputFormat, RasterRequest};

/// Scene classification codes treated as no-data: cloud shadow, cloud
/// medium probability, cloud high probability, thin cirrus, snow/ice
pub const MASKED_SCENE_CLASSES: [u8; 5] = [3, 8, 9, 10, 11];

/// Reflectance gain applied to true-color bands
pub const TRUE_COLOR_GAIN: f64 = 2.5;

const METERS_PER_DEGREE_LAT: f64 = 110_574.0;
const METERS_PER_DEGREE_LON: f64 = 111_320.0;

/// NDVI with the cloud/snow mask; shared by the value and heatmap scripts
const NDVI_FUNCTION: &str = r#"function ndvi(sample) {
  if (sample.dataMask === 0 || MASKED_SCL.includes(sample.SCL)) {
    return NaN;
  }
  const denominator = sample.B08 + sample.B04;
  if (denominator === 0) {
    return NaN;
  }
  return (sample.B08 - sample.B04) / denominator;
}"#;

/// What the fetched raster is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterPurpose {
    /// Raw NDVI values for statistics
    NdviValues,
    /// Natural color preview
    TrueColor,
    /// NDVI rendered through the heatmap ramp
    Heatmap,
}

impl RasterPurpose {
    pub fn output_format(&self) -> OutputFormat {
        match self {
            RasterPurpose::NdviValues => OutputFormat::Float32Tiff,
            RasterPurpose::TrueColor | RasterPurpose::Heatmap => OutputFormat::Png,
        }
    }

    pub fn evalscript(&self) -> String {
        match self {
            RasterPurpose::NdviValues => ndvi_evalscript(),
            RasterPurpose::TrueColor => true_color_evalscript(),
            RasterPurpose::Heatmap => heatmap_evalscript(),
        }
    }
}

/// Builds provider requests at a fixed ground resolution
#[derive(Debug, Clone, Copy)]
pub struct RasterRequestBuilder {
    resolution_m: f64,
    max_dimension: u32,
}

impl RasterRequestBuilder {
    pub fn new(config: &NdviConfig) -> Self {
        Self {
            resolution_m: config.resolution_m,
            max_dimension: config.max_dimension,
        }
    }

    /// Pixel width and height covering `bbox` at the configured resolution
    pub fn dimensions(&self, bbox: &BoundingBox) -> (u32, u32) {
        let mid_latitude = bbox.center().latitude.to_radians();
        let width_m = bbox.width_deg() * METERS_PER_DEGREE_LON * mid_latitude.cos();
        let height_m = bbox.height_deg() * METERS_PER_DEGREE_LAT;

        (self.pixels(width_m), self.pixels(height_m))
    }

    fn pixels(&self, meters: f64) -> u32 {
        let count = (meters / self.resolution_m).round();
        if !count.is_finite() || count < 1.0 {
            1
        } else {
            (count as u32).min(self.max_dimension)
        }
    }

    pub fn build(
        &self,
        bbox: &BoundingBox,
        interval: &TimeInterval,
        purpose: RasterPurpose,
    ) -> RasterRequest {
        let (width, height) = self.dimensions(bbox);
        RasterRequest {
            bbox: *bbox,
            interval: *interval,
            width,
            height,
            evalscript: purpose.evalscript(),
            format: purpose.output_format(),
        }
    }
}

fn masked_classes_js() -> String {
    let codes: Vec<String> = MASKED_SCENE_CLASSES.iter().map(|c| c.to_string()).collect();
    format!("const MASKED_SCL = [{}];", codes.join(", "))
}

fn rgb_js(color: [u8; 3]) -> String {
    format!(
        "[{:.4}, {:.4}, {:.4}]",
        f64::from(color[0]) / 255.0,
        f64::from(color[1]) / 255.0,
        f64::from(color[2]) / 255.0
    )
}

fn ndvi_evalscript() -> String {
    format!(
        r#"//VERSION=3
function setup() {{
  return {{
    input: [{{ bands: ["B04", "B08", "SCL", "dataMask"] }}],
    output: {{ bands: 1, sampleType: "FLOAT32" }}
  }};
}}

{masked}

{ndvi}

function evaluatePixel(sample) {{
  return [ndvi(sample)];
}}
"#,
        masked = masked_classes_js(),
        ndvi = NDVI_FUNCTION,
    )
}

fn true_color_evalscript() -> String {
    format!(
        r#"//VERSION=3
function setup() {{
  return {{
    input: [{{ bands: ["B02", "B03", "B04"] }}],
    output: {{ bands: 3, sampleType: "AUTO" }}
  }};
}}

function evaluatePixel(sample) {{
  return [{gain} * sample.B04, {gain} * sample.B03, {gain} * sample.B02];
}}
"#,
        gain = TRUE_COLOR_GAIN,
    )
}

fn heatmap_evalscript() -> String {
    let edges: Vec<String> = HEATMAP_EDGES.iter().map(|e| format!("{:.1}", e)).collect();
    let colors: Vec<String> = HEATMAP_COLORS.iter().map(|&c| rgb_js(c)).collect();

    format!(
        r#"//VERSION=3
function setup() {{
  return {{
    input: [{{ bands: ["B04", "B08", "SCL", "dataMask"] }}],
    output: {{ bands: 3, sampleType: "AUTO" }}
  }};
}}

{masked}
const EDGES = [{edges}];
const COLORS = [
  {colors}
];
const MASKED_COLOR = {masked_color};

{ndvi}

function evaluatePixel(sample) {{
  const value = ndvi(sample);
  if (isNaN(value)) {{
    return MASKED_COLOR;
  }}
  let bucket = 0;
  while (bucket < EDGES.length && value >= EDGES[bucket]) {{
    bucket++;
  }}
  return COLORS[bucket];
}}
"#,
        masked = masked_classes_js(),
        edges = edges.join(", "),
        colors = colors.join(",\n  "),
        masked_color = rgb_js(MASKED_COLOR),
        ndvi = NDVI_FUNCTION,
    )
}
