use crate::contours::CleanParams;
use crate::distortion::{DistortionKind, LensDistortionModel};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of the `clean_contours` tool.
#[derive(Debug, Deserialize)]
pub struct CleanToolConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default)]
    pub edge: EdgeDetectorConfig,
    #[serde(default)]
    pub clean: CleanParams,
    /// Optional candidate distortion model to validate against the image size.
    #[serde(default)]
    pub distortion: Option<DistortionCandidateConfig>,
    pub output: CleanOutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EdgeDetectorConfig {
    /// Minimum Scharr gradient magnitude for intensities in [0, 1].
    pub magnitude_threshold: f32,
}

impl Default for EdgeDetectorConfig {
    fn default() -> Self {
        Self {
            magnitude_threshold: 0.5,
        }
    }
}

/// Two-parameter model given by its normalized parameters.
#[derive(Debug, Deserialize)]
pub struct DistortionCandidateConfig {
    pub kind: DistortionKind,
    /// Distortion center in pixels; the image center when absent.
    #[serde(default)]
    pub center: Option<[f64; 2]>,
    pub p1: f64,
    #[serde(default)]
    pub p2: f64,
}

impl DistortionCandidateConfig {
    pub fn to_model(&self, width: usize, height: usize) -> LensDistortionModel {
        let center = self
            .center
            .unwrap_or([width as f64 / 2.0, height as f64 / 2.0]);
        LensDistortionModel::from_normalized(self.kind, center, self.p1, self.p2, width, height)
    }
}

#[derive(Debug, Deserialize)]
pub struct CleanOutputConfig {
    #[serde(rename = "contours_json")]
    pub contours_json: PathBuf,
}

pub fn load_config(path: &Path) -> Result<CleanToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&data).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn parse_config(data: &str) -> Result<CleanToolConfig, serde_json::Error> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = parse_config(r#"{"input": "in.png", "output": {"contours_json": "out.json"}}"#)
            .unwrap();
        assert_eq!(cfg.clean, CleanParams::default());
        assert_eq!(cfg.edge.magnitude_threshold, 0.5);
        assert!(cfg.distortion.is_none());
    }

    #[test]
    fn partial_clean_section_keeps_other_defaults() {
        let cfg = parse_config(
            r#"{
                "input": "in.png",
                "clean": {"neighborhood_radius": 2, "min_distance_point": 0},
                "distortion": {"kind": "division", "p1": -0.2},
                "output": {"contours_json": "out.json"}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.clean.neighborhood_radius, 2);
        assert_eq!(cfg.clean.min_distance_point, 0);
        assert_eq!(cfg.clean.min_neighbor_points, CleanParams::default().min_neighbor_points);

        let model = cfg.distortion.unwrap().to_model(100, 50);
        assert_eq!(model.kind, DistortionKind::Division);
        assert_eq!(model.center, [50.0, 25.0]);
    }
}
