use serde::{Deserialize, Serialize};

/// Thresholds for [`ContourMap::clean`](super::ContourMap::clean).
///
/// - `neighborhood_radius`: half-width of the square window used for neighbor
///   counts and orientation agreement. Zero disables cleaning entirely.
/// - `min_neighbor_points`: a point needs at least this many active neighbors.
/// - `min_orientation_value`: minimum average dot product between a point's
///   tangent and its neighbors' tangents; lower values mark corners.
/// - `min_distance_point`: half-width of the decimation tiles; zero keeps every
///   surviving point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanParams {
    pub neighborhood_radius: usize,
    pub min_neighbor_points: usize,
    pub min_orientation_value: f64,
    pub min_distance_point: usize,
}

impl Default for CleanParams {
    fn default() -> Self {
        Self {
            neighborhood_radius: 3,
            min_neighbor_points: 4,
            min_orientation_value: 0.95,
            min_distance_point: 1,
        }
    }
}

impl CleanParams {
    pub fn new(
        neighborhood_radius: usize,
        min_neighbor_points: usize,
        min_orientation_value: f64,
        min_distance_point: usize,
    ) -> Self {
        Self {
            neighborhood_radius,
            min_neighbor_points,
            min_orientation_value,
            min_distance_point,
        }
    }
}
