use super::TimingBreakdown;
use serde::Serialize;

/// Point counts and timings gathered by one `ContourMap::clean` call.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanReport {
    /// Index length before cleaning.
    pub input_points: usize,
    /// Active points outside the interior frame, dropped from the index.
    pub border_excluded: usize,
    /// Points left after the orientation-consistency filter.
    pub after_orientation: usize,
    /// Points left after each isolated-point pass.
    pub after_isolation: Vec<usize>,
    /// Points left after decimation (equals `after_isolation`'s last entry
    /// when decimation is disabled).
    pub after_decimation: usize,
    pub timings: TimingBreakdown,
}

impl CleanReport {
    /// Final number of contour points.
    pub fn output_points(&self) -> usize {
        self.after_decimation
    }
}
