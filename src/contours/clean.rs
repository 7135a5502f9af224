//! Neighborhood-based contour cleaning.
//!
//! `ContourMap::clean` prunes a freshly detected contour map in four stages:
//!
//! 1. Orientation consistency. For every active point in the interior frame
//!    `[r, dim - r)` the tangent dot products with all active neighbors in the
//!    `(2r+1)²` window are summed. Points with too few neighbors or with an
//!    average agreement below `min_orientation_value` (corners, clutter) are
//!    deactivated. The index is rebuilt from the interior points only.
//! 2. Isolated point removal. Active neighbors are recounted and sparse points
//!    deactivated, for a fixed number of passes. Each pass peels the loose ends
//!    of a contour; it is not iterated to a fixed point.
//! 3. Decimation. The frame is tiled with `(2d+1)²` windows and only the
//!    point with the highest stage-1 agreement survives in each tile. The
//!    tile anchor is the first incumbent and a challenger must be strictly
//!    better to replace it.
//! 4. Compaction. The index is reduced to the surviving points.
//!
//! Stages 1 and 2 only read shared buffers while aggregating and write one
//! slot per position afterwards, so with the `parallel` feature their
//! aggregation runs on rayon. Stage 3 updates a running per-tile incumbent and
//! stays sequential.
use super::map::ContourMap;
use super::options::CleanParams;
use crate::diagnostics::CleanReport;
use log::debug;

const ISOLATION_PASSES: usize = 4;

#[cfg(any(test, not(feature = "parallel")))]
fn map_positions_serial<T, F>(positions: &[usize], f: F) -> Vec<T>
where
    F: Fn(usize) -> T,
{
    positions.iter().map(|&m| f(m)).collect()
}

#[cfg(feature = "parallel")]
fn map_positions<T, F>(positions: &[usize], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    use rayon::prelude::*;
    positions.par_iter().map(|&m| f(m)).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_positions<T, F>(positions: &[usize], f: F) -> Vec<T>
where
    F: Fn(usize) -> T,
{
    map_positions_serial(positions, f)
}

impl ContourMap {
    /// Remove outliers, corners and isolated points, then decimate.
    ///
    /// Returns `None` without touching the map when it has been released,
    /// when `neighborhood_radius` is zero or when the index is empty.
    /// Afterwards `index` lists exactly the active positions; samples at
    /// deactivated positions are stale.
    pub fn clean(&mut self, params: &CleanParams) -> Option<CleanReport> {
        let radius = params.neighborhood_radius;
        if !self.is_allocated() || radius == 0 || self.index.is_empty() {
            return None;
        }

        let mut report = CleanReport {
            input_points: self.index.len(),
            ..Default::default()
        };
        let mut timings = std::mem::take(&mut report.timings);

        let scalar_product = timings.measure("orientation", || {
            self.filter_orientation(params, &mut report)
        });
        report.after_orientation = self.count_active_in_index();
        debug!(
            "clean: {} points in, {} outside interior frame, {} after orientation filter",
            report.input_points, report.border_excluded, report.after_orientation
        );

        timings.measure("isolation", || {
            for _ in 0..ISOLATION_PASSES {
                self.remove_isolated(radius, params.min_neighbor_points);
                report.after_isolation.push(self.count_active_in_index());
            }
        });
        debug!("clean: isolated point passes -> {:?}", report.after_isolation);

        if params.min_distance_point > 0 {
            timings.measure("decimation", || {
                self.decimate(&scalar_product, params.min_distance_point)
            });
        }

        timings.measure("compaction", || self.compact_index());
        report.after_decimation = self.index.len();
        report.timings = timings;
        debug!(
            "clean: {} points out (min distance {})",
            report.after_decimation, params.min_distance_point
        );
        Some(report)
    }

    /// Stage 1. Returns the per-position orientation agreement sums.
    fn filter_orientation(&mut self, params: &CleanParams, report: &mut CleanReport) -> Vec<f64> {
        let radius = params.neighborhood_radius;
        let (w, h) = (self.width(), self.height());
        let mut scalar_product = vec![0.0f64; w * h];

        let mut interior = Vec::with_capacity(self.index.len());
        for row in radius..h.saturating_sub(radius) {
            let base = row * w;
            for col in radius..w.saturating_sub(radius) {
                if self.active[base + col] {
                    interior.push(base + col);
                }
            }
        }
        let total_active = self.active.iter().filter(|&&on| on).count();
        report.border_excluded = total_active - interior.len();

        let view: &ContourMap = self;
        let support = map_positions(&interior, |m| view.orientation_support(m, radius));

        for (&m, &(sum, count)) in interior.iter().zip(support.iter()) {
            scalar_product[m] = sum;
            if count < params.min_neighbor_points
                || sum < count as f64 * params.min_orientation_value
            {
                self.active[m] = false;
            }
        }
        self.index = interior;
        scalar_product
    }

    /// Stage 2, one pass. Counts are taken from a single snapshot of the
    /// active flags before any point of this pass is removed.
    fn remove_isolated(&mut self, radius: usize, min_neighbor_points: usize) {
        let candidates: Vec<usize> = self
            .index
            .iter()
            .copied()
            .filter(|&m| self.active[m])
            .collect();
        let view: &ContourMap = self;
        let counts = map_positions(&candidates, |m| view.count_active_neighbors(m, radius));
        for (&m, &count) in candidates.iter().zip(counts.iter()) {
            if count < min_neighbor_points {
                self.active[m] = false;
            }
        }
    }

    /// Stage 3. A tile half-width of at least the smaller extent leaves no
    /// anchor, so nothing is decimated.
    fn decimate(&mut self, scalar_product: &[f64], min_distance: usize) {
        let (w, h) = (self.width(), self.height());
        if min_distance >= w.min(h) {
            return;
        }
        let window = 2 * min_distance + 1;
        for row in (min_distance..h.saturating_sub(min_distance)).step_by(window) {
            for col in (min_distance..w.saturating_sub(min_distance)).step_by(window) {
                let anchor = row * w + col;
                // The anchor seeds the incumbent even when it is inactive.
                let mut best = scalar_product[anchor];
                let mut best_pos = anchor;
                for rr in row - min_distance..=row + min_distance {
                    let base = rr * w;
                    for cc in col - min_distance..=col + min_distance {
                        let n = base + cc;
                        if n == anchor || !self.active[n] {
                            continue;
                        }
                        if scalar_product[n] > best {
                            best = scalar_product[n];
                            self.active[best_pos] = false;
                            best_pos = n;
                        } else {
                            self.active[n] = false;
                        }
                    }
                }
            }
        }
    }

    /// Stage 4. Also clears the flags of points dropped from the index by the
    /// interior frame, so both views describe the same set.
    fn compact_index(&mut self) {
        let active = &self.active;
        self.index.retain(|&m| active[m]);
        self.active.fill(false);
        for &m in &self.index {
            self.active[m] = true;
        }
    }

    /// Sum of tangent dot products with active neighbors and their count.
    fn orientation_support(&self, m: usize, radius: usize) -> (f64, usize) {
        let w = self.width();
        let (row, col) = (m / w, m % w);
        let (cm, sm) = (self.cosine[m] as f64, self.sine[m] as f64);
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for rr in row - radius..=row + radius {
            let base = rr * w;
            for cc in col - radius..=col + radius {
                let n = base + cc;
                if n == m || !self.active[n] {
                    continue;
                }
                sum += self.cosine[n] as f64 * cm + self.sine[n] as f64 * sm;
                count += 1;
            }
        }
        (sum, count)
    }

    fn count_active_neighbors(&self, m: usize, radius: usize) -> usize {
        let w = self.width();
        let (row, col) = (m / w, m % w);
        let mut count = 0usize;
        for rr in row - radius..=row + radius {
            let base = rr * w;
            count += self.active[base + col - radius..=base + col + radius]
                .iter()
                .filter(|&&on| on)
                .count();
        }
        // The window includes m itself, which is active.
        count - 1
    }

    fn count_active_in_index(&self) -> usize {
        self.index.iter().filter(|&&m| self.active[m]).count()
    }
}

#[cfg(all(test, feature = "parallel"))]
mod parallel_tests {
    use super::*;
    use crate::contours::ContourPoint;

    #[test]
    fn parallel_aggregation_matches_serial() {
        let mut map = ContourMap::new(64, 64).unwrap();
        for k in 0..1440 {
            let theta = k as f32 * std::f32::consts::PI / 720.0;
            let col = (32.0 + 20.0 * theta.cos()).round() as usize;
            let row = (32.0 + 20.0 * theta.sin()).round() as usize;
            let point = ContourPoint {
                x: col as f32,
                y: row as f32,
                cosine: -theta.sin(),
                sine: theta.cos(),
            };
            map.insert(col, row, point).unwrap();
        }
        let positions = map.index().to_vec();
        let view = &map;

        let parallel = map_positions(&positions, |m| view.orientation_support(m, 3));
        let serial = map_positions_serial(&positions, |m| view.orientation_support(m, 3));
        assert_eq!(parallel, serial);

        let parallel = map_positions(&positions, |m| view.count_active_neighbors(m, 3));
        let serial = map_positions_serial(&positions, |m| view.count_active_neighbors(m, 3));
        assert_eq!(parallel, serial);
    }
}
