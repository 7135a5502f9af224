//! Radial lens distortion models and their validity checks.
//!
//! A model maps a distorted image point `p` to its undistorted position
//! through a radial factor `L(r) = Σ d[i] r^i`, with `r = |p - c|`:
//!
//! - polynomial: `u = c + (p - c) · L(r)`
//! - division:   `u = c + (p - c) / L(r)`
//!
//! The two-parameter models use `d = [1, 0, k1, 0, k2]`. Fitting works on the
//! scale-free parameters `p1 = k1 R²`, `p2 = k2 R⁴`, where `R` is the
//! distance from the center to the farthest image corner. A candidate is only
//! usable when the radial map `r ↦ |u|` is strictly increasing on `[0, R]`,
//! otherwise distinct image points collapse onto one corrected point.
use log::debug;
use serde::{Deserialize, Serialize};

/// Number of radii probed by the sampled monotonicity check.
const MONOTONICITY_SAMPLES: usize = 2048;

const DENOM_EPS: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionKind {
    Polynomial,
    Division,
}

/// Radial distortion model with an explicit distortion center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LensDistortionModel {
    pub kind: DistortionKind,
    /// Distortion center in pixels.
    pub center: [f64; 2],
    /// `coefficients[i]` multiplies `r^i` in the radial factor.
    pub coefficients: Vec<f64>,
}

impl LensDistortionModel {
    /// The model that leaves every point in place.
    pub fn identity(kind: DistortionKind, center: [f64; 2]) -> Self {
        Self {
            kind,
            center,
            coefficients: vec![1.0],
        }
    }

    /// Two-parameter model `L(r) = 1 + k1 r² + k2 r⁴`.
    pub fn two_parameter(kind: DistortionKind, center: [f64; 2], k1: f64, k2: f64) -> Self {
        Self {
            kind,
            center,
            coefficients: vec![1.0, 0.0, k1, 0.0, k2],
        }
    }

    /// Two-parameter model built from normalized parameters for a given image.
    pub fn from_normalized(
        kind: DistortionKind,
        center: [f64; 2],
        p1: f64,
        p2: f64,
        width: usize,
        height: usize,
    ) -> Self {
        let rsq = max_squared_radius(center, width, height);
        if rsq <= 0.0 {
            return Self::identity(kind, center);
        }
        Self::two_parameter(kind, center, p1 / rsq, p2 / (rsq * rsq))
    }

    /// Coefficient of `r^i`, zero when absent.
    #[inline]
    pub fn coefficient(&self, i: usize) -> f64 {
        self.coefficients.get(i).copied().unwrap_or(0.0)
    }

    /// `L(r)` evaluated with Horner's scheme.
    pub fn radial_factor(&self, r: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &d| acc * r + d)
    }

    /// Corrected distance from the center for a point at distance `r`.
    pub fn radial_map(&self, r: f64) -> f64 {
        let l = self.radial_factor(r);
        match self.kind {
            DistortionKind::Polynomial => r * l,
            DistortionKind::Division => r / l,
        }
    }

    /// True when only `d[0] = 1`, `d[2]` and `d[4]` may be non-zero.
    pub fn is_two_parameter(&self) -> bool {
        self.coefficient(0) == 1.0
            && self
                .coefficients
                .iter()
                .enumerate()
                .all(|(i, &d)| matches!(i, 0 | 2 | 4) || d == 0.0)
    }

    /// Map a distorted pixel to its undistorted position.
    ///
    /// Returns `None` where the division denominator vanishes.
    pub fn undistort_point(&self, p: [f64; 2]) -> Option<[f64; 2]> {
        let dx = p[0] - self.center[0];
        let dy = p[1] - self.center[1];
        let l = self.radial_factor((dx * dx + dy * dy).sqrt());
        let scale = match self.kind {
            DistortionKind::Polynomial => l,
            DistortionKind::Division => {
                if l.abs() < DENOM_EPS {
                    return None;
                }
                1.0 / l
            }
        };
        let out = [self.center[0] + dx * scale, self.center[1] + dy * scale];
        (out[0].is_finite() && out[1].is_finite()).then_some(out)
    }
}

/// Largest squared distance from `center` to an image corner.
pub fn max_squared_radius(center: [f64; 2], width: usize, height: usize) -> f64 {
    let (w, h) = (width as f64, height as f64);
    [[0.0, 0.0], [w, 0.0], [0.0, h], [w, h]]
        .iter()
        .map(|corner| {
            let dx = corner[0] - center[0];
            let dy = corner[1] - center[1];
            dx * dx + dy * dy
        })
        .fold(0.0, f64::max)
}

/// Scale-free parameters `(p1, p2) = (d[2] R², d[4] R⁴)`.
pub fn normalized_params(model: &LensDistortionModel, width: usize, height: usize) -> (f64, f64) {
    let rsq = max_squared_radius(model.center, width, height);
    (model.coefficient(2) * rsq, model.coefficient(4) * rsq * rsq)
}

/// Whether `model` is a one-to-one radial correction over the whole image.
///
/// Two-parameter models are decided in closed form on the normalized
/// parameters; any other coefficient layout is probed on a dense set of radii.
pub fn check_invertibility(model: &LensDistortionModel, width: usize, height: usize) -> bool {
    let ok = if model.is_two_parameter() {
        let (p1, p2) = normalized_params(model, width, height);
        two_parameter_invertible(model.kind, p1, p2)
    } else {
        sampled_monotonic(model, max_squared_radius(model.center, width, height).sqrt())
    };
    if !ok {
        debug!(
            "check_invertibility: rejected {:?} model with coefficients {:?} for {}x{}",
            model.kind, model.coefficients, width, height
        );
    }
    ok
}

/// With `s = r²/R² ∈ [0, 1]`:
/// - polynomial: `d/dr (r L) ∝ 1 + 3 p1 s + 5 p2 s²` must stay positive;
/// - division: `L ∝ 1 + p1 s + p2 s²` and `d/dr (r / L) ∝ 1 - p1 s - 3 p2 s²`
///   must both stay positive.
fn two_parameter_invertible(kind: DistortionKind, p1: f64, p2: f64) -> bool {
    if !p1.is_finite() || !p2.is_finite() {
        return false;
    }
    match kind {
        DistortionKind::Polynomial => positive_on_unit_interval(1.0, 3.0 * p1, 5.0 * p2),
        DistortionKind::Division => {
            positive_on_unit_interval(1.0, p1, p2)
                && positive_on_unit_interval(1.0, -p1, -3.0 * p2)
        }
    }
}

/// `a0 + a1 s + a2 s² > 0` for all `s ∈ [0, 1]`.
fn positive_on_unit_interval(a0: f64, a1: f64, a2: f64) -> bool {
    let q = |s: f64| a0 + s * (a1 + s * a2);
    if q(0.0) <= 0.0 || q(1.0) <= 0.0 {
        return false;
    }
    if a2 > 0.0 {
        let vertex = -a1 / (2.0 * a2);
        if vertex > 0.0 && vertex < 1.0 {
            return q(vertex) > 0.0;
        }
    }
    true
}

fn sampled_monotonic(model: &LensDistortionModel, r_max: f64) -> bool {
    if !r_max.is_finite() {
        return false;
    }
    let mut prev = 0.0f64;
    for i in 0..=MONOTONICITY_SAMPLES {
        let r = r_max * i as f64 / MONOTONICITY_SAMPLES as f64;
        let l = model.radial_factor(r);
        if !l.is_finite() {
            return false;
        }
        if model.kind == DistortionKind::Division && l <= 0.0 {
            return false;
        }
        let mapped = model.radial_map(r);
        if !mapped.is_finite() || (i > 0 && mapped <= prev) {
            return false;
        }
        prev = mapped;
    }
    true
}
