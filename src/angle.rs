//! Tangent orientation helpers shared by the edge producer and contour map.
//!
//! Contour tangents are undirected: a line has no preferred direction, so
//! `(c, s)` and `(-c, -s)` describe the same orientation. The canonical
//! representative keeps the sine component non-negative.

const EPS: f32 = 1e-12;

/// Flips `(cosine, sine)` so that the sine component is non-negative.
#[inline]
pub fn normalize_tangent_sign(cosine: f32, sine: f32) -> (f32, f32) {
    if sine < 0.0 {
        (-cosine, -sine)
    } else {
        (cosine, sine)
    }
}

/// Scales `(cosine, sine)` to unit length and folds its sign.
///
/// Returns `None` for a zero or non-finite vector.
#[inline]
pub fn unit_tangent(cosine: f32, sine: f32) -> Option<(f32, f32)> {
    let norm = (cosine * cosine + sine * sine).sqrt();
    if !norm.is_finite() || norm <= EPS {
        return None;
    }
    Some(normalize_tangent_sign(cosine / norm, sine / norm))
}

/// Converts an image gradient into the unit tangent of the edge through it.
///
/// The tangent is the gradient rotated by 90°, normalized and sign-folded.
/// Returns `None` for a vanishing gradient.
#[inline]
pub fn tangent_from_gradient(gx: f32, gy: f32) -> Option<(f32, f32)> {
    unit_tangent(-gy, gx)
}
